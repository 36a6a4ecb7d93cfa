//! # Response Parser
//!
//! Turns the free-form text returned by the command proxy into
//! [`FieldBlock`]s, one per multicast route entry.
//!
//! The proxy wraps router output in markup and may leave HTML entities and
//! carriage returns behind, so the text is cleaned with [`clean`] first.
//! Scanning then works line by line:
//!
//! * a `key:value` line adds a field to the block being accumulated;
//! * a line whose key is empty (typically a blank line) terminates the block.
//!   Blocks that carry a `Group` field are emitted, all others are dropped.
//!
//! The first line is protocol framing unless it is itself a field, and the
//! last line (whatever follows the final newline) is always framing.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::iter::Peekable;
use std::str::Split;
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

pub const SOURCE: &str = "Source";
pub const GROUP: &str = "Group";
pub const STATISTICS: &str = "Statistics";

static MARKUP_NOISE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&[^\s]{2,4};|\r").expect("markup noise pattern is valid"));

/// Removes proxy-injected entity escapes (`&gt;`, `&nbsp;`, ...) and `\r`.
pub fn clean(raw: &str) -> Cow<'_, str> {
    MARKUP_NOISE.replace_all(raw, "")
}

/// One route entry as printed by the router, field name to raw value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBlock {
    fields: BTreeMap<String, String>,
}

impl FieldBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repeated key overwrites the earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldBlock {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut block = Self::new();
        for (key, value) in iter {
            block.insert(key, value);
        }
        block
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Line<'a> {
    Field { key: &'a str, value: &'a str },
    Terminator,
}

/// Everything after the first colon is the value, so colons inside values
/// (IPv6 sources, timestamps) survive. A line without a colon is a key with
/// an empty value.
fn classify(line: &str) -> Line<'_> {
    let (key, value) = line.split_once(':').unwrap_or((line, ""));
    let key = key.trim();
    if key.is_empty() {
        Line::Terminator
    } else {
        Line::Field {
            key,
            value: value.trim(),
        }
    }
}

/// Block boundary state machine, independent of where lines come from.
///
/// It is either accumulating fields or, on a terminator, flushing the block
/// it holds and starting over empty.
#[derive(Debug, Default)]
pub struct BlockAccumulator {
    current: FieldBlock,
}

impl BlockAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a completed block when `line` terminates one that has a `Group`.
    pub fn feed(&mut self, line: &str) -> Option<FieldBlock> {
        match classify(line) {
            Line::Field { key, value } => {
                self.current.insert(key, value);
                None
            }
            Line::Terminator => self.flush(),
        }
    }

    fn flush(&mut self) -> Option<FieldBlock> {
        let block = std::mem::take(&mut self.current);
        if block.contains(GROUP) {
            return Some(block);
        }
        if !block.is_empty() {
            trace!(fields = block.len(), "discarding block without a group");
        }
        None
    }
}

/// Lazy iterator over the route blocks of one cleaned response.
pub struct BlockScanner<'a> {
    lines: Peekable<Split<'a, char>>,
    accumulator: BlockAccumulator,
}

impl<'a> BlockScanner<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut lines = text.split('\n').peekable();
        if lines.peek().is_some_and(|first| !is_field(first)) {
            lines.next();
        }
        Self {
            lines,
            accumulator: BlockAccumulator::new(),
        }
    }
}

impl Iterator for BlockScanner<'_> {
    type Item = FieldBlock;

    fn next(&mut self) -> Option<FieldBlock> {
        while let Some(line) = self.lines.next() {
            if self.lines.peek().is_none() {
                return None;
            }
            if let Some(block) = self.accumulator.feed(line) {
                return Some(block);
            }
        }
        None
    }
}

fn is_field(line: &str) -> bool {
    line.contains(':') && matches!(classify(line), Line::Field { .. })
}

/// Cleans `raw` and collects every emitted block.
pub fn parse_response(raw: &str) -> Vec<FieldBlock> {
    let cleaned = clean(raw);
    BlockScanner::new(&cleaned).collect()
}

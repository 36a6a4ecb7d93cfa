use colored::Color;

pub const PRIMARY: Color = Color::BrightGreen;
pub const ACCENT: Color = Color::BrightCyan;
pub const SEPARATOR: Color = Color::BrightBlack;
pub const TEXT_DEFAULT: Color = Color::White;

pub const GROUP: Color = Color::BrightMagenta;
pub const SOURCE: Color = Color::Cyan;
pub const ROUTER: Color = Color::Yellow;
pub const RATE: Color = Color::BrightGreen;

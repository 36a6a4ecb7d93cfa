mod commands;
mod terminal;

use commands::{CommandLine, Commands, parse, poll};
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.quiet);

    match commands.command {
        Commands::Poll(args) => {
            print::header("polling routers", commands.quiet);
            poll::poll(args, commands.quiet).await
        }
        Commands::Parse(args) => {
            print::header("parsing saved response", commands.quiet);
            parse::parse(args)
        }
    }
}

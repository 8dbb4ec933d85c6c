use anyhow::Result;
use clap::Parser;
use delivery_route::cli::{init_logging, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json)?;
    cli.run()
}

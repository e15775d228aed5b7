mod cli;
mod commands;
mod output;

use clap::Parser;

#[tokio::main]
async fn main() {
    let parsed = cli::Cli::parse();

    match commands::run(parsed).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            output::print_error(&format!("{error:#}"));
            std::process::exit(2);
        }
    }
}

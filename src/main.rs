use clap::Parser;
use colored::Colorize;
use stint::cli::commands::Cli;
use stint::cli::dispatch;
use stint::io::git;
use stint::model::config::Config;

fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => fail(&e.to_string()),
    };
    if let Err(e) = git::ensure_repo(&config.repo) {
        fail(&e.to_string());
    }
    if let Err(e) = dispatch::execute(&config, &cli.tokens) {
        fail(&e.to_string());
    }
}

fn fail(message: &str) -> ! {
    eprintln!("{}", format!("error: {}", message).red());
    std::process::exit(1);
}

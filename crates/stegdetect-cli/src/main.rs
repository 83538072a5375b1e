use std::process::ExitCode;

use clap::Parser;
use log::error;
use stegdetect_core::StegDetectError;

mod cli;
mod commands;

use cli::{CliArgs, Commands};

pub type CliResult<T> = std::result::Result<T, StegDetectError>;

fn main() -> ExitCode {
    env_logger::init();

    let args = CliArgs::parse();
    let options = args.options();

    let result = match args.command {
        Commands::Analyze(a) => a.run(options),
        Commands::AnalyzeZip(a) => a.run(options),
        Commands::LsbPicture(a) => a.run(options),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            ExitCode::FAILURE
        }
    }
}

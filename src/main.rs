//! Reference CLI frontend: reads source from a file or stdin, interprets it,
//! and prints the rendered outcome. Carries no behavior of its own beyond
//! formatting — see [`bsl_interpreter::interpret`] for the actual pipeline.

use bsl_interpreter::config::Cli;
use bsl_interpreter::interpret;
use clap::Parser as _;
use std::io::{self, Read};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.log_level()).init();

    let source = match read_source(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error reading source: {e}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = interpret(&source);

    if let Some(message) = outcome.error {
        println!("{message}");
        return ExitCode::FAILURE;
    }

    println!("Output:");
    for line in &outcome.outputs {
        println!("{line}");
    }

    println!("Test Results:");
    for test in &outcome.tests {
        if test.passed {
            println!("[{}:{}] PASSED", test.line, test.column);
        } else {
            println!(
                "[{}:{}] FAILED: expected {}, got {}",
                test.line, test.column, test.expected, test.actual
            );
        }
    }

    ExitCode::SUCCESS
}

fn read_source(cli: &Cli) -> io::Result<String> {
    match &cli.path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

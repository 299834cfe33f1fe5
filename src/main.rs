use std::process::ExitCode;

use lispy::Interpreter;
use lispy::interpreter::Error;
use lispy::parser::parse_program;

// Evaluates each top-level expression in order, printing truthy results.
fn run_source(interp: &Interpreter, name: &str, source: &str) -> Result<(), Error> {
    let program = parse_program(source)?;
    log::debug!("{}: {} top-level expressions", name, program.len());
    for node in &program {
        let result = interp.evaluate(node)?;
        if result.is_truthy() {
            println!("{}", result);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("Usage: lispy FILE...");
        eprintln!("Run the `repl` binary for an interactive session.");
        return ExitCode::from(2);
    }

    let interp = Interpreter::new();
    for path in &paths {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Cannot read {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = run_source(&interp, path, &source) {
            if e.pretty_print(path, &source).is_err() {
                eprintln!("Error: {}", e);
            }
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

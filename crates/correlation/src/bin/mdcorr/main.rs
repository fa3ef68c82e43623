use std::io::{self, Write};
use std::process::ExitCode;

mod cli;
mod commands;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn print_error(err: &anyhow::Error) {
    let mut stderr = io::stderr().lock();
    let stage = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<mdcorr_core::Error>())
        .map(|e| e.stage());

    match stage {
        Some(stage) => {
            let _ = writeln!(stderr, "error ({} stage): {}", stage, err);
        }
        None => {
            let _ = writeln!(stderr, "error: {}", err);
        }
    }
    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "  caused by: {}", cause);
    }
}

fn main() -> ExitCode {
    let cli = cli::parse();
    init_logging(cli.verbose);

    match commands::dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

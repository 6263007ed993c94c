mod app;
mod cli;

use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let parsed = match cli::Cli::try_parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            // --help and --version print on stdout and are not errors.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    let config = parsed.into_config();
    let code = match config.validate().and_then(|()| app::run(config)) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("vistim: {err}");
            err.exit_code()
        }
    };
    std::process::exit(code);
}

//! `sitectl` binary entry point.

use sitectl::{app, cli, exit_codes, logging};

fn main() {
    logging::init();
    let code = match app::run(std::env::args_os()) {
        Ok(()) => exit_codes::OK,
        Err(err) if app::is_usage_error(&err) => {
            println!("{}", cli::usage());
            exit_codes::FAILURE
        }
        Err(err) => {
            eprintln!("{:#}", err);
            app::exit_code(&err)
        }
    };
    std::process::exit(code);
}

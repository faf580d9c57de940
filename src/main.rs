use std::process::ExitCode;

use cors_file_server::server::{shutdown_signal, Server};
use cors_file_server::{logger, Config, ServerError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), ServerError> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    // Tokio runtime; worker count from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async {
        let server = Server::bind(&cfg)?;
        server.serve(shutdown_signal()).await
    })
}

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use reel_booker::args::Args;
use reel_booker::booker::BookerRegistry;
use reel_booker::catalog::Catalog;
use reel_booker::engine::ReservationEngine;
use reel_booker::error::{Error, Result};
use reel_booker::listener::Listener;
use reel_booker::shutdown::{self, ShutdownCoordinator};
use reel_booker::{config, daemon, logger};

const APP_NAME: &str = "reel_booker";

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.log_level);

    if args.daemonize {
        if let Err(e) = daemon::daemonize(APP_NAME) {
            log::error!("daemonization failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(n) = args.worker_threads {
        builder.worker_threads(n);
    }
    let runtime = builder.build().expect("failed to build the Tokio runtime");

    match runtime.block_on(run(args)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = config::load_config(&args.config)?;
    let catalog = Catalog::load(config)?;
    let engine = Arc::new(ReservationEngine::new(catalog));
    let registry = Arc::new(BookerRegistry::new());
    log::info!("catalog loaded from '{}'", args.config);

    let addr: SocketAddr =
        format!("{}:{}", args.bind, args.port).parse().map_err(|e| Error::InvalidArgument(format!("invalid bind address '{}:{}': {e}", args.bind, args.port)))?;
    let listener = Listener::new(addr, args.max_connections, engine, registry);

    let coordinator = ShutdownCoordinator::new();
    let trigger = coordinator.trigger_handle();
    tokio::spawn(async move {
        shutdown::wait_for_termination_signal().await;
        trigger.notify_one();
    });

    let accept_handle = tokio::spawn(listener.clone().run());

    coordinator.run(vec![listener]).await;
    accept_handle.abort();

    Ok(())
}

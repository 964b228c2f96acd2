// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ignited — the supervisor daemon.
//!
//! Reads an `Ignition` document (a file path, or `-` for stdin), boots and
//! supervises its jobs, and exposes a control API (§4.6) over TCP or a Unix
//! socket for the duration of the process.

use std::process::ExitCode;

use ignite_adapters::TokioExecutor;
use ignite_daemon::{api, config};
use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

fn print_usage() {
    println!("ignited {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("USAGE:");
    println!("    ignited --bind <tcp:host:port|unix:path> <ignition-source|->");
    println!();
    println!("OPTIONS:");
    println!("    --bind <addr>    Where the control API listens (required)");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version information");
}

struct Args {
    bind: String,
    source: String,
}

fn parse_args() -> Result<Args, String> {
    let mut bind = None;
    let mut source = None;
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                println!("ignited {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--bind" => {
                bind = Some(iter.next().ok_or("--bind requires a value")?);
            }
            other if source.is_none() => source = Some(other.to_string()),
            other => return Err(format!("unexpected argument {other:?}")),
        }
    }
    Ok(Args {
        bind: bind.ok_or("--bind is required")?,
        source: source.ok_or("an ignition source (path or -) is required")?,
    })
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("error: {msg}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = setup_logging();

    if let Err(err) = run(args).await {
        error!(error = %err, "ignited exited with an error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let bind = config::Bind::parse(&args.bind)?;
    bind.prepare()?;
    let ignition = config::load_ignition(&args.source)?;

    let root_cancel = CancellationToken::new();
    spawn_signal_watcher(root_cancel.clone());

    let executor = TokioExecutor::new();
    let supervisor = ignite_engine::Supervisor::new(executor, ignition, root_cancel.clone());
    let control = supervisor.control();
    let router = api::router(control);

    let server_cancel = root_cancel.clone();
    let serve_task: tokio::task::JoinHandle<std::io::Result<()>> = match bind {
        config::Bind::Tcp(addr) => {
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!(%addr, "control API listening");
            tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(server_cancel.cancelled_owned())
                    .await
            })
        }
        config::Bind::Unix(path) => {
            let listener = tokio::net::UnixListener::bind(&path)?;
            info!(path = %path.display(), "control API listening");
            tokio::spawn(async move {
                axum::serve(listener, router)
                    .with_graceful_shutdown(server_cancel.cancelled_owned())
                    .await
            })
        }
    };

    info!("supervisor starting");
    let supervisor_result = supervisor.run().await;
    root_cancel.cancel();

    if let Err(join_err) = serve_task.await {
        error!(error = %join_err, "control API task panicked");
    }

    supervisor_result.map_err(|err| Box::new(err) as Box<dyn std::error::Error>)
}

fn spawn_signal_watcher(cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(err) => {
                error!(error = %err, "failed to install SIGINT handler");
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
            _ = sigint.recv() => info!("received SIGINT, shutting down"),
        }
        cancel.cancel();
    });
}

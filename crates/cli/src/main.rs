// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ignitectl — a thin control client over the §4.6 control API, the Rust
//! counterpart to `mittnitectl`.

mod addr;
mod http_client;
mod transport;
mod ws_client;

use addr::ApiAddr;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ignitectl", version, about = "Control a running ignited supervisor")]
struct Cli {
    /// tcp:<host:port> or unix:<path>
    #[arg(long = "api")]
    api: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List managed, controllable jobs.
    Jobs,
    /// Operate on a single job.
    Job {
        #[command(subcommand)]
        action: JobAction,
    },
}

#[derive(Subcommand)]
enum JobAction {
    Start { name: String },
    Restart { name: String },
    Stop { name: String },
    Status { name: String },
    Logs {
        name: String,
        #[arg(long, short)]
        follow: bool,
        #[arg(long, default_value_t = -1)]
        taillen: i64,
    },
}

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let addr = match ApiAddr::parse(&cli.api) {
        Ok(addr) => addr,
        Err(err) => {
            eprintln!("error: {err}");
            return std::process::ExitCode::FAILURE;
        }
    };

    match run(addr, cli.command).await {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

async fn run(addr: ApiAddr, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Jobs => {
            let resp = http_client::get(&addr, "/v1/jobs").await?;
            print_or_status(resp);
        }
        Command::Job { action } => match action {
            JobAction::Start { name } => {
                let resp = http_client::post(&addr, &format!("/v1/job/{name}/start")).await?;
                println!("{}", resp.status);
            }
            JobAction::Restart { name } => {
                let resp = http_client::post(&addr, &format!("/v1/job/{name}/restart")).await?;
                println!("{}", resp.status);
            }
            JobAction::Stop { name } => {
                let resp = http_client::post(&addr, &format!("/v1/job/{name}/stop")).await?;
                println!("{}", resp.status);
            }
            JobAction::Status { name } => {
                let resp = http_client::get(&addr, &format!("/v1/job/{name}/status")).await?;
                print_or_status(resp);
            }
            JobAction::Logs {
                name,
                follow,
                taillen,
            } => {
                ws_client::print_log_stream(&addr, &name, follow, taillen).await?;
            }
        },
    }
    Ok(())
}

fn print_or_status(resp: http_client::HttpResponse) {
    if resp.status >= 200 && resp.status < 300 {
        println!("{}", resp.body_str());
    } else {
        eprintln!("http {}: {}", resp.status, resp.body_str());
    }
}

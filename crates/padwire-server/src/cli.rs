//! Command-line entry point shared by `enc_server` and `dec_server`.
//!
//! ```bash
//! enc_server 5000
//! dec_server 5001 --log-level debug
//! ```
//!
//! Usage errors exit with status 1. Logs go to stderr.

use std::{ffi::OsString, io::Write, process::ExitCode};

use clap::{CommandFactory, FromArgMatches, Parser};
use padwire_proto::Service;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{Server, ServerRuntimeConfig};

/// Server arguments.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Port to listen on
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Parse arguments for a server offering `service`.
///
/// # Errors
///
/// Returns the clap error for missing or invalid arguments, and for
/// `--help`/`--version`.
pub fn parse_args<I, T>(service: Service, args: I) -> Result<Args, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let about = match service {
        Service::Encode => "Padwire encoding service",
        Service::Decode => "Padwire decoding service",
    };
    let matches = Args::command().about(about).try_get_matches_from(args)?;
    Args::from_arg_matches(&matches)
}

/// Run a server binary for `service` and map the result to an exit code.
pub async fn main(service: Service) -> ExitCode {
    let args = match parse_args(service, std::env::args_os()) {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS };
        },
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let server = match Server::bind(ServerRuntimeConfig::for_port(service, args.port)) {
        Ok(server) => server,
        Err(e) => return fatal(&e),
    };

    match server.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fatal(&e),
    }
}

fn fatal(err: &crate::ServerError) -> ExitCode {
    tracing::error!("{}", err);
    let _ = writeln!(std::io::stderr(), "Error: {err}");
    ExitCode::from(1)
}

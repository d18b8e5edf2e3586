//! Command-line entry points for `enc_client`, `dec_client` and `keygen`.
//!
//! ```bash
//! keygen 64 > key
//! enc_client plaintext key 5000 > ciphertext
//! dec_client ciphertext key 5001
//! ```
//!
//! Results go to stdout with a trailing newline; errors and logs go to
//! stderr. Exit status is 0 on success, 1 for usage and input errors, 2
//! when the server cannot be reached or refuses the exchange.

use std::{
    ffi::OsString,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{CommandFactory, FromArgMatches, Parser};
use padwire_core::keygen;
use padwire_proto::{Frame, Service};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{ClientError, Request, Requester, load_symbol_file};

/// Client arguments.
#[derive(Parser, Debug)]
#[command(version)]
pub struct ClientArgs {
    /// File holding the text to transform
    pub input: PathBuf,

    /// File holding the key
    pub key: PathBuf,

    /// Server port
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Server host
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Longest key one frame can carry.
const MAX_KEY_LEN: i64 = Frame::MAX_PAYLOAD_SIZE as i64;

/// Key generator arguments.
#[derive(Parser, Debug)]
#[command(name = "keygen", version, about = "Print a random Alphabet-27 key")]
pub struct KeygenArgs {
    /// Number of symbols to generate
    #[arg(value_parser = clap::value_parser!(u32).range(1..=MAX_KEY_LEN))]
    pub length: u32,
}

/// Parse arguments for a client of `service`.
///
/// # Errors
///
/// Returns the clap error for missing or invalid arguments, and for
/// `--help`/`--version`.
pub fn parse_client_args<I, T>(service: Service, args: I) -> Result<ClientArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let about = match service {
        Service::Encode => "Encrypt a plaintext file with a key file",
        Service::Decode => "Decrypt a ciphertext file with a key file",
    };
    let matches = ClientArgs::command().about(about).try_get_matches_from(args)?;
    ClientArgs::from_arg_matches(&matches)
}

/// Run a client binary for `service` and map the result to an exit code.
pub async fn client_main(service: Service) -> ExitCode {
    let args = match parse_client_args(service, std::env::args_os()) {
        Ok(args) => args,
        Err(e) => return usage_exit(&e),
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();

    match run_client(service, &args).await {
        Ok(result) => match write_line(&result) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("Failed to write result: {}", e);
                ExitCode::from(1)
            },
        },
        Err(e) => {
            let _ = writeln!(io::stderr(), "Error: {e}");
            ExitCode::from(e.exit_code())
        },
    }
}

/// Load both files, validate them and run one exchange.
///
/// # Errors
///
/// Any [`ClientError`]; input errors are returned before connecting.
pub async fn run_client(service: Service, args: &ClientArgs) -> Result<bytes::Bytes, ClientError> {
    let input_name = match service {
        Service::Encode => "plaintext",
        Service::Decode => "ciphertext",
    };

    let payload = load_symbol_file(&args.input, input_name)?;
    let key = load_symbol_file(&args.key, "key")?;
    let request = Request::new(key, payload)?;

    let addr = format!("{}:{}", args.host, args.port);
    Requester::new(addr, service).exchange(&request).await
}

/// Run the key generator and map the result to an exit code.
pub fn keygen_main() -> ExitCode {
    let args = match KeygenArgs::try_parse() {
        Ok(args) => args,
        Err(e) => return usage_exit(&e),
    };

    let key = keygen::generate_key(args.length as usize, &mut rand::thread_rng());
    match write_line(&key) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::from(1),
    }
}

fn usage_exit(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    if err.use_stderr() { ExitCode::from(1) } else { ExitCode::SUCCESS }
}

fn write_line(bytes: &[u8]) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(bytes)?;
    stdout.write_all(b"\n")?;
    stdout.flush()
}

//! Decoding service.
//!
//! ```bash
//! dec_server <port>
//! ```

use std::process::ExitCode;

use padwire_proto::Service;

#[tokio::main]
async fn main() -> ExitCode {
    padwire_server::cli::main(Service::Decode).await
}

//! Encoding service.
//!
//! ```bash
//! enc_server <port>
//! ```

use std::process::ExitCode;

use padwire_proto::Service;

#[tokio::main]
async fn main() -> ExitCode {
    padwire_server::cli::main(Service::Encode).await
}

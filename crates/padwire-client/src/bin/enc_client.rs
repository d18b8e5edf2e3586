//! Encrypt a plaintext file through a padwire encryption service.
//!
//! ```bash
//! enc_client <plaintext> <key> <port>
//! ```

use std::process::ExitCode;

use padwire_proto::Service;

#[tokio::main]
async fn main() -> ExitCode {
    padwire_client::cli::client_main(Service::Encode).await
}

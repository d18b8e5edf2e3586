//! Decrypt a ciphertext file through a padwire decryption service.
//!
//! ```bash
//! dec_client <ciphertext> <key> <port>
//! ```

use std::process::ExitCode;

use padwire_proto::Service;

#[tokio::main]
async fn main() -> ExitCode {
    padwire_client::cli::client_main(Service::Decode).await
}

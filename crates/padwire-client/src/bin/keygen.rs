//! Random key generator.
//!
//! ```bash
//! keygen <length>
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    padwire_client::cli::keygen_main()
}

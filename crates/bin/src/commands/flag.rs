//! Flag check command - verifies a flag without a running server.

use ctfweb::FlagVerifier;

use crate::cli::FlagCheckArgs;
use crate::output::{OutputFormat, emit};

/// Run the flag-check command
///
/// Exits with status 1 when the flag is not recognised.
pub fn run(args: &FlagCheckArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let verifier = FlagVerifier::default();
    let label = verifier.check(&args.flag);

    emit(
        format,
        &verifier.result_message(&args.flag),
        &serde_json::json!({ "valid": label.is_some(), "label": label }),
    );

    if label.is_none() {
        std::process::exit(1);
    }
    Ok(())
}

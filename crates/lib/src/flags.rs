//! Flag verification.
//!
//! Flags are never stored in plaintext on the verifier side, only their
//! SHA-256 digests.

use crate::{
    constants::{SSRF_FLAG, SSTI_FLAG},
    crypto::sha256_hex,
};

/// A known flag: a label shown to the player and the flag's digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagRecord {
    pub label: String,
    pub digest: String,
}

impl FlagRecord {
    /// Build a record from the plaintext flag.
    pub fn from_flag(label: impl Into<String>, flag: &str) -> Self {
        Self {
            label: label.into(),
            digest: sha256_hex(flag),
        }
    }
}

/// Checks submissions against a fixed table of flag digests.
#[derive(Debug, Clone)]
pub struct FlagVerifier {
    records: Vec<FlagRecord>,
}

impl FlagVerifier {
    pub fn new(records: Vec<FlagRecord>) -> Self {
        Self { records }
    }

    /// Label of the flag matching `submitted`, if any.
    ///
    /// Surrounding whitespace is ignored. The digest must match exactly and
    /// the first matching record wins.
    pub fn check(&self, submitted: &str) -> Option<&str> {
        let digest = sha256_hex(submitted.trim());
        self.records
            .iter()
            .find(|record| record.digest == digest)
            .map(|record| record.label.as_str())
    }

    /// Message shown on the flags page for a submission.
    pub fn result_message(&self, submitted: &str) -> String {
        match self.check(submitted) {
            Some(label) => format!("Valid flag for: {}", label.to_uppercase()),
            None => "Invalid flag".to_string(),
        }
    }

    pub fn records(&self) -> &[FlagRecord] {
        &self.records
    }
}

impl Default for FlagVerifier {
    /// The SSRF and SSTI flags of the combined app.
    fn default() -> Self {
        Self::new(vec![
            FlagRecord::from_flag("ssrf", SSRF_FLAG),
            FlagRecord::from_flag("ssti", SSTI_FLAG),
        ])
    }
}

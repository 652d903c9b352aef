//! Health command - queries `/health` on a running ctfweb server.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cli::HealthArgs;
use crate::output::{OutputFormat, emit};

/// Body of the server's `/health` endpoint
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq)]
pub(crate) struct HealthReport {
    pub status: String,
    pub variant: String,
    pub users: usize,
    pub sessions: usize,
}

impl HealthReport {
    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    fn summary(&self) -> String {
        format!(
            "{}: variant {}, {} users, {} active sessions",
            self.status, self.variant, self.users, self.sessions
        )
    }
}

/// `/health` URL for a server base URL
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

pub(crate) async fn fetch_report(url: &str, timeout: Duration) -> Result<HealthReport, String> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| e.to_string())?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("failed to connect to {url}: {e}"))?;
    if !response.status().is_success() {
        return Err(format!("server returned HTTP status {}", response.status()));
    }
    response
        .json()
        .await
        .map_err(|e| format!("unreadable health report: {e}"))
}

/// Run the health command
///
/// Exits with status 1 when the server is unreachable or not healthy.
pub async fn run(args: &HealthArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);

    match fetch_report(&url, Duration::from_secs(args.timeout)).await {
        Ok(report) => {
            emit(format, &report.summary(), &serde_json::to_value(&report)?);
            if !report.is_healthy() {
                std::process::exit(1);
            }
        }
        Err(reason) => {
            emit(
                format,
                &format!("unhealthy: {reason}"),
                &serde_json::json!({ "status": "unreachable", "error": reason }),
            );
            std::process::exit(1);
        }
    }
    Ok(())
}

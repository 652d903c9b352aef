//! CLI argument definitions for the ctfweb binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use ctfweb::constants::{STANDALONE_SSTI_SECRET, SSTI_FLAG, TARGET_PORT};

use crate::output::OutputFormat;

/// Which app to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Variant {
    /// Landing page, flag checker, SSRF app, and the SSTI app under /ssti
    Multi,
    /// The SSTI app alone, mounted at the root
    Ssti,
}

impl Variant {
    /// Path prefix the SSTI routes are mounted under
    pub fn ssti_prefix(self) -> &'static str {
        match self {
            Variant::Multi => "/ssti",
            Variant::Ssti => "",
        }
    }

    /// Value exposed to comment templates as `secret_key`
    pub fn ssti_secret(self) -> &'static str {
        match self {
            Variant::Multi => SSTI_FLAG,
            Variant::Ssti => STANDALONE_SSTI_SECRET,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::Multi => "multi",
            Variant::Ssti => "ssti",
        }
    }
}

/// Deliberately vulnerable SSRF and SSTI training server
#[derive(Parser, Debug)]
#[command(name = "ctfweb")]
#[command(about = "ctfweb: deliberately vulnerable SSRF and SSTI training apps")]
#[command(version)]
pub struct Cli {
    /// Output format for commands that print results
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the web server (default)
    Serve(ServeArgs),
    /// Check health of a running ctfweb server
    Health(HealthArgs),
    /// Check a flag offline against the known digests
    FlagCheck(FlagCheckArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8000, env = "CTFWEB_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "CTFWEB_HOST")]
    pub host: String,

    /// App variant to serve
    #[arg(short, long, value_enum, default_value = "multi", env = "CTFWEB_VARIANT")]
    pub variant: Variant,

    /// Directory holding users.csv
    #[arg(short = 'D', long, env = "CTFWEB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Loopback port of the SSRF target (multi variant only)
    #[arg(long, default_value_t = TARGET_PORT, env = "CTFWEB_TARGET_PORT")]
    pub target_port: u16,

    /// Do not start the SSRF target
    #[arg(long)]
    pub no_target: bool,
}

impl ServeArgs {
    /// Arguments used when no subcommand is given: defaults plus environment
    pub fn from_env() -> Self {
        Self::parse_from(["serve"])
    }
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:8000", env = "CTFWEB_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Arguments for the flag-check command
#[derive(clap::Args, Debug)]
pub struct FlagCheckArgs {
    /// The flag to check
    pub flag: String,
}

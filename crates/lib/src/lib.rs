//!
//! ctfweb: deliberately vulnerable web applications for practising SSRF and SSTI.
//! This library provides the behavioural core shared by the `ctfweb` server binary.
//!
//! ## Core Concepts
//!
//! * **Users (`user::User`)**: A username, a SHA-256 password digest and an ordered list of
//!   comments left on the user's profile by other users. Persisted as a flat CSV file.
//! * **Sessions (`session::SessionStore`)**: Opaque hex tokens mapped to usernames. Memory only.
//! * **Store (`store::Store`)**: Owns both tables and funnels every mutation through its methods.
//! * **Renderer (`render::CommentRenderer`)**: Evaluates stored comments as Jinja templates with
//!   the user table and a secret in scope. This is the SSTI vector and is intentionally unsandboxed.
//! * **Fetcher (`fetch::Fetcher`)**: Issues GET requests to arbitrary caller supplied URLs. This
//!   is the SSRF vector and intentionally has no allow-list.
//! * **Target (`target::TargetServer`)**: A loopback-only listener holding the SSRF flag.
//! * **Flags (`flags::FlagVerifier`)**: Checks submitted flags against known digests.

pub mod constants;
pub mod crypto;
pub mod fetch;
pub mod flags;
pub mod render;
pub mod session;
pub mod store;
pub mod target;
pub mod user;

pub use fetch::{FetchResponse, Fetcher};
pub use flags::FlagVerifier;
pub use render::{CommentRenderer, RenderContext};
pub use session::{SessionStore, SessionToken};
pub use store::{LoginGrant, Store};
pub use target::TargetServer;
pub use user::{User, UserTable};

/// Result type used throughout the ctfweb library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the ctfweb library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Structured user/session store errors from the store module
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured outbound request errors from the fetch module
    #[error(transparent)]
    Fetch(fetch::FetchError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Store(_) => "store",
            Error::Fetch(_) => "fetch",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
            Error::Csv(_) => "csv",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a conflict (already exists).
    pub fn is_conflict(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_conflict(),
            _ => false,
        }
    }

    /// Check if this error is authentication-related.
    pub fn is_authentication_error(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_authentication_error(),
            _ => false,
        }
    }

    /// Check if this error is a rejected comment submission.
    pub fn is_comment_rejected(&self) -> bool {
        match self {
            Error::Store(store_err) => store_err.is_comment_rejected(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Error::Io(_) | Error::Csv(_))
    }

    /// Check if this error came from an outbound request.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, Error::Fetch(_))
    }

    /// Check if this error is an outbound request that ran out of time.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Fetch(fetch_err) => fetch_err.is_timeout(),
            _ => false,
        }
    }
}

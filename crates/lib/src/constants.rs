//! Constants used throughout the ctfweb library.
//!
//! Flags, secrets and fixed addresses are part of the exercise and must stay stable
//! so that published write-ups keep working.

use std::time::Duration;

/// Flag served by the SSRF target on its secret path.
pub const SSRF_FLAG: &str = "CTF{ssrf_0nly_l0calh0st_9000_7c2b3f}";

/// Flag exposed to comment templates as `secret_key` in the combined app.
pub const SSTI_FLAG: &str = "CTF{ssti_templ4te_escape_is_0pt1c4l_54d91b}";

/// Secret exposed to comment templates by the standalone SSTI app.
pub const STANDALONE_SSTI_SECRET: &str = "SECRET_FLAG_CSV_EDITION";

/// Loopback host the SSRF target binds to.
pub const TARGET_HOST: &str = "127.0.0.1";

/// Fixed port of the SSRF target.
pub const TARGET_PORT: u16 = 9000;

/// Path on the SSRF target that returns the flag.
pub const TARGET_SECRET_PATH: &str = "/secret";

/// Body returned by the SSRF target for every other path.
pub const TARGET_HINT: &str = "admin, now go to secret";

/// Upper bound on a single outbound fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Number of random bytes in a session token (hex encoded to twice this length).
pub const SESSION_TOKEN_BYTES: usize = 16;

/// Default name of the persisted user table.
pub const USERS_FILE: &str = "users.csv";

/// Header row of the persisted user table.
pub const USERS_FILE_HEADER: [&str; 3] = ["username", "password_hash", "comments"];

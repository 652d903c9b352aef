//! Persistence operations for the user table
//!
//! The table is stored as CSV with one row per user. The comment list is
//! JSON-encoded into a single field so that commas, quotes and newlines in
//! comment text survive the delimiter.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{User, UserTable};
use crate::{Result, constants::USERS_FILE_HEADER};

/// One row of the persisted file
#[derive(Serialize, Deserialize)]
struct UserRow {
    username: String,
    password_hash: String,
    comments: String,
}

/// Encode the whole table as CSV, header first.
pub(crate) fn to_csv(table: &UserTable) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(USERS_FILE_HEADER)?;

    for user in table.iter() {
        writer.serialize(UserRow {
            username: user.username.clone(),
            password_hash: user.password_hash.clone(),
            comments: serde_json::to_string(&user.comments)?,
        })?;
    }

    writer.into_inner().map_err(|e| e.into_error().into())
}

/// Decode a table from CSV bytes.
///
/// A comment field that is not a JSON array of strings yields a user with no
/// comments. Rows that cannot be read at all are skipped.
pub(crate) fn from_csv(bytes: &[u8]) -> UserTable {
    let mut reader = csv::Reader::from_reader(bytes);
    let mut table = UserTable::new();

    for row in reader.deserialize::<UserRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("Skipping unreadable user row: {e}");
                continue;
            }
        };

        let comments = serde_json::from_str::<Vec<String>>(&row.comments).unwrap_or_else(|e| {
            tracing::warn!(
                "Malformed comments for user {}, loading none: {e}",
                row.username
            );
            Vec::new()
        });

        table.insert(User {
            username: row.username,
            password_hash: row.password_hash,
            comments,
        });
    }

    table
}

/// Rewrites the file at `path` with the full table.
pub(crate) async fn save_to_file<P: AsRef<Path>>(table: &UserTable, path: P) -> Result<()> {
    let bytes = to_csv(table)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

/// Loads the table from `path`.
///
/// If the file does not exist, an empty table is returned.
pub(crate) async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<UserTable> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(from_csv(&bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(UserTable::new()),
        Err(e) => Err(e.into()),
    }
}

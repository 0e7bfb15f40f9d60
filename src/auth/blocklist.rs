//! Revoked token IDs, checked on every authenticated request.

use rusqlite::{Connection, params};
use time::OffsetDateTime;

use crate::{Error, auth::TokenType, user::UserID};

/// Create the token blocklist table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_token_blocklist_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS token_blocklist (
                id INTEGER PRIMARY KEY,
                jti TEXT NOT NULL UNIQUE,
                token_type TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    Ok(())
}

/// Add the token with ID `jti` to the blocklist.
///
/// Revoking a token twice is not an error.
pub fn revoke_token(
    jti: &str,
    token_type: TokenType,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    connection.execute(
        "INSERT OR IGNORE INTO token_blocklist (jti, token_type, user_id, created_at)
        VALUES (?1, ?2, ?3, ?4)",
        params![jti, token_type.as_str(), user_id, OffsetDateTime::now_utc()],
    )?;

    Ok(())
}

/// Check whether the token with ID `jti` has been revoked.
pub fn is_token_revoked(jti: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM token_blocklist WHERE jti = ?1)",
            [jti],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

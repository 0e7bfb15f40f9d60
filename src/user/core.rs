//! Code for creating the user table and reading and writing users in the database.

use rusqlite::{Connection, OptionalExtension, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::PasswordHash,
    database_id::RowsAffected,
    user::{Email, UserID, Username},
};

// ============================================================================
// MODELS
// ============================================================================

/// A user of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The unique name the user logs in with.
    pub username: Username,
    /// The user's unique email address.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether the user can view and manage every user's data.
    pub is_admin: bool,
    /// Whether the user has confirmed their email address.
    pub is_verified: bool,
    /// When the user registered.
    pub created_at: OffsetDateTime,
    /// When the user was last changed.
    pub updated_at: OffsetDateTime,
}

/// The data needed to register a user.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// The unique name the user logs in with.
    pub username: Username,
    /// The user's unique email address.
    pub email: Email,
    /// The user's password hash.
    pub password_hash: PasswordHash,
    /// Whether the user is an admin.
    pub is_admin: bool,
    /// The hash of the token emailed to the user to confirm their address.
    pub verification_token_hash: Option<String>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const USER_COLUMNS: &str =
    "id, username, email, password, is_admin, is_verified, created_at, updated_at";

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                email TEXT NOT NULL UNIQUE COLLATE NOCASE,
                password TEXT NOT NULL,
                is_admin INTEGER NOT NULL DEFAULT 0,
                is_verified INTEGER NOT NULL DEFAULT 0,
                verification_token TEXT,
                reset_token TEXT,
                reset_token_expires TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let username: String = row.get(1)?;
    let email: String = row.get(2)?;

    Ok(User {
        id: row.get(0)?,
        username: Username::new_unchecked(&username),
        email: Email::new_unchecked(&email),
        password_hash: row.get(3)?,
        is_admin: row.get(4)?,
        is_verified: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Create and insert a new user into the database.
///
/// # Errors
///
/// Returns [Error::DuplicateUsername] or [Error::DuplicateEmail] if another
/// user already has the username or email, or a [Error::SqlError] if an SQL
/// related error occurred.
pub fn create_user(new_user: NewUser, connection: &Connection) -> Result<User, Error> {
    let now = OffsetDateTime::now_utc();

    connection
        .prepare(&format!(
            "INSERT INTO user
                (username, email, password, is_admin, verification_token, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            params![
                new_user.username.as_ref(),
                new_user.email.as_ref(),
                new_user.password_hash,
                new_user.is_admin,
                new_user.verification_token_hash,
                now,
            ],
            map_user_row,
        )
        .map_err(Error::from)
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE id = :id"))?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(Error::from)
}

/// Get the user whose username or email address is `login`.
///
/// `login` is compared with the email address when it contains '@', otherwise with the username.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user matches.
pub fn get_user_by_username_or_email(login: &str, connection: &Connection) -> Result<User, Error> {
    let login = login.trim();
    // Usernames cannot contain '@', so a login with one is an email address.
    let column = if login.contains('@') { "email" } else { "username" };

    connection
        .prepare(&format!(
            "SELECT {USER_COLUMNS} FROM user WHERE {column} = ?1"
        ))?
        .query_row([login], map_user_row)
        .map_err(Error::from)
}

/// Get the user registered with `email`, if any.
pub fn find_user_by_email(email: &str, connection: &Connection) -> Result<Option<User>, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user WHERE email = ?1"))?
        .query_row([email.trim()], map_user_row)
        .optional()
        .map_err(Error::from)
}

/// Get all users ordered by ID.
pub fn list_users(connection: &Connection) -> Result<Vec<User>, Error> {
    connection
        .prepare(&format!("SELECT {USER_COLUMNS} FROM user ORDER BY id"))?
        .query_map([], map_user_row)?
        .map(|maybe_user| maybe_user.map_err(Error::from))
        .collect()
}

/// Change a user's username and email.
///
/// If `verification_token_hash` is given the user is marked as unverified and
/// the token replaces any previous verification token.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist or
/// [Error::DuplicateUsername]/[Error::DuplicateEmail] if another user has the
/// new username or email.
pub fn update_profile(
    user_id: UserID,
    username: &Username,
    email: &Email,
    verification_token_hash: Option<&str>,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "UPDATE user SET
                username = ?2,
                email = ?3,
                is_verified = CASE WHEN ?4 IS NULL THEN is_verified ELSE 0 END,
                verification_token = COALESCE(?4, verification_token),
                updated_at = ?5
            WHERE id = ?1
            RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            params![
                user_id,
                username.as_ref(),
                email.as_ref(),
                verification_token_hash,
                OffsetDateTime::now_utc(),
            ],
            map_user_row,
        )
        .map_err(Error::from)
}

/// Replace a user's password hash and clear any pending password reset.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user
        SET password = ?2, reset_token = NULL, reset_token_expires = NULL, updated_at = ?3
        WHERE id = ?1",
        params![user_id, password_hash, OffsetDateTime::now_utc()],
    )?;

    expect_one_row(rows_affected)
}

/// Set a new password for the user holding the reset token with hash `token_hash`.
///
/// The token is cleared in the same statement, so each token changes the password at most once.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user holds the token, e.g. because it was
/// already used or replaced by a newer one.
pub fn reset_password(
    token_hash: &str,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "UPDATE user
        SET password = ?2, reset_token = NULL, reset_token_expires = NULL, updated_at = ?3
            WHERE reset_token = ?1
            RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            params![token_hash, password_hash, OffsetDateTime::now_utc()],
            map_user_row,
        )
        .map_err(Error::from)
}

/// Store the hash of a password reset token and its expiry for a user.
pub fn set_reset_token(
    user_id: UserID,
    token_hash: &str,
    expires_at: OffsetDateTime,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET reset_token = ?2, reset_token_expires = ?3 WHERE id = ?1",
        params![user_id, token_hash, expires_at],
    )?;

    expect_one_row(rows_affected)
}

/// Find the user holding the reset token with hash `token_hash` and when the token expires.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user holds the token.
pub fn get_reset_token_owner(
    token_hash: &str,
    connection: &Connection,
) -> Result<(UserID, OffsetDateTime), Error> {
    connection
        .query_row(
            "SELECT id, reset_token_expires FROM user
            WHERE reset_token = ?1 AND reset_token_expires IS NOT NULL",
            [token_hash],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .map_err(Error::from)
}

/// Replace the hash of a user's email verification token.
pub fn set_verification_token(
    user_id: UserID,
    token_hash: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET verification_token = ?2 WHERE id = ?1",
        params![user_id, token_hash],
    )?;

    expect_one_row(rows_affected)
}

/// Mark the user holding the verification token with hash `token_hash` as verified.
///
/// The token is cleared so it cannot be used again.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user holds the token.
pub fn mark_verified(token_hash: &str, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "UPDATE user SET is_verified = 1, verification_token = NULL, updated_at = ?2
            WHERE verification_token = ?1
            RETURNING {USER_COLUMNS}"
        ))?
        .query_row(params![token_hash, OffsetDateTime::now_utc()], map_user_row)
        .map_err(Error::from)
}

/// Grant or revoke a user's admin role.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn set_admin(user_id: UserID, is_admin: bool, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "UPDATE user SET is_admin = ?2, updated_at = ?3 WHERE id = ?1 RETURNING {USER_COLUMNS}"
        ))?
        .query_row(
            params![user_id, is_admin, OffsetDateTime::now_utc()],
            map_user_row,
        )
        .map_err(Error::from)
}

/// Delete a user and, through the foreign keys, everything they own.
///
/// # Errors
///
/// Returns [Error::NotFound] if the user does not exist.
pub fn delete_user(user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM user WHERE id = ?1", [user_id])?;

    expect_one_row(rows_affected)
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::SqlError] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<usize, Error> {
    let count: i64 = connection.query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))?;

    Ok(usize::try_from(count).unwrap_or_default())
}

fn expect_one_row(rows_affected: RowsAffected) -> Result<(), Error> {
    if rows_affected == 0 {
        Err(Error::NotFound)
    } else {
        Ok(())
    }
}

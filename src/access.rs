//! Rules for which records an authenticated user may see and change.

use crate::{Error, auth::AuthUser, user::UserID};

/// Check that `user` owns the record or is an admin.
///
/// # Errors
/// Returns [Error::NotFound] so that other users' records look like they do not exist.
pub fn ensure_owner_or_admin(user: &AuthUser, owner: UserID) -> Result<(), Error> {
    if user.is_admin || user.id == owner {
        Ok(())
    } else {
        Err(Error::NotFound)
    }
}

/// Check that `user` is an admin.
///
/// # Errors
/// Returns [Error::Forbidden] for regular users.
pub fn require_admin(user: &AuthUser) -> Result<(), Error> {
    if user.is_admin {
        Ok(())
    } else {
        Err(Error::Forbidden)
    }
}

/// Decide whose records a list request covers.
///
/// Regular users only ever see their own records. Admins see everyone's,
/// or a single user's when `requested_user` is given. `None` means all users.
///
/// # Errors
/// Returns [Error::Forbidden] if a regular user asks for another user's records.
pub fn owner_filter(
    user: &AuthUser,
    requested_user: Option<i64>,
) -> Result<Option<UserID>, Error> {
    let requested_user = requested_user.map(UserID::new);

    if user.is_admin {
        return Ok(requested_user);
    }

    match requested_user {
        Some(requested) if requested != user.id => Err(Error::Forbidden),
        _ => Ok(Some(user.id)),
    }
}

/// The user whose data a single-user view such as the dashboard shows.
///
/// # Errors
/// Returns [Error::Forbidden] if a regular user asks for another user.
pub fn target_user(user: &AuthUser, requested_user: Option<i64>) -> Result<UserID, Error> {
    Ok(owner_filter(user, requested_user)?.unwrap_or(user.id))
}

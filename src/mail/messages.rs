//! The notification emails sent to users.

use time::Duration;

use crate::{mail::EmailMessage, user::User};

/// Ask a user to confirm their email address with `token`.
pub fn verification_email(user: &User, token: &str) -> EmailMessage {
    EmailMessage {
        to: user.email.to_string(),
        subject: "Verify your email address".to_owned(),
        body: format!(
            "Hi {},\n\n\
            Please confirm your email address by submitting the code below.\n\n\
            Code: {token}\n",
            user.username
        ),
    }
}

/// Send a user the token for resetting their password.
pub fn password_reset_email(user: &User, token: &str, valid_for: Duration) -> EmailMessage {
    EmailMessage {
        to: user.email.to_string(),
        subject: "Reset your password".to_owned(),
        body: format!(
            "Hi {},\n\n\
            We received a request to reset your password. \
            The code below is valid for {} minutes.\n\n\
            Code: {token}\n\n\
            If you did not ask to reset your password you can ignore this email.\n",
            user.username,
            valid_for.whole_minutes()
        ),
    }
}

/// Tell a user that their password was changed.
pub fn password_changed_email(user: &User) -> EmailMessage {
    EmailMessage {
        to: user.email.to_string(),
        subject: "Your password was changed".to_owned(),
        body: format!(
            "Hi {},\n\n\
            The password for your account was just changed. \
            If this was not you, reset your password immediately.\n",
            user.username
        ),
    }
}

#[cfg(test)]
mod tests {
    use time::{Duration, OffsetDateTime};

    use crate::{
        auth::PasswordHash,
        user::{Email, User, UserID, Username},
    };

    use super::{password_changed_email, password_reset_email, verification_email};

    fn user() -> User {
        User {
            id: UserID::new(1),
            username: Username::new_unchecked("john_doe"),
            email: Email::new_unchecked("john@example.com"),
            password_hash: PasswordHash::new_unchecked("hunter2"),
            is_admin: false,
            is_verified: false,
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn verification_email_contains_code() {
        let message = verification_email(&user(), "abc123");

        assert_eq!(message.to, "john@example.com");
        assert!(message.body.contains("Code: abc123"));
    }

    #[test]
    fn reset_email_states_lifetime() {
        let message = password_reset_email(&user(), "abc123", Duration::hours(1));

        assert!(message.body.contains("60 minutes"));
        assert!(message.body.contains("Code: abc123"));
    }

    #[test]
    fn changed_email_is_addressed_to_user() {
        let message = password_changed_email(&user());

        assert!(message.body.starts_with("Hi john_doe"));
    }
}

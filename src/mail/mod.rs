mod mailer;
mod messages;

pub use mailer::{EmailMessage, MailError, Mailer};
pub use messages::{password_changed_email, password_reset_email, verification_email};

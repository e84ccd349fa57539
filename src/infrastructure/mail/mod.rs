//! Outbound email delivery

mod resend;

pub use resend::{EmailMessage, Mailer, NoopMailer, ResendMailer};

pub mod traits;
pub mod trackers;
pub mod notifiers;

pub use traits::Mailer;
pub use notifiers::{LogMailer, SmtpMailer};

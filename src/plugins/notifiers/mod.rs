pub mod email;
pub mod log;

pub use email::SmtpMailer;
pub use log::LogMailer;

//! Services layer.
//!
//! Services sit between the front end and the infrastructure layer:
//!
//! ```text
//! Front end (terminal commands)
//!          |
//!          v
//!    Services Layer
//!          |
//!          v
//! Infrastructure (Providers, Storage)
//! ```
//!
//! - [`AnalysisService`]: the "Analyze Content" action
//! - [`MailService`]: builds and sends the composed email

mod analysis_service;
mod mail_service;

pub use analysis_service::{AnalysisReport, AnalysisService, ReportSection, SectionKind};
pub use mail_service::{
    build_message, MailError, MailService, MailTransport, OutgoingEmail, SmtpTransport,
    DEFAULT_SENDER,
};

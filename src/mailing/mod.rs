pub mod job;
pub mod registry;
pub mod worker;

pub use job::{JobStatus, MailingJob};
pub use registry::MailingRegistry;
pub use worker::MailingWorker;

use std::sync::Arc;

use parking_lot::Mutex;

use super::job::{JobStatus, MailingJob};

/// Process-wide list of every mailing job started since boot.
///
/// Lifecycle: created once at startup, jobs inserted at creation, never
/// evicted. A restart loses all jobs and their history; mailings are
/// intentionally not durable.
#[derive(Default)]
pub struct MailingRegistry {
    jobs: Mutex<Vec<Arc<MailingJob>>>,
}

impl MailingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, job: Arc<MailingJob>) {
        self.jobs.lock().push(job);
    }

    pub fn get(&self, id: &str) -> Option<Arc<MailingJob>> {
        self.jobs.lock().iter().find(|job| job.id() == id).cloned()
    }

    /// Status snapshots, newest job first.
    pub fn statuses(&self) -> Vec<JobStatus> {
        let jobs = self.jobs.lock();
        let mut statuses: Vec<JobStatus> = jobs.iter().map(|job| job.status()).collect();
        statuses.reverse();
        statuses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MailPayload, Recipient};

    fn job(text: &str) -> Arc<MailingJob> {
        Arc::new(MailingJob::new(
            vec![Recipient::new(1, "u")],
            MailPayload::new(Some(text.to_string()), None).unwrap(),
        ))
    }

    #[test]
    fn lookup_by_id_and_newest_first_listing() {
        let registry = MailingRegistry::new();
        let first = job("a");
        let second = job("b");
        registry.insert(first.clone());
        registry.insert(second.clone());

        assert!(registry.get(first.id()).is_some());
        assert!(registry.get("missing").is_none());

        let statuses = registry.statuses();
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].id, second.id());
    }
}

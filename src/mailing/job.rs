use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{MailPayload, Recipient};

/// One broadcast over a recipient snapshot taken at creation time.
///
/// Progress sits behind a single mutex: the worker that runs the job is the
/// only writer, status readers take the same lock, so a status snapshot is
/// always internally consistent and counts only ever grow.
pub struct MailingJob {
    id: String,
    created_at: DateTime<Utc>,
    payload: MailPayload,
    recipients: Vec<Recipient>,
    progress: Mutex<Progress>,
}

#[derive(Default)]
struct Progress {
    sent: Vec<i64>,
    failed: Vec<i64>,
    finished: bool,
}

impl MailingJob {
    pub fn new(recipients: Vec<Recipient>, payload: MailPayload) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            created_at: Utc::now(),
            payload,
            recipients,
            progress: Mutex::new(Progress::default()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn payload(&self) -> &MailPayload {
        &self.payload
    }

    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    pub fn total(&self) -> usize {
        self.recipients.len()
    }

    /// Records one successful delivery. Each recipient is recorded at most
    /// once, in exactly one of the two outcome sets.
    pub(crate) fn record_sent(&self, chat_id: i64) {
        let mut progress = self.progress.lock();
        if !progress.sent.contains(&chat_id) && !progress.failed.contains(&chat_id) {
            progress.sent.push(chat_id);
        }
    }

    pub(crate) fn record_failed(&self, chat_id: i64) {
        let mut progress = self.progress.lock();
        if !progress.sent.contains(&chat_id) && !progress.failed.contains(&chat_id) {
            progress.failed.push(chat_id);
        }
    }

    pub(crate) fn finish(&self) {
        self.progress.lock().finished = true;
    }

    pub fn status(&self) -> JobStatus {
        let progress = self.progress.lock();
        JobStatus {
            id: self.id.clone(),
            started_at: self.created_at,
            sent: progress.sent.len(),
            failed: progress.failed.len(),
            total: self.recipients.len(),
            in_progress: !progress.finished,
        }
    }
}

/// Point-in-time counters for one job, as shown on the status page.
#[derive(Debug, Clone, Serialize)]
pub struct JobStatus {
    pub id: String,
    pub started_at: DateTime<Utc>,
    pub sent: usize,
    pub failed: usize,
    pub total: usize,
    pub in_progress: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(chat_ids: &[i64]) -> MailingJob {
        let recipients = chat_ids
            .iter()
            .map(|id| Recipient::new(*id, format!("user-{id}")))
            .collect();
        let payload = MailPayload::new(Some("hello".to_string()), None).unwrap();
        MailingJob::new(recipients, payload)
    }

    #[test]
    fn fresh_job_is_in_progress_with_zero_counters() {
        let status = job(&[1, 2]).status();
        assert!(status.in_progress);
        assert_eq!((status.sent, status.failed, status.total), (0, 0, 2));
    }

    #[test]
    fn outcomes_stay_disjoint_even_on_double_record() {
        let job = job(&[1, 2, 3]);
        job.record_sent(1);
        job.record_failed(1);
        job.record_sent(1);
        job.record_failed(2);

        let status = job.status();
        assert_eq!(status.sent, 1);
        assert_eq!(status.failed, 1);
        assert!(status.sent + status.failed <= status.total);
    }

    #[test]
    fn finish_clears_in_progress() {
        let job = job(&[]);
        job.finish();
        assert!(!job.status().in_progress);
    }
}

use std::sync::Arc;

use anyhow::Result;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    domain::{MailPayload, MediaKind},
    telegram::MessageTransport,
};

use super::job::MailingJob;

/// Single background worker that executes mailing jobs one at a time.
///
/// Jobs arrive over a channel so the HTTP handler that starts a mailing
/// returns immediately; progress is observed through the job's counters.
/// Delivery is best effort: one recipient failing never aborts the rest,
/// and there are no retries.
pub struct MailingWorker {
    jobs: mpsc::UnboundedReceiver<Arc<MailingJob>>,
    transport: Arc<dyn MessageTransport>,
}

impl MailingWorker {
    pub fn new(
        transport: Arc<dyn MessageTransport>,
    ) -> (mpsc::UnboundedSender<Arc<MailingJob>>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            tx,
            Self {
                jobs: rx,
                transport,
            },
        )
    }

    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    async fn run(mut self, cancel: CancellationToken) {
        loop {
            let job = tokio::select! {
                job = self.jobs.recv() => job,
                _ = cancel.cancelled() => break,
            };
            let Some(job) = job else { break };
            self.run_job(&job).await;
        }

        // Finish whatever was already queued before stopping.
        while let Ok(job) = self.jobs.try_recv() {
            self.run_job(&job).await;
        }
        tracing::info!(target: "mailing", "mailing worker stopped");
    }

    pub async fn run_job(&self, job: &MailingJob) {
        tracing::info!(
            target: "mailing",
            id = %job.id(),
            total = job.total(),
            "mailing started"
        );

        for recipient in job.recipients() {
            match deliver(self.transport.as_ref(), recipient.chat_id, job.payload()).await {
                Ok(()) => job.record_sent(recipient.chat_id),
                Err(err) => {
                    tracing::warn!(
                        target: "mailing",
                        id = %job.id(),
                        chat_id = recipient.chat_id,
                        error = %err,
                        "delivery failed"
                    );
                    job.record_failed(recipient.chat_id);
                }
            }
        }

        job.finish();
        let status = job.status();
        tracing::info!(
            target: "mailing",
            id = %job.id(),
            sent = status.sent,
            failed = status.failed,
            total = status.total,
            "mailing finished"
        );
    }
}

/// Picks the transport call matching the payload's media family. The
/// family was classified once when the payload was built.
pub async fn deliver(
    transport: &dyn MessageTransport,
    chat_id: i64,
    payload: &MailPayload,
) -> Result<()> {
    match &payload.attachment {
        Some(attachment) => {
            let bytes = attachment.bytes.clone();
            let caption = payload.caption();
            match attachment.kind {
                MediaKind::Image => transport.send_photo(chat_id, bytes, caption).await,
                MediaKind::Video => transport.send_video(chat_id, bytes, caption).await,
                MediaKind::Document => {
                    transport
                        .send_document(chat_id, bytes, &attachment.filename, caption)
                        .await
                }
            }
        }
        None => {
            // Payload construction guarantees text is present here.
            transport
                .send_text(chat_id, payload.caption().unwrap_or_default())
                .await
        }
    }
}

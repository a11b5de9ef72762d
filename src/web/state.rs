use std::{path::PathBuf, sync::Arc};

use tokio::sync::mpsc;

use crate::{
    config::AdminConfig,
    db::{
        AccessCodeRepository, DutyRepository, MessageRepository, RoleRepository, UserRepository,
    },
    mailing::{MailingJob, MailingRegistry},
    telegram::MessageTransport,
};

/// Everything the admin handlers need, shared via an axum extension.
#[derive(Clone)]
pub struct WebState {
    pub admin: AdminConfig,
    pub static_dir: PathBuf,
    pub users: UserRepository,
    pub messages: MessageRepository,
    pub roles: RoleRepository,
    pub duties: DutyRepository,
    pub access_codes: AccessCodeRepository,
    pub registry: Arc<MailingRegistry>,
    pub mailing_tx: mpsc::UnboundedSender<Arc<MailingJob>>,
    pub transport: Arc<dyn MessageTransport>,
}

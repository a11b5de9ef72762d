use std::{sync::Arc, time::Duration};

use anyhow::Result;
use sqlx::sqlite::SqlitePool;
use teloxide::prelude::*;
use tokio::{net::TcpListener, task::JoinHandle, time::timeout};
use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    db::{
        self, AccessCodeRepository, DutyRepository, MessageRepository, RoleRepository,
        UserRepository,
    },
    infrastructure::directories::ResolvedPaths,
    mailing::{MailingRegistry, MailingWorker},
    telegram::{BotTransport, TelegramService},
    web::{self, WebState},
};

pub struct BotdeskApp {
    cancel: CancellationToken,
    pool: SqlitePool,
    telegram: TelegramService,
    worker_handle: JoinHandle<()>,
    http_handle: JoinHandle<std::io::Result<()>>,
}

impl BotdeskApp {
    pub async fn initialize(
        config: AppConfig,
        paths: ResolvedPaths,
        cancel: CancellationToken,
    ) -> Result<Self> {
        let pool = db::init_pool(&paths.db_path).await?;
        let users = UserRepository::new(pool.clone());
        let messages = MessageRepository::new(pool.clone());
        let roles = RoleRepository::new(pool.clone());
        let duties = DutyRepository::new(pool.clone());
        let access_codes = AccessCodeRepository::new(pool.clone());

        let bot = Bot::new(&config.telegram_bot_token);
        let transport = Arc::new(BotTransport::new(bot.clone()));
        let registry = Arc::new(MailingRegistry::new());

        let (mailing_tx, worker) = MailingWorker::new(transport.clone());
        let worker_handle = worker.spawn(cancel.child_token());

        let telegram = TelegramService::new(bot, users.clone(), messages.clone());

        let state = WebState {
            admin: config.admin.clone(),
            static_dir: paths.static_dir.clone(),
            users,
            messages,
            roles,
            duties,
            access_codes,
            registry,
            mailing_tx,
            transport,
        };
        let router = web::router(state);

        let listener = TcpListener::bind(&config.http.bind_addr).await?;
        tracing::info!(target: "web", addr = %config.http.bind_addr, "admin panel listening");
        let http_cancel = cancel.clone();
        let http_handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(http_cancel.cancelled_owned())
                .await
        });

        Ok(Self {
            cancel,
            pool,
            telegram,
            worker_handle,
            http_handle,
        })
    }

    pub async fn run(self) -> Result<()> {
        let BotdeskApp {
            cancel,
            pool,
            telegram,
            mut worker_handle,
            http_handle,
        } = self;

        tracing::info!("botdesk started");

        let shutdown_timeout = Duration::from_secs(5);
        let mut telegram_future = Box::pin(telegram.run(cancel.clone()));
        let mut telegram_finished = false;

        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("shutdown requested");
            }
            res = &mut telegram_future => {
                telegram_finished = true;
                if let Err(err) = res {
                    tracing::error!(?err, "telegram dispatcher exited with error");
                }
            }
        }

        cancel.cancel();

        if !telegram_finished {
            match timeout(shutdown_timeout, &mut telegram_future).await {
                Ok(Err(err)) => tracing::error!(?err, "error while stopping telegram dispatcher"),
                Ok(Ok(())) => {}
                Err(_) => tracing::warn!(
                    target: "telegram",
                    "dispatcher did not stop within {:?}",
                    shutdown_timeout
                ),
            }
        }

        if timeout(shutdown_timeout, http_handle).await.is_err() {
            tracing::warn!(
                target: "web",
                "http server did not stop within {:?}",
                shutdown_timeout
            );
        }

        // Give the worker a chance to finish queued mailings, then cut it off.
        match timeout(shutdown_timeout, &mut worker_handle).await {
            Ok(Err(err)) if err.is_panic() => {
                tracing::error!(target: "mailing", "mailing worker panicked");
            }
            Ok(_) => {}
            Err(_) => {
                tracing::warn!(
                    target: "mailing",
                    "mailing worker did not stop within {:?}, aborting",
                    shutdown_timeout
                );
                worker_handle.abort();
            }
        }

        pool.close().await;
        tracing::info!("botdesk stopped");
        Ok(())
    }
}

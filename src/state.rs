use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{postgres::PgStore, Store},
    mailer::{LogMailer, Mailer, SesMailer},
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = PgStore::connect(&config.database_url, config.max_connections).await?;
        store.migrate().await?;

        let mailer = match &config.mail {
            Some(mail) => Arc::new(SesMailer::new(mail).await?) as Arc<dyn Mailer>,
            None => {
                tracing::warn!("MAIL_SENDER not set; verification emails will only be logged");
                Arc::new(LogMailer) as Arc<dyn Mailer>
            }
        };

        Ok(Self::from_parts(Arc::new(store), config, mailer))
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        config: Arc<AppConfig>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            store,
            config,
            mailer,
        }
    }
}

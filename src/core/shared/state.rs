use std::sync::Arc;

use crate::core::bot::channels::line::LineAdapter;
use crate::core::bot::BotApp;
use crate::core::config::AppConfig;
use crate::core::error::BotResult;
use crate::recognizer::RecognizerClient;
use crate::reply::ReplyAssembler;
use crate::security::ReferenceCodec;

/// Read-only state shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub bot: Arc<BotApp>,
}

impl AppState {
    pub fn new(config: AppConfig, bot: BotApp) -> Self {
        Self {
            config: Arc::new(config),
            bot: Arc::new(bot),
        }
    }

    /// Wires the LINE adapter and the recognizer client from configuration.
    pub fn from_config(config: AppConfig) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.recognizer.timeout)
            .build()?;
        let channel = LineAdapter::new(&config.line, http);
        let backend = RecognizerClient::new(&config.recognizer)?;

        let bot = BotApp::new(
            Arc::new(channel),
            Arc::new(backend),
            ReferenceCodec::new(&config.reference_secret),
            ReplyAssembler::new(&config.server.base_url, config.locale),
        );
        Ok(Self::new(config, bot))
    }
}

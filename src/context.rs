use std::sync::Arc;

use crate::config::ProviderConfig;
use crate::services::LanguageModelService;

#[derive(Clone)]
pub struct AppContext {
    pub config: ProviderConfig,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(config: ProviderConfig, language_model: Arc<dyn LanguageModelService>) -> Self {
        Self {
            config,
            language_model,
        }
    }
}

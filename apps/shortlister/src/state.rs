use std::sync::Arc;

use crate::config::Config;
use crate::scoring::config::ScoringConfig;
use crate::scoring::pipeline::ScoringServices;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Loaded and validated once at startup. Requests may override it per run.
    pub scoring: Arc<ScoringConfig>,
    /// Embedding and generation backends plus the retry policy wrapped around them.
    pub services: ScoringServices,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm_client::mock::LetterEmbedder;
    use crate::llm_client::retry::RetryPolicy;
    use crate::llm_client::GenerationService;
    use crate::scoring::config::tests::SAMPLE_YAML;

    /// State backed by in-process services and the sample scoring config.
    pub(crate) fn test_state(generator: Arc<dyn GenerationService>) -> AppState {
        AppState {
            config: Config::from_lookup(|_| None).unwrap(),
            scoring: Arc::new(ScoringConfig::from_yaml_str(SAMPLE_YAML).unwrap()),
            services: ScoringServices {
                embedder: Arc::new(LetterEmbedder),
                generator,
                retry: RetryPolicy::none(),
            },
        }
    }
}

//! Application State Management
//!
//! `AppState` bundles the cart store, the optional AI collaborator and the
//! settings every handler needs.

use std::{future::Future, sync::Arc, time::Duration};

use super::store::CartStore;
use crate::ai::{AiError, AiService, OllamaClient, OllamaConfig};
use crate::config::Settings;

// =============================================================================
// Application State
// =============================================================================

/// Shared application state that can be safely passed between threads
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: Arc<CartStore>,

    /// `None` when AI enrichment is disabled
    pub ai: Option<Arc<dyn AiService>>,

    pub settings: Settings,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_ai(Settings::default(), None)
    }
}

impl AppState {
    /// Builds the state from settings, connecting to Ollama when enabled.
    pub fn new(settings: Settings) -> Result<Self, AiError> {
        let ai: Option<Arc<dyn AiService>> = if settings.ai_enabled {
            let client = OllamaClient::new(OllamaConfig::from(&settings))?;
            tracing::info!(
                base_url = %settings.ollama_base_url,
                model = %settings.ollama_model,
                "AI enrichment enabled"
            );
            Some(Arc::new(client))
        } else {
            tracing::info!("AI enrichment disabled");
            None
        };

        Ok(Self::with_ai(settings, ai))
    }

    pub fn with_ai(settings: Settings, ai: Option<Arc<dyn AiService>>) -> Self {
        Self {
            store: Arc::new(CartStore::new(settings.cart_limits())),
            ai,
            settings,
        }
    }

    pub fn ai_timeout(&self) -> Duration {
        self.settings.ai_timeout()
    }

    /// Runs an AI call on its own task, bounded by the configured timeout.
    ///
    /// Returns `None` when AI is disabled. The call never sees a store guard,
    /// so whatever it does cannot affect cart state.
    pub async fn enrich<T, F, Fut>(&self, call: F) -> Option<Result<T, AiError>>
    where
        F: FnOnce(Arc<dyn AiService>) -> Fut,
        Fut: Future<Output = Result<T, AiError>> + Send + 'static,
        T: Send + 'static,
    {
        let ai = self.ai.clone()?;
        let mut task = tokio::spawn(call(ai));

        let outcome = match tokio::time::timeout(self.ai_timeout(), &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(AiError::Transport(format!(
                "enrichment task failed: {}",
                join_error
            ))),
            Err(_) => {
                task.abort();
                Err(AiError::Timeout)
            }
        };

        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "AI enrichment failed");
        }
        Some(outcome)
    }
}

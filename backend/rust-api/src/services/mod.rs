use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

pub mod auditor;
pub mod capabilities_service;
pub mod history_service;
pub mod mastery_service;
pub mod scoring;
pub mod scoring_session_service;

use auditor::ComplianceAuditor;
use capabilities_service::{CapabilitiesProvider, CapabilitiesService, HttpCapabilitiesProvider};
use history_service::{HistoryPersister, HistoryService, JsonFilePersister, MemoryPersister};
use mastery_service::MasteryService;
use scoring_session_service::ScoringSessionService;

pub struct AppState {
    pub config: Config,
    pub scoring_sessions: ScoringSessionService,
    pub auditor: ComplianceAuditor,
    pub mastery: MasteryService,
    pub capabilities: CapabilitiesService,
    pub history: HistoryService,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let provider = HttpCapabilitiesProvider::new(
            config.capabilities.function_url.clone(),
            Duration::from_secs(config.capabilities.timeout_secs),
            config.capabilities.max_attempts,
        )?;
        if config.capabilities.function_url.is_none() {
            tracing::warn!("capabilities.function_url is not set; /api/v1/capabilities will return 503");
        }

        let persister: Arc<dyn HistoryPersister> = match &config.history.storage_dir {
            Some(dir) => {
                tracing::info!("Course history persisted under {}", dir.display());
                Arc::new(JsonFilePersister::new(dir.clone()))
            }
            None => {
                tracing::info!("Course history kept in memory");
                Arc::new(MemoryPersister::new())
            }
        };

        Ok(Self::with_components(config, Arc::new(provider), persister))
    }

    /// Builds the state around explicit capability and history backends.
    pub fn with_components(
        config: Config,
        provider: Arc<dyn CapabilitiesProvider>,
        persister: Arc<dyn HistoryPersister>,
    ) -> Self {
        let scoring_sessions = ScoringSessionService::new(
            config.scoring,
            config.sessions.retention(),
            config.sessions.idle(),
        );
        let auditor = ComplianceAuditor::new(config.policy.clone());
        let mastery = MasteryService::new(config.policy.clone());
        let capabilities = CapabilitiesService::new(
            provider,
            Duration::from_secs(config.capabilities.cache_ttl_secs),
        );
        let history = HistoryService::new(persister, config.history.max_entries);

        Self {
            config,
            scoring_sessions,
            auditor,
            mastery,
            capabilities,
            history,
        }
    }
}

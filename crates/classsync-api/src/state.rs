//! Application state wiring all services together.
//!
//! Services are generic over the `KvStore` port; AppState pins them to the
//! file-backed store in the data directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use classsync_core::feedback::FeedbackService;
use classsync_core::repository::{Collection, RecordRepository, SeedData};
use classsync_core::service::{AuthGateway, ClassroomService};
use classsync_core::voting::{VoteLedger, VotingSessionManager};
use classsync_infra::config::load_config;
use classsync_infra::filesystem::{resolve_data_dir, store_dir};
use classsync_infra::llm::gemini::GeminiFeedbackGenerator;
use classsync_infra::secret::resolve_api_key;
use classsync_infra::storage::FileKvStore;
use classsync_types::config::{ClassSyncConfig, FeedbackConfig};

/// Shared application state holding all services.
pub struct AppState {
    pub records: Arc<RecordRepository<FileKvStore>>,
    pub sessions: Arc<VotingSessionManager<FileKvStore>>,
    pub ledger: VoteLedger<FileKvStore>,
    pub auth: AuthGateway<FileKvStore>,
    pub classroom: ClassroomService<FileKvStore>,
    pub feedback: FeedbackService<GeminiFeedbackGenerator>,
    pub config: ClassSyncConfig,
    pub data_dir: PathBuf,
    /// Collections seeded by this start-up (empty once initialized).
    pub seeded: Vec<Collection>,
}

impl AppState {
    /// Initialize against the resolved data directory.
    pub async fn init() -> anyhow::Result<Self> {
        Self::init_at(resolve_data_dir()).await
    }

    /// Open the store, seed missing collections, and wire services.
    pub async fn init_at(data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;
        let store = FileKvStore::open(store_dir(&data_dir))?;

        let seed = SeedData::default();
        let records = Arc::new(RecordRepository::new(store));
        let seeded = records
            .initialize_defaults(&seed)
            .context("failed to seed default records")?;

        let sessions = Arc::new(VotingSessionManager::new(records.clone()));
        let ledger = VoteLedger::new(records.clone(), sessions.clone());
        let auth = AuthGateway::new(records.clone());
        let classroom = ClassroomService::with_seed(records.clone(), seed);
        let feedback = FeedbackService::new(build_generator(&config.feedback));

        tracing::debug!(data_dir = %data_dir.display(), "application state ready");

        Ok(Self {
            records,
            sessions,
            ledger,
            auth,
            classroom,
            feedback,
            config,
            data_dir,
            seeded,
        })
    }

    pub fn store_dir(&self) -> PathBuf {
        store_dir(&self.data_dir)
    }
}

/// A Gemini generator when feedback is enabled and an API key is set.
fn build_generator(config: &FeedbackConfig) -> Option<GeminiFeedbackGenerator> {
    if !config.enabled {
        tracing::debug!("AI feedback disabled in config");
        return None;
    }
    let Some(api_key) = resolve_api_key() else {
        tracing::debug!("no API key set, AI feedback will use the placeholder");
        return None;
    };
    match GeminiFeedbackGenerator::new(api_key, config) {
        Ok(generator) => Some(generator),
        Err(e) => {
            tracing::warn!("failed to set up Gemini client: {e}");
            None
        }
    }
}

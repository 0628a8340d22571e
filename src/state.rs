use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::RwLock;
use tracing::info;

use claimiq::claims::ClaimEngine;
use claimiq::config::Settings;
use claimiq::docs::SessionStore;

pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub settings: Arc<RwLock<Settings>>,
    engine: Arc<RwLock<Arc<ClaimEngine>>>,
    pub admin_ids: HashSet<u64>,
}

impl AppState {
    pub fn new(settings: Settings, admin_ids: HashSet<u64>) -> Result<Self> {
        let engine = ClaimEngine::from_settings(&settings)?;
        Ok(Self {
            sessions: Arc::new(SessionStore::new()),
            settings: Arc::new(RwLock::new(settings)),
            engine: Arc::new(RwLock::new(Arc::new(engine))),
            admin_ids,
        })
    }

    pub fn is_admin(&self, user_id: u64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// The engine in effect right now. Callers keep it for a whole run.
    pub async fn engine(&self) -> Arc<ClaimEngine> {
        self.engine.read().await.clone()
    }

    /// Apply new settings and swap in an engine built from them.
    pub async fn reconfigure(&self, settings: Settings) -> Result<()> {
        let engine = Arc::new(ClaimEngine::from_settings(&settings)?);
        let backend = engine.backend().name();
        *self.engine.write().await = engine;
        *self.settings.write().await = settings;
        info!(backend, "Claim engine reconfigured");
        Ok(())
    }
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;

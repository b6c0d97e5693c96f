//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum. Cada pieza mutable vive detrás de su propio
//! `RwLock`; ningún lock se mantiene durante una llamada remota.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{CaseRepository, DispatchRegistry, IncidentRepository};
use crate::services::{DashboardState, FireAnalysisBackend, LiveChannel};
use crate::utils::clock::Clock;

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub registry: Arc<RwLock<DispatchRegistry>>,
    pub dashboard: Arc<RwLock<DashboardState>>,
    pub incidents: Arc<RwLock<IncidentRepository>>,
    pub cases: Arc<RwLock<CaseRepository>>,
    pub backend: Arc<dyn FireAnalysisBackend>,
    pub live: LiveChannel,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(config: EnvironmentConfig, backend: Arc<dyn FireAnalysisBackend>, clock: Arc<dyn Clock>) -> Self {
        let registry = DispatchRegistry::seed(&config.fleet(), clock.clone());
        let live = LiveChannel::new(config.live_broadcast_capacity);

        Self {
            config,
            registry: Arc::new(RwLock::new(registry)),
            dashboard: Arc::new(RwLock::new(DashboardState::new())),
            incidents: Arc::new(RwLock::new(IncidentRepository::new())),
            cases: Arc::new(RwLock::new(CaseRepository::new())),
            backend,
            live,
            clock,
        }
    }
}

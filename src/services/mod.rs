//! Services module
//!
//! Integración con el backend de análisis, estado del panel y el canal en
//! vivo con su ticker.

pub mod analysis_backend;
pub mod dashboard_state;
pub mod display_ticker;
pub mod live_channel;

pub use analysis_backend::{FireAnalysisBackend, HttpFireAnalysisBackend};
pub use dashboard_state::DashboardState;
pub use display_ticker::DisplayTicker;
pub use live_channel::{LiveChannel, LiveMessage};

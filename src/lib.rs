//! Fire Dispatch
//!
//! Servicio del panel de monitoreo de incendios: registro de despacho de
//! vehículos de emergencia, integración con el backend de análisis y canal
//! en vivo para los clientes del panel.

pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app_router;
pub use state::AppState;

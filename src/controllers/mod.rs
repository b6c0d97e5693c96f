//! Controladores
//!
//! Se construyen por petición a partir del `AppState`.

pub mod analysis_controller;
pub mod case_controller;
pub mod dispatch_controller;
pub mod incident_controller;

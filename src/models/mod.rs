//! Modelos del sistema
//!
//! Este módulo contiene los modelos de dominio: la flota de vehículos,
//! los incidentes, los resultados de análisis y los reportes de caso.

pub mod analysis;
pub mod case_report;
pub mod incident;
pub mod notification;
pub mod vehicle;

pub use analysis::*;
pub use case_report::*;
pub use incident::*;
pub use notification::*;
pub use vehicle::*;

//! Repositorios en memoria
//!
//! El registro de despacho es el núcleo; incidentes y casos son listas
//! simples que solo crecen.

pub mod case_repository;
pub mod dispatch_registry;
pub mod incident_repository;

pub use case_repository::CaseRepository;
pub use dispatch_registry::{DispatchError, DispatchRegistry};
pub use incident_repository::IncidentRepository;

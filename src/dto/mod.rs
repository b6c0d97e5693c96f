//! DTOs de la API
//!
//! Requests y responses que cruzan la frontera HTTP.

pub mod analysis_dto;
pub mod api_response;
pub mod case_dto;
pub mod dispatch_dto;
pub mod incident_dto;

pub use api_response::ApiResponse;

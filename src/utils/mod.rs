//! Utilidades del sistema
//!
//! Este módulo contiene el manejo de errores HTTP, los extractores de la API
//! y el reloj inyectable.

pub mod clock;
pub mod errors;
pub mod extract;

pub use clock::*;

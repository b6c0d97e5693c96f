//! Extractores de la API
//!
//! Envoltorios de `Json`, `Path` y `Query` cuyos rechazos salen con el mismo
//! sobre de error que el resto de la API.

use axum::extract::{FromRequest, FromRequestParts};

use crate::utils::errors::AppError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno. Cada variable tiene un
//! valor por defecto; un valor mal formado es un error, nunca un panic.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::repositories::dispatch_registry::FleetComposition;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{key} must be a valid {expected}, got '{value}'")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub analysis_backend_url: String,
    pub backend_timeout_secs: u64,
    pub video_feed_url: String,
    pub fleet_fire_trucks: u32,
    pub fleet_ambulances: u32,
    pub display_tick_secs: u64,
    pub live_broadcast_capacity: usize,
    pub max_upload_bytes: usize,
}

const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
            analysis_backend_url: DEFAULT_BACKEND_URL.to_string(),
            backend_timeout_secs: 10,
            video_feed_url: format!("{}/video_feed", DEFAULT_BACKEND_URL),
            fleet_fire_trucks: 5,
            fleet_ambulances: 5,
            display_tick_secs: 60,
            live_broadcast_capacity: 64,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración de las variables de entorno
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construir la configuración a partir de una función de búsqueda
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let analysis_backend_url = get("ANALYSIS_BACKEND_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.analysis_backend_url);
        let video_feed_url =
            get("VIDEO_FEED_URL").unwrap_or_else(|| format!("{}/video_feed", analysis_backend_url));

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or(defaults.environment),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_or(&get, "PORT", defaults.port, "port number")?,
            cors_origins: get("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            analysis_backend_url,
            backend_timeout_secs: parse_or(&get, "BACKEND_TIMEOUT_SECS", defaults.backend_timeout_secs, "number of seconds")?,
            video_feed_url,
            fleet_fire_trucks: parse_or(&get, "FLEET_FIRE_TRUCKS", defaults.fleet_fire_trucks, "vehicle count")?,
            fleet_ambulances: parse_or(&get, "FLEET_AMBULANCES", defaults.fleet_ambulances, "vehicle count")?,
            display_tick_secs: parse_or(&get, "DISPLAY_TICK_SECS", defaults.display_tick_secs, "number of seconds")?,
            live_broadcast_capacity: parse_or(
                &get,
                "LIVE_BROADCAST_CAPACITY",
                defaults.live_broadcast_capacity,
                "channel capacity",
            )?,
            max_upload_bytes: parse_or(&get, "MAX_UPLOAD_BYTES", defaults.max_upload_bytes, "byte count")?,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn fleet(&self) -> FleetComposition {
        FleetComposition {
            fire_trucks: self.fleet_fire_trucks,
            ambulances: self.fleet_ambulances,
        }
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs.max(1))
    }

    pub fn display_tick(&self) -> Duration {
        Duration::from_secs(self.display_tick_secs.max(1))
    }
}

fn parse_or<T, G>(get: &G, key: &'static str, default: T, expected: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value, expected }),
    }
}

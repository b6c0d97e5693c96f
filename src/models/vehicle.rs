//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle de la flota de emergencia y los
//! enums que describen su tipo, su estado y la confirmación de llegada.
//! Las transiciones de estado viven aquí; el registro de despacho decide
//! cuándo se pueden aplicar.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identificador estable de un vehículo (`V-001`, `V-002`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VehicleId(u32);

impl VehicleId {
    pub fn new(sequence: u32) -> Self {
        Self(sequence)
    }

    pub fn sequence(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for VehicleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V-{:03}", self.0)
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("Invalid vehicle id '{0}', expected format V-001")]
pub struct InvalidVehicleId(pub String);

impl FromStr for VehicleId {
    type Err = InvalidVehicleId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("V-")
            .ok_or_else(|| InvalidVehicleId(s.to_string()))?;

        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidVehicleId(s.to_string()));
        }

        let id = digits
            .parse::<u32>()
            .map(VehicleId)
            .map_err(|_| InvalidVehicleId(s.to_string()))?;

        // Solo la forma canónica: "V-1" y "V-0001" no nombran a V-001
        if id.to_string() != trimmed {
            return Err(InvalidVehicleId(s.to_string()));
        }
        Ok(id)
    }
}

impl TryFrom<String> for VehicleId {
    type Error = InvalidVehicleId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VehicleId> for String {
    fn from(id: VehicleId) -> Self {
        id.to_string()
    }
}

/// Tipo de vehículo de emergencia
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleType {
    FireTruck,
    Ambulance,
}

impl VehicleType {
    /// Todos los tipos conocidos, en el orden en que se procesan los despachos
    pub const ALL: [VehicleType; 2] = [VehicleType::FireTruck, VehicleType::Ambulance];

    /// Etiqueta legible para el panel
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::FireTruck => "Fire Truck",
            VehicleType::Ambulance => "Ambulance",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estado del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    Available,
    Dispatched,
    Maintenance,
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VehicleStatus::Available => "available",
            VehicleStatus::Dispatched => "dispatched",
            VehicleStatus::Maintenance => "maintenance",
        };
        f.write_str(name)
    }
}

/// Confirmación de llegada al destino
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrivalStatus {
    #[default]
    Unknown,
    Confirmed,
    Denied,
}

impl From<bool> for ArrivalStatus {
    fn from(arrived: bool) -> Self {
        if arrived {
            ArrivalStatus::Confirmed
        } else {
            ArrivalStatus::Denied
        }
    }
}

/// Destino y hora de despacho. Existen juntos o no existen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchAssignment {
    pub destination: String,
    pub dispatched_at: DateTime<Utc>,
}

/// Vehicle principal de la flota
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    pub status: VehicleStatus,
    pub assignment: Option<DispatchAssignment>,
    pub arrival: ArrivalStatus,
    pub last_update: DateTime<Utc>,
}

impl Vehicle {
    /// Crear un vehículo disponible, sin despacho ni confirmación
    pub fn available(id: VehicleId, vehicle_type: VehicleType, now: DateTime<Utc>) -> Self {
        Self {
            id,
            vehicle_type,
            status: VehicleStatus::Available,
            assignment: None,
            arrival: ArrivalStatus::Unknown,
            last_update: now,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == VehicleStatus::Available
    }

    pub fn is_dispatched(&self) -> bool {
        self.status == VehicleStatus::Dispatched
    }

    pub fn dispatched_to(&self) -> Option<&str> {
        self.assignment.as_ref().map(|a| a.destination.as_str())
    }

    pub fn dispatched_at(&self) -> Option<DateTime<Utc>> {
        self.assignment.as_ref().map(|a| a.dispatched_at)
    }

    pub(crate) fn mark_dispatched(&mut self, destination: &str, now: DateTime<Utc>) {
        self.status = VehicleStatus::Dispatched;
        self.assignment = Some(DispatchAssignment {
            destination: destination.to_string(),
            dispatched_at: now,
        });
        self.arrival = ArrivalStatus::Unknown;
        self.last_update = now;
    }

    pub(crate) fn mark_recalled(&mut self, now: DateTime<Utc>) {
        self.status = VehicleStatus::Available;
        self.assignment = None;
        self.arrival = ArrivalStatus::Unknown;
        self.last_update = now;
    }

    pub(crate) fn mark_arrival(&mut self, arrived: bool, now: DateTime<Utc>) {
        self.arrival = ArrivalStatus::from(arrived);
        self.last_update = now;
    }

    pub(crate) fn set_status(&mut self, status: VehicleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.last_update = now;
    }
}

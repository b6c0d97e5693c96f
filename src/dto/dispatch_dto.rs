use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::vehicle::{ArrivalStatus, Vehicle, VehicleId, VehicleStatus, VehicleType};
use crate::repositories::dispatch_registry::{
    DispatchProposal, DispatchRequest, TypeSelection, VehicleFilter, UNKNOWN_DESTINATION,
};
use crate::utils::clock::time_ago;

// Filtros para listar vehículos
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    pub vehicle_type: Option<VehicleType>,
    pub status: Option<VehicleStatus>,
}

impl From<VehicleListQuery> for VehicleFilter {
    fn from(query: VehicleListQuery) -> Self {
        VehicleFilter {
            vehicle_type: query.vehicle_type,
            status: query.status,
        }
    }
}

// Cantidad pedida de un tipo
#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub vehicle_type: VehicleType,
    pub quantity: u32,
}

// Request para proponer un despacho (no muta nada)
#[derive(Debug, Deserialize, Validate)]
pub struct ProposeDispatchRequest {
    #[serde(default)]
    pub quantities: Vec<QuantityRequest>,

    #[validate(length(max = 500))]
    pub destination: Option<String>,
}

impl ProposeDispatchRequest {
    pub fn to_dispatch_request(&self) -> DispatchRequest {
        self.quantities.iter().map(|q| (q.vehicle_type, q.quantity)).collect()
    }
}

// Request para confirmar un despacho propuesto
#[derive(Debug, Deserialize, Validate)]
pub struct CommitDispatchRequest {
    #[serde(default)]
    pub vehicle_ids: Vec<VehicleId>,

    #[validate(length(max = 500))]
    pub destination: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ArrivalRequest {
    pub arrived: bool,
}

#[derive(Debug, Deserialize)]
pub struct MaintenanceRequest {
    pub in_maintenance: bool,
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    pub type_label: String,
    pub status: VehicleStatus,
    pub dispatched_to: Option<String>,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub arrival: ArrivalStatus,
    pub last_update: DateTime<Utc>,
}

impl From<&Vehicle> for VehicleResponse {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id,
            vehicle_type: vehicle.vehicle_type,
            type_label: vehicle.vehicle_type.label().to_string(),
            status: vehicle.status,
            dispatched_to: vehicle.dispatched_to().map(str::to_string),
            dispatched_at: vehicle.dispatched_at(),
            arrival: vehicle.arrival,
            last_update: vehicle.last_update,
        }
    }
}

impl From<Vehicle> for VehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        VehicleResponse::from(&vehicle)
    }
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub vehicle_type: VehicleType,
    pub type_label: String,
    pub available: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct TypeSelectionResponse {
    pub vehicle_type: VehicleType,
    pub requested: u32,
    pub selected: u32,
}

impl From<&TypeSelection> for TypeSelectionResponse {
    fn from(selection: &TypeSelection) -> Self {
        Self {
            vehicle_type: selection.vehicle_type,
            requested: selection.requested,
            selected: selection.selected,
        }
    }
}

// Response de la propuesta, para el diálogo de confirmación
#[derive(Debug, Serialize)]
pub struct ProposalResponse {
    pub vehicle_ids: Vec<VehicleId>,
    pub vehicles: Vec<VehicleResponse>,
    pub breakdown: Vec<TypeSelectionResponse>,
    pub partial: bool,
    pub destination: String,
    pub confirmation: String,
}

impl ProposalResponse {
    pub fn new(proposal: &DispatchProposal, vehicles: Vec<VehicleResponse>, destination: String) -> Self {
        let confirmation = format!("Dispatch {} vehicle(s) to {}?", proposal.len(), destination);
        Self {
            vehicle_ids: proposal.vehicle_ids().to_vec(),
            vehicles,
            breakdown: proposal.breakdown().iter().map(TypeSelectionResponse::from).collect(),
            partial: proposal.is_partial(),
            destination,
            confirmation,
        }
    }
}

// Fila del tablero de vehículos despachados
#[derive(Debug, Serialize)]
pub struct DispatchBoardEntry {
    pub id: VehicleId,
    pub vehicle_type: VehicleType,
    pub type_label: String,
    pub dispatched_to: String,
    pub dispatched_at: Option<DateTime<Utc>>,
    pub time_ago: String,
    pub arrival: ArrivalStatus,
}

impl DispatchBoardEntry {
    pub fn new(vehicle: &Vehicle, now: DateTime<Utc>) -> Self {
        Self {
            id: vehicle.id,
            vehicle_type: vehicle.vehicle_type,
            type_label: vehicle.vehicle_type.label().to_string(),
            dispatched_to: vehicle.dispatched_to().unwrap_or(UNKNOWN_DESTINATION).to_string(),
            dispatched_at: vehicle.dispatched_at(),
            time_ago: time_ago(vehicle.dispatched_at(), now),
            arrival: vehicle.arrival,
        }
    }
}

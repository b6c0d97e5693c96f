//! Registro de despacho
//!
//! Dueño en memoria de la flota de emergencia. Aplica las transiciones de
//! estado de cada vehículo:
//!
//! ```text
//! Available  --commit-->          Dispatched
//! Dispatched --recall-->          Available
//! Dispatched --record_arrival-->  Dispatched (solo cambia la llegada)
//! Available  <--maintenance-->    Maintenance (acción administrativa)
//! ```
//!
//! El despacho tiene dos fases: `propose` calcula la selección sin tocar el
//! estado y `commit` la aplica. El registro es síncrono y nunca espera I/O;
//! quien lo comparte entre varios llamadores debe envolverlo en un lock.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::vehicle::{Vehicle, VehicleId, VehicleStatus, VehicleType};
use crate::utils::clock::Clock;

/// Destino usado cuando no hay ubicación de incidente seleccionada
pub const UNKNOWN_DESTINATION: &str = "Unknown";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DispatchError {
    #[error("No vehicles available for the requested dispatch")]
    NoVehiclesAvailable,

    #[error("Vehicle {0} not found")]
    NotFound(VehicleId),

    #[error("Proposal is stale, vehicles no longer available: {}", format_ids(.0))]
    StaleProposal(Vec<VehicleId>),

    #[error("Cannot {action} vehicle {id} while it is {from}")]
    InvalidTransition {
        id: VehicleId,
        from: VehicleStatus,
        action: &'static str,
    },
}

fn format_ids(ids: &[VehicleId]) -> String {
    ids.iter().map(|id| id.to_string()).collect::<Vec<_>>().join(", ")
}

/// Composición de la flota inicial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FleetComposition {
    pub fire_trucks: u32,
    pub ambulances: u32,
}

impl Default for FleetComposition {
    fn default() -> Self {
        Self {
            fire_trucks: 5,
            ambulances: 5,
        }
    }
}

impl FleetComposition {
    fn count(&self, vehicle_type: VehicleType) -> u32 {
        match vehicle_type {
            VehicleType::FireTruck => self.fire_trucks,
            VehicleType::Ambulance => self.ambulances,
        }
    }

    pub fn total(&self) -> u32 {
        VehicleType::ALL.iter().map(|t| self.count(*t)).sum()
    }
}

/// Cantidad pedida por tipo de vehículo
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchRequest {
    quantities: BTreeMap<VehicleType, u32>,
}

impl DispatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, vehicle_type: VehicleType, quantity: u32) -> Self {
        self.set(vehicle_type, quantity);
        self
    }

    pub fn set(&mut self, vehicle_type: VehicleType, quantity: u32) {
        self.quantities.insert(vehicle_type, quantity);
    }

    pub fn quantity(&self, vehicle_type: VehicleType) -> u32 {
        self.quantities.get(&vehicle_type).copied().unwrap_or(0)
    }

    /// true si ninguna cantidad es mayor que cero
    pub fn is_empty(&self) -> bool {
        self.quantities.values().all(|q| *q == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleType, u32)> + '_ {
        self.quantities.iter().map(|(t, q)| (*t, *q))
    }
}

impl FromIterator<(VehicleType, u32)> for DispatchRequest {
    fn from_iter<I: IntoIterator<Item = (VehicleType, u32)>>(iter: I) -> Self {
        let mut request = DispatchRequest::new();
        for (vehicle_type, quantity) in iter {
            let total = request.quantity(vehicle_type).saturating_add(quantity);
            request.set(vehicle_type, total);
        }
        request
    }
}

/// Pedido vs. seleccionado para un tipo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSelection {
    pub vehicle_type: VehicleType,
    pub requested: u32,
    pub selected: u32,
}

/// Selección candidata, calculada sin mutar el registro
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchProposal {
    vehicle_ids: Vec<VehicleId>,
    breakdown: Vec<TypeSelection>,
}

impl DispatchProposal {
    /// Reconstruir una propuesta a partir de los ids que confirmó el usuario
    pub fn from_vehicle_ids(vehicle_ids: Vec<VehicleId>) -> Self {
        let mut seen = HashSet::new();
        let vehicle_ids = vehicle_ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self {
            vehicle_ids,
            breakdown: Vec::new(),
        }
    }

    pub fn vehicle_ids(&self) -> &[VehicleId] {
        &self.vehicle_ids
    }

    pub fn breakdown(&self) -> &[TypeSelection] {
        &self.breakdown
    }

    pub fn len(&self) -> usize {
        self.vehicle_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicle_ids.is_empty()
    }

    /// true si algún tipo recibió menos vehículos de los pedidos
    pub fn is_partial(&self) -> bool {
        self.breakdown.iter().any(|s| s.selected < s.requested)
    }
}

/// Resultado de un recall
#[derive(Debug, Clone, PartialEq)]
pub enum RecallOutcome {
    Recalled(Vehicle),
    /// El vehículo no estaba despachado; no se tocó nada
    Unchanged(Vehicle),
}

impl RecallOutcome {
    pub fn vehicle(&self) -> &Vehicle {
        match self {
            RecallOutcome::Recalled(v) | RecallOutcome::Unchanged(v) => v,
        }
    }

    pub fn was_recalled(&self) -> bool {
        matches!(self, RecallOutcome::Recalled(_))
    }
}

/// Filtro opcional para listar vehículos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    pub vehicle_type: Option<VehicleType>,
    pub status: Option<VehicleStatus>,
}

impl VehicleFilter {
    fn matches(&self, vehicle: &Vehicle) -> bool {
        self.vehicle_type.map_or(true, |t| vehicle.vehicle_type == t)
            && self.status.map_or(true, |s| vehicle.status == s)
    }
}

pub struct DispatchRegistry {
    vehicles: Vec<Vehicle>,
    clock: Arc<dyn Clock>,
}

impl DispatchRegistry {
    /// Sembrar la flota: tipos intercalados, ids secuenciales desde V-001
    pub fn seed(fleet: &FleetComposition, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let mut remaining: Vec<(VehicleType, u32)> =
            VehicleType::ALL.iter().map(|t| (*t, fleet.count(*t))).collect();
        let mut vehicles = Vec::with_capacity(fleet.total() as usize);
        let mut sequence = 1;

        while remaining.iter().any(|(_, left)| *left > 0) {
            for (vehicle_type, left) in remaining.iter_mut() {
                if *left == 0 {
                    continue;
                }
                vehicles.push(Vehicle::available(VehicleId::new(sequence), *vehicle_type, now));
                sequence += 1;
                *left -= 1;
            }
        }

        info!(vehicles = vehicles.len(), "🚒 Dispatch registry seeded");
        Self { vehicles, clock }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Vehículos en orden de inserción que cumplen el filtro
    pub fn list(&self, filter: VehicleFilter) -> Vec<Vehicle> {
        self.vehicles.iter().filter(|v| filter.matches(v)).cloned().collect()
    }

    pub fn available_count(&self, vehicle_type: VehicleType) -> usize {
        self.vehicles
            .iter()
            .filter(|v| v.vehicle_type == vehicle_type && v.is_available())
            .count()
    }

    /// Calcular la selección para un despacho sin mutar el estado
    pub fn propose(&self, request: &DispatchRequest) -> Result<DispatchProposal, DispatchError> {
        let mut vehicle_ids = Vec::new();
        let mut breakdown = Vec::new();

        for (vehicle_type, requested) in request.iter().filter(|(_, q)| *q > 0) {
            let selected: Vec<VehicleId> = self
                .vehicles
                .iter()
                .filter(|v| v.vehicle_type == vehicle_type && v.is_available())
                .take(requested as usize)
                .map(|v| v.id)
                .collect();

            breakdown.push(TypeSelection {
                vehicle_type,
                requested,
                selected: selected.len() as u32,
            });
            vehicle_ids.extend(selected);
        }

        if vehicle_ids.is_empty() {
            debug!("No vehicles selected for dispatch request {:?}", request);
            return Err(DispatchError::NoVehiclesAvailable);
        }

        Ok(DispatchProposal {
            vehicle_ids,
            breakdown,
        })
    }

    /// Aplicar una propuesta. Todo o nada: si algún vehículo ya no está
    /// disponible no se modifica ninguno.
    pub fn commit(
        &mut self,
        proposal: &DispatchProposal,
        destination: &str,
    ) -> Result<Vec<Vehicle>, DispatchError> {
        if proposal.is_empty() {
            return Err(DispatchError::NoVehiclesAvailable);
        }

        let mut indices = Vec::with_capacity(proposal.len());
        let mut stale = Vec::new();
        for id in proposal.vehicle_ids() {
            match self.index_of(*id) {
                Some(index) if self.vehicles[index].is_available() => indices.push(index),
                _ => stale.push(*id),
            }
        }

        if !stale.is_empty() {
            return Err(DispatchError::StaleProposal(stale));
        }

        let destination = normalize_destination(destination);
        let now = self.clock.now();
        let mut dispatched = Vec::with_capacity(indices.len());
        for index in indices {
            let vehicle = &mut self.vehicles[index];
            vehicle.mark_dispatched(&destination, now);
            dispatched.push(vehicle.clone());
        }

        info!(
            count = dispatched.len(),
            destination = %destination,
            "🚨 Vehicles dispatched: {}",
            format_ids(proposal.vehicle_ids())
        );
        Ok(dispatched)
    }

    /// Proponer y aplicar en un solo paso
    pub fn dispatch(
        &mut self,
        request: &DispatchRequest,
        destination: &str,
    ) -> Result<Vec<Vehicle>, DispatchError> {
        let proposal = self.propose(request)?;
        self.commit(&proposal, destination)
    }

    /// Devolver un vehículo despachado a disponible.
    /// Sobre un vehículo no despachado es un no-op.
    pub fn recall(&mut self, id: VehicleId) -> Result<RecallOutcome, DispatchError> {
        let now = self.clock.now();
        let vehicle = self.vehicle_mut(id)?;

        if !vehicle.is_dispatched() {
            debug!("Recall ignored for {} ({})", id, vehicle.status);
            return Ok(RecallOutcome::Unchanged(vehicle.clone()));
        }

        vehicle.mark_recalled(now);
        info!("↩️ Vehicle {} recalled", id);
        Ok(RecallOutcome::Recalled(vehicle.clone()))
    }

    /// Registrar la confirmación de llegada; no valida el estado actual
    pub fn record_arrival(&mut self, id: VehicleId, arrived: bool) -> Result<Vehicle, DispatchError> {
        let now = self.clock.now();
        let vehicle = self.vehicle_mut(id)?;
        vehicle.mark_arrival(arrived, now);
        info!("📍 Arrival for {} recorded as {:?}", id, vehicle.arrival);
        Ok(vehicle.clone())
    }

    /// Acción administrativa: Available <-> Maintenance
    pub fn set_maintenance(&mut self, id: VehicleId, in_maintenance: bool) -> Result<Vehicle, DispatchError> {
        let now = self.clock.now();
        let vehicle = self.vehicle_mut(id)?;

        let (from, to, action) = if in_maintenance {
            (VehicleStatus::Available, VehicleStatus::Maintenance, "send to maintenance")
        } else {
            (VehicleStatus::Maintenance, VehicleStatus::Available, "return from maintenance")
        };

        if vehicle.status == to {
            return Ok(vehicle.clone());
        }
        if vehicle.status != from {
            return Err(DispatchError::InvalidTransition {
                id,
                from: vehicle.status,
                action,
            });
        }

        vehicle.set_status(to, now);
        info!("🔧 Vehicle {} is now {}", id, to);
        Ok(vehicle.clone())
    }

    fn index_of(&self, id: VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| v.id == id)
    }

    fn vehicle_mut(&mut self, id: VehicleId) -> Result<&mut Vehicle, DispatchError> {
        self.vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or(DispatchError::NotFound(id))
    }
}

fn normalize_destination(destination: &str) -> String {
    let trimmed = destination.trim();
    if trimmed.is_empty() {
        UNKNOWN_DESTINATION.to_string()
    } else {
        trimmed.to_string()
    }
}

use std::sync::Arc;

use tokio::sync::RwLock;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::dispatch_dto::{
    ArrivalRequest, AvailabilityResponse, CommitDispatchRequest, DispatchBoardEntry, MaintenanceRequest,
    ProposalResponse, ProposeDispatchRequest, VehicleListQuery, VehicleResponse,
};
use crate::models::notification::Notification;
use crate::models::vehicle::{VehicleId, VehicleStatus, VehicleType};
use crate::repositories::dispatch_registry::{
    DispatchProposal, DispatchRegistry, RecallOutcome, VehicleFilter, UNKNOWN_DESTINATION,
};
use crate::services::dashboard_state::DashboardState;
use crate::services::live_channel::LiveChannel;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub struct DispatchController {
    registry: Arc<RwLock<DispatchRegistry>>,
    dashboard: Arc<RwLock<DashboardState>>,
    live: LiveChannel,
}

impl DispatchController {
    pub fn new(state: &AppState) -> Self {
        Self {
            registry: state.registry.clone(),
            dashboard: state.dashboard.clone(),
            live: state.live.clone(),
        }
    }

    pub async fn list(&self, query: VehicleListQuery) -> Vec<VehicleResponse> {
        let registry = self.registry.read().await;
        registry
            .list(VehicleFilter::from(query))
            .iter()
            .map(VehicleResponse::from)
            .collect()
    }

    pub async fn availability(&self) -> Vec<AvailabilityResponse> {
        let registry = self.registry.read().await;
        VehicleType::ALL
            .iter()
            .map(|vehicle_type| AvailabilityResponse {
                vehicle_type: *vehicle_type,
                type_label: vehicle_type.label().to_string(),
                available: registry.available_count(*vehicle_type),
                total: registry
                    .list(VehicleFilter {
                        vehicle_type: Some(*vehicle_type),
                        status: None,
                    })
                    .len(),
            })
            .collect()
    }

    /// Calcular la selección; no toca el registro
    pub async fn propose(&self, request: ProposeDispatchRequest) -> Result<ApiResponse<ProposalResponse>, AppError> {
        request.validate()?;
        let destination = self.resolve_destination(request.destination.as_deref()).await;

        let registry = self.registry.read().await;
        let proposal = registry.propose(&request.to_dispatch_request())?;
        let vehicles = proposal
            .vehicle_ids()
            .iter()
            .filter_map(|id| registry.get(*id))
            .map(VehicleResponse::from)
            .collect();
        drop(registry);

        let response = ProposalResponse::new(&proposal, vehicles, destination);
        let mut api_response = ApiResponse::success(response);
        if proposal.is_partial() {
            api_response = api_response.with_notification(Notification::warning(
                "Partial Dispatch",
                format!("Only {} vehicle(s) are available for this request.", proposal.len()),
            ));
        }
        Ok(api_response)
    }

    /// Confirmar una propuesta previa. Todo o nada.
    pub async fn commit(&self, request: CommitDispatchRequest) -> Result<ApiResponse<Vec<VehicleResponse>>, AppError> {
        request.validate()?;
        let destination = self.resolve_destination(request.destination.as_deref()).await;
        let proposal = DispatchProposal::from_vehicle_ids(request.vehicle_ids);

        let dispatched = self.registry.write().await.commit(&proposal, &destination)?;

        self.live.fleet_changed(dispatched.iter().map(|v| v.id).collect());
        let notification = Notification::success(
            "Vehicles Dispatched",
            format!("{} vehicle(s) dispatched.", dispatched.len()),
        );
        self.live.notify(notification.clone());

        let message = format!("{} vehicle(s) dispatched to {}", dispatched.len(), destination);
        let vehicles = dispatched.iter().map(VehicleResponse::from).collect();
        Ok(ApiResponse::success_with_message(vehicles, message).with_notification(notification))
    }

    pub async fn recall(&self, id: VehicleId) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let outcome = self.registry.write().await.recall(id)?;

        match outcome {
            RecallOutcome::Recalled(vehicle) => {
                self.live.fleet_changed(vec![vehicle.id]);
                let notification =
                    Notification::info("Vehicle Recalled", format!("Vehicle {} is now available.", vehicle.id));
                self.live.notify(notification.clone());
                Ok(ApiResponse::success(VehicleResponse::from(vehicle)).with_notification(notification))
            }
            RecallOutcome::Unchanged(vehicle) => {
                let message = format!("Vehicle {} is not dispatched", vehicle.id);
                Ok(ApiResponse::success_with_message(VehicleResponse::from(vehicle), message))
            }
        }
    }

    pub async fn record_arrival(&self, id: VehicleId, request: ArrivalRequest) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let vehicle = self.registry.write().await.record_arrival(id, request.arrived)?;
        self.live.fleet_changed(vec![vehicle.id]);

        let message = if request.arrived {
            format!("Vehicle {} arrived at the scene", vehicle.id)
        } else {
            format!("Vehicle {} has not arrived", vehicle.id)
        };
        Ok(ApiResponse::success_with_message(VehicleResponse::from(vehicle), message))
    }

    pub async fn set_maintenance(
        &self,
        id: VehicleId,
        request: MaintenanceRequest,
    ) -> Result<ApiResponse<VehicleResponse>, AppError> {
        let vehicle = self
            .registry
            .write()
            .await
            .set_maintenance(id, request.in_maintenance)?;
        self.live.fleet_changed(vec![vehicle.id]);

        let message = format!("Vehicle {} is now {}", vehicle.id, vehicle.status);
        Ok(ApiResponse::success_with_message(VehicleResponse::from(vehicle), message))
    }

    /// Vehículos despachados con el tiempo transcurrido
    pub async fn board(&self) -> Vec<DispatchBoardEntry> {
        let registry = self.registry.read().await;
        let now = registry.now();
        registry
            .list(VehicleFilter {
                vehicle_type: None,
                status: Some(VehicleStatus::Dispatched),
            })
            .iter()
            .map(|vehicle| DispatchBoardEntry::new(vehicle, now))
            .collect()
    }

    // Destino explícito, si no la ubicación actual del incidente
    async fn resolve_destination(&self, requested: Option<&str>) -> String {
        if let Some(destination) = requested.map(str::trim).filter(|d| !d.is_empty()) {
            return destination.to_string();
        }

        self.dashboard
            .read()
            .await
            .location()
            .map(|location| location.address.trim().to_string())
            .filter(|address| !address.is_empty())
            .unwrap_or_else(|| UNKNOWN_DESTINATION.to_string())
    }
}

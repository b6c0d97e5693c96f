use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tower::ServiceExt;

use fire_dispatch::config::environment::EnvironmentConfig;
use fire_dispatch::models::analysis::{AnalysisResult, HeatmapData, LiveUpdate, Location};
use fire_dispatch::models::notification::Notification;
use fire_dispatch::services::analysis_backend::{
    BackendError, FireAnalysisBackend, ImageUpload, ZoneAnalysisRequest, ZoneAnalysisResponse,
};
use fire_dispatch::utils::clock::FixedClock;
use fire_dispatch::{create_app_router, AppState};

/// Backend falso: devuelve siempre el mismo riesgo o falla
struct StubBackend {
    risk: f64,
    fail: bool,
}

#[async_trait]
impl FireAnalysisBackend for StubBackend {
    async fn analyze_image(&self, upload: ImageUpload) -> Result<AnalysisResult, BackendError> {
        if self.fail {
            return Err(BackendError::RemoteCallFailed("backend down".to_string()));
        }
        assert!(!upload.bytes.is_empty());
        Ok(AnalysisResult {
            risk_level: self.risk,
            heatmap_data: HeatmapData::Grid(vec![vec![0.1, self.risk]]),
            timestamp: None,
        })
    }

    async fn analyze_zone(&self, _request: &ZoneAnalysisRequest) -> Result<ZoneAnalysisResponse, BackendError> {
        if self.fail {
            return Err(BackendError::RemoteCallFailed("backend down".to_string()));
        }
        Ok(ZoneAnalysisResponse {
            risk_level: self.risk,
            heatmap_data: None,
        })
    }

    async fn geocode(&self, address: &str) -> Result<Location, BackendError> {
        if self.fail {
            return Err(BackendError::RemoteCallFailed("backend down".to_string()));
        }
        if address.is_empty() {
            return Err(BackendError::LocationNotFound("Location not found".to_string()));
        }
        Ok(Location {
            lat: 40.7,
            lon: -74.0,
            address: format!("{}, Springfield", address),
        })
    }
}

fn test_state_with(fire_trucks: u32, ambulances: u32, backend: StubBackend) -> AppState {
    let config = EnvironmentConfig {
        fleet_fire_trucks: fire_trucks,
        fleet_ambulances: ambulances,
        ..EnvironmentConfig::default()
    };
    let clock = Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()));
    AppState::new(config, Arc::new(backend), clock)
}

fn create_test_app() -> Router {
    create_app_router(test_state_with(5, 5, StubBackend { risk: 0.3, fail: false }))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(field: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "XFIREBOUNDARY";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{}\"; filename=\"scene.jpg\"\r\n", field).as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/jpeg\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/analysis/image")
        .header("content-type", format!("multipart/form-data; boundary={}", boundary))
        .body(Body::from(body))
        .unwrap()
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["vehicles"], 10);
}

#[tokio::test]
async fn test_dashboard_config() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/dashboard/config")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["video_feed_url"], "http://localhost:5000/video_feed");
    assert_eq!(body["data"]["vehicle_types"][0]["value"], "fire_truck");
    assert_eq!(body["data"]["vehicle_types"][1]["label"], "Ambulance");
}

#[tokio::test]
async fn test_dispatch_scenario_propose_commit_recall() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/dispatch/proposals",
            json!({ "quantities": [{ "vehicle_type": "fire_truck", "quantity": 3 }], "destination": "123 Main St" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicle_ids"], json!(["V-001", "V-003", "V-005"]));
    assert_eq!(body["data"]["partial"], false);
    assert_eq!(body["data"]["confirmation"], "Dispatch 3 vehicle(s) to 123 Main St?");

    // proponer no modifica nada
    let (_, body) = send(&app, get("/api/dispatch/vehicles?status=dispatched")).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/dispatch/commit",
            json!({ "vehicle_ids": ["V-001", "V-003", "V-005"], "destination": "123 Main St" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["data"]), vec!["V-001", "V-003", "V-005"]);
    assert!(body["data"]
        .as_array()
        .unwrap()
        .iter()
        .all(|v| v["status"] == "dispatched" && v["dispatched_to"] == "123 Main St"));
    assert_eq!(body["notifications"][0]["title"], "Vehicles Dispatched");
    assert_eq!(body["notifications"][0]["description"], "3 vehicle(s) dispatched.");

    let (_, body) = send(&app, get("/api/dispatch/vehicles?status=available")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 7);

    let (status, body) = send(&app, json_request("POST", "/api/dispatch/vehicles/V-003/recall", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "available");
    assert!(body["data"]["dispatched_to"].is_null());
    assert_eq!(body["notifications"][0]["description"], "Vehicle V-003 is now available.");

    let (_, body) = send(&app, get("/api/dispatch/board")).await;
    assert_eq!(ids(&body["data"]), vec!["V-001", "V-005"]);
    assert_eq!(body["data"][0]["time_ago"], "Just now");
}

#[tokio::test]
async fn test_all_zero_quantities_returns_no_vehicles_available() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/dispatch/proposals",
            json!({ "quantities": [{ "vehicle_type": "fire_truck", "quantity": 0 }, { "vehicle_type": "ambulance", "quantity": 0 }] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NO_VEHICLES_AVAILABLE");
    assert_eq!(body["notification"]["title"], "No Vehicles Available");
    assert_eq!(body["notification"]["level"], "warning");
}

#[tokio::test]
async fn test_empty_commit_returns_no_vehicles_available() {
    let app = create_test_app();
    let (status, body) = send(&app, json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": [] }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "NO_VEHICLES_AVAILABLE");
}

#[tokio::test]
async fn test_stale_commit_is_rejected_without_changes() {
    let app = create_test_app();
    let first = json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-001"], "destination": "A" }));
    let (status, _) = send(&app, first).await;
    assert_eq!(status, StatusCode::OK);

    let second = json_request(
        "POST",
        "/api/dispatch/commit",
        json!({ "vehicle_ids": ["V-001", "V-002"], "destination": "B" }),
    );
    let (status, body) = send(&app, second).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STALE_PROPOSAL");
    assert_eq!(body["details"]["stale_vehicle_ids"], json!(["V-001"]));

    // V-002 no fue despachado y V-001 conserva su destino original
    let (_, body) = send(&app, get("/api/dispatch/vehicles?status=dispatched")).await;
    assert_eq!(ids(&body["data"]), vec!["V-001"]);
    assert_eq!(body["data"][0]["dispatched_to"], "A");
}

#[tokio::test]
async fn test_over_request_returns_partial_selection() {
    let app = create_app_router(test_state_with(5, 2, StubBackend { risk: 0.3, fail: false }));
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/dispatch/proposals",
            json!({ "quantities": [{ "vehicle_type": "ambulance", "quantity": 5 }] }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["vehicle_ids"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["partial"], true);
    assert_eq!(body["data"]["breakdown"][0]["requested"], 5);
    assert_eq!(body["data"]["breakdown"][0]["selected"], 2);
    assert_eq!(body["notifications"][0]["title"], "Partial Dispatch");
}

#[tokio::test]
async fn test_availability_per_type() {
    let app = create_test_app();
    send(&app, json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-002"] }))).await;

    let (status, body) = send(&app, get("/api/dispatch/availability")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["vehicle_type"], "fire_truck");
    assert_eq!(body["data"][0]["available"], 5);
    assert_eq!(body["data"][1]["vehicle_type"], "ambulance");
    assert_eq!(body["data"][1]["available"], 4);
    assert_eq!(body["data"][1]["total"], 5);
}

#[tokio::test]
async fn test_list_filters_by_type() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/dispatch/vehicles?vehicle_type=ambulance")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body["data"]), vec!["V-002", "V-004", "V-006", "V-008", "V-010"]);
}

#[tokio::test]
async fn test_recall_of_available_vehicle_is_noop() {
    let app = create_test_app();
    let (status, body) = send(&app, json_request("POST", "/api/dispatch/vehicles/V-002/recall", json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "available");
    assert_eq!(body["message"], "Vehicle V-002 is not dispatched");
    assert!(body.get("notifications").is_none());
}

#[tokio::test]
async fn test_unknown_vehicle_returns_not_found() {
    let app = create_test_app();
    let (status, body) = send(&app, json_request("POST", "/api/dispatch/vehicles/V-999/recall", json!({}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = send(
        &app,
        json_request("POST", "/api/dispatch/vehicles/V-999/arrival", json!({ "arrived": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_ids_use_error_envelope() {
    let app = create_test_app();

    for uri in ["/api/dispatch/vehicles/V-1/recall", "/api/dispatch/vehicles/truck/recall"] {
        let (status, body) = send(&app, json_request("POST", uri, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "BAD_REQUEST");
        assert_eq!(body["notification"]["title"], "Bad Request");
    }

    let (status, body) = send(
        &app,
        json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-0001"], "destination": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (_, body) = send(&app, get("/api/dispatch/vehicles?status=dispatched")).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_bodies_use_error_envelope() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/dispatch/proposals",
            json!({ "quantities": [{ "vehicle_type": "fire_truck", "quantity": -1 }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert_eq!(body["notification"]["level"], "warning");

    let garbage = Request::builder()
        .method("POST")
        .uri("/api/cases")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, body) = send(&app, garbage).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, get("/api/dispatch/vehicles?status=flying")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_record_arrival_keeps_status() {
    let app = create_test_app();
    send(&app, json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-001"] }))).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/dispatch/vehicles/V-001/arrival", json!({ "arrived": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["arrival"], "denied");
    assert_eq!(body["data"]["status"], "dispatched");

    // tampoco se valida el estado: un vehículo disponible acepta la marca
    let (status, body) = send(
        &app,
        json_request("POST", "/api/dispatch/vehicles/V-002/arrival", json!({ "arrived": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["arrival"], "confirmed");
    assert_eq!(body["data"]["status"], "available");
}

#[tokio::test]
async fn test_maintenance_excludes_vehicle_from_proposals() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/dispatch/vehicles/V-001/maintenance", json!({ "in_maintenance": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "maintenance");

    let (_, body) = send(
        &app,
        json_request(
            "POST",
            "/api/dispatch/proposals",
            json!({ "quantities": [{ "vehicle_type": "fire_truck", "quantity": 2 }] }),
        ),
    )
    .await;
    assert_eq!(body["data"]["vehicle_ids"], json!(["V-003", "V-005"]));
}

#[tokio::test]
async fn test_maintenance_of_dispatched_vehicle_is_invalid() {
    let app = create_test_app();
    send(&app, json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-001"] }))).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/dispatch/vehicles/V-001/maintenance", json!({ "in_maintenance": true })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_destination_defaults_to_unknown() {
    let app = create_test_app();
    let (_, body) = send(&app, json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-001"] }))).await;

    assert_eq!(body["data"][0]["dispatched_to"], "Unknown");
}

#[tokio::test]
async fn test_destination_defaults_to_searched_location() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/location/search?address=Elm%20Street")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["applied"], true);
    assert_eq!(body["data"]["location"]["address"], "Elm Street, Springfield");

    let (_, body) = send(&app, json_request("POST", "/api/dispatch/commit", json!({ "vehicle_ids": ["V-002"] }))).await;
    assert_eq!(body["data"][0]["dispatched_to"], "Elm Street, Springfield");
}

#[tokio::test]
async fn test_location_not_found() {
    let app = create_test_app();
    let (status, body) = send(&app, get("/api/location/search?address=")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_image_analysis_high_risk() {
    let app = create_app_router(test_state_with(5, 5, StubBackend { risk: 0.8, fail: false }));
    let (status, body) = send(&app, multipart_request("image", b"\xff\xd8\xff\xe0fake-jpeg")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["risk_percent"], "80.0%");
    assert_eq!(body["data"]["applied"], true);
    assert_eq!(body["notifications"][0]["title"], "High Risk Detected");
    assert_eq!(body["notifications"][1]["title"], "Analysis Complete");
    assert_eq!(body["notifications"][1]["level"], "error");

    let (_, body) = send(&app, get("/api/analysis/heatmap")).await;
    assert_eq!(body["data"]["source"], "image_analysis");
    assert_eq!(body["data"]["heatmap_data"], json!([[0.1, 0.8]]));
}

#[tokio::test]
async fn test_image_analysis_low_risk_has_info_notification() {
    let app = create_test_app();
    let (status, body) = send(&app, multipart_request("image", b"png-bytes")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);
    assert_eq!(body["notifications"][0]["level"], "info");
}

#[tokio::test]
async fn test_image_upload_without_image_field() {
    let app = create_test_app();
    let (status, body) = send(&app, multipart_request("file", b"png-bytes")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_remote_failure_leaves_state_untouched() {
    let app = create_app_router(test_state_with(5, 5, StubBackend { risk: 0.9, fail: true }));
    let (status, body) = send(&app, multipart_request("image", b"png-bytes")).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "REMOTE_CALL_FAILED");

    let (_, body) = send(&app, get("/api/analysis/heatmap")).await;
    assert!(body["data"].is_null());

    let (status, _) = send(
        &app,
        json_request("POST", "/api/analysis/zone", json!({ "zone_type": "industrial", "lat": 1.0, "lon": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (_, body) = send(&app, get("/api/incidents")).await;
    assert!(body["data"]["incidents"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_zone_analysis_records_incident() {
    let app = create_app_router(test_state_with(5, 5, StubBackend { risk: 0.9, fail: false }));
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/analysis/zone",
            json!({ "zone_type": "commercial", "lat": 34.05, "lon": -118.25, "location_name": "Downtown" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["risk_band"], "high");
    assert_eq!(body["data"]["location_name"], "Downtown");
    assert_eq!(body["notifications"][0]["title"], "High Risk Zone");

    let (_, body) = send(&app, get("/api/incidents")).await;
    assert_eq!(body["data"]["incidents"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["heat_points"], json!([[34.05, -118.25, 0.9]]));

    let (status, body) = send(
        &app,
        json_request("PUT", "/api/incidents/zone", json!({ "lat": 34.05, "lon": -118.25, "zone_type": "residential" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["zone_type"], "residential");

    let (status, _) = send(
        &app,
        json_request("PUT", "/api/incidents/zone", json!({ "lat": 0.0, "lon": 0.0, "zone_type": "residential" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_zone_analysis_rejects_invalid_coordinates() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        json_request("POST", "/api/analysis/zone", json!({ "zone_type": "residential", "lat": 120.0, "lon": 0.0 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_case_reports() {
    let app = create_test_app();

    let (status, body) = send(&app, json_request("POST", "/api/cases", json!({ "status": "pending", "description": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/cases",
            json!({ "status": "in_process", "description": "  Smoke near the school  " }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Smoke near the school");
    assert_eq!(body["data"]["status_summary"], "Inspection in process.");
    assert_eq!(body["notifications"][0]["title"], "Case Submitted");

    let (_, body) = send(&app, get("/api/cases")).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_live_update_ingest() {
    let state = test_state_with(5, 5, StubBackend { risk: 0.3, fail: false });
    let app = create_app_router(state.clone());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/live/updates",
            json!({ "heatmap_data": [[0.2, 0.85]], "max_risk": 0.85, "avg_risk": 0.4, "fps": 12.0, "risk_zones": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notifications"][0]["title"], "High Risk Alert!");
    assert_eq!(body["notifications"][0]["description"], "Fire risk level: 85.0%");

    assert_eq!(state.live.latest().map(|u| u.max_risk), Some(0.85));

    let (_, body) = send(&app, get("/api/analysis/heatmap")).await;
    assert_eq!(body["data"]["source"], "live");
}

#[tokio::test]
async fn test_live_update_out_of_range_is_rejected() {
    let state = test_state_with(5, 5, StubBackend { risk: 0.3, fail: false });
    let app = create_app_router(state.clone());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/live/updates", json!({ "heatmap_data": [[0.2, 0.9]], "max_risk": 42.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["details"]["max_risk"].is_array());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/live/updates", json!({ "heatmap_data": null, "max_risk": 0.4, "avg_risk": -0.2 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // nada llegó al panel ni a los suscriptores
    assert!(state.live.latest().is_none());
    let (_, body) = send(&app, get("/api/analysis/heatmap")).await;
    assert!(body["data"].is_null());
}

/// Lee una trama de texto del servidor (sin máscara)
async fn read_text_frame(stream: &mut TcpStream) -> Value {
    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await.unwrap();
    assert_eq!(header[0] & 0x0f, 0x1, "expected a text frame");
    assert_eq!(header[1] & 0x80, 0, "server frames are not masked");

    let len = match header[1] & 0x7f {
        126 => {
            let mut ext = [0u8; 2];
            stream.read_exact(&mut ext).await.unwrap();
            u16::from_be_bytes(ext) as usize
        }
        127 => {
            let mut ext = [0u8; 8];
            stream.read_exact(&mut ext).await.unwrap();
            u64::from_be_bytes(ext) as usize
        }
        len => len as usize,
    };

    let mut payload = vec![0u8; len];
    stream.read_exact(&mut payload).await.unwrap();
    serde_json::from_slice(&payload).unwrap()
}

#[tokio::test]
async fn test_live_socket_sends_latest_update_and_releases_subscription() {
    let state = test_state_with(5, 5, StubBackend { risk: 0.3, fail: false });
    state.live.publish_update(LiveUpdate {
        heatmap_data: None,
        max_risk: 0.6,
        avg_risk: Some(0.2),
        fps: None,
        risk_zones: Some(1),
        timestamp: None,
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = create_app_router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    let handshake = format!(
        "GET /ws/live HTTP/1.1\r\nHost: {}\r\nConnection: Upgrade\r\nUpgrade: websocket\r\n\
         Sec-WebSocket-Version: 13\r\nSec-WebSocket-Key: dGhlIHNhbXBsZSBub25jZQ==\r\n\r\n",
        addr
    );
    stream.write_all(handshake.as_bytes()).await.unwrap();

    // cabeceras de la respuesta, byte a byte para no consumir la primera trama
    let mut head = Vec::new();
    while !head.ends_with(b"\r\n\r\n") {
        head.push(stream.read_u8().await.unwrap());
    }
    let head = String::from_utf8(head).unwrap();
    assert!(head.starts_with("HTTP/1.1 101"), "unexpected handshake response: {}", head);
    assert!(head.contains("s3pPLMBiTxaQ9kYGzzhZRbK+xOo="));

    let first = tokio::time::timeout(Duration::from_secs(2), read_text_frame(&mut stream))
        .await
        .unwrap();
    assert_eq!(first["type"], "update");
    assert_eq!(first["update"]["max_risk"], 0.6);
    assert_eq!(first["update"]["risk_zones"], 1);
    assert_eq!(state.live.subscriber_count(), 1);

    state.live.notify(Notification::info("Heads up", "Wind is picking up"));
    let second = tokio::time::timeout(Duration::from_secs(2), read_text_frame(&mut stream))
        .await
        .unwrap();
    assert_eq!(second["type"], "notification");
    assert_eq!(second["notification"]["title"], "Heads up");

    // trama de cierre enmascarada, sin cuerpo
    stream.write_all(&[0x88, 0x80, 0x01, 0x02, 0x03, 0x04]).await.unwrap();

    let released = tokio::time::timeout(Duration::from_secs(2), async {
        while state.live.subscriber_count() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(released.is_ok(), "subscription still open after close");
}

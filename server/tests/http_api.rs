//! HTTP tests of the full router against in-memory capabilities.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use booking_auth::{AdminCredentials, DEFAULT_TTL, InMemoryTokenRegistry};
use booking_core::types::{ReservationStatus, ServiceType, VehiclePreference};
use booking_notify::{BroadcastHub, ViewerEvent};
use booking_server::uploads::MAX_IMAGE_BYTES;
use booking_server::{AdminGate, AppState, UploadDir, build_router};
use booking_testing::{InMemoryCatalog, InMemoryReservationStore, RecordingMailer, fixtures};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

const USERNAME: &str = "dispatch";
const PASSWORD: &str = "correct horse";

struct Harness {
    router: Router,
    store: InMemoryReservationStore,
    catalog: InMemoryCatalog,
    mailer: RecordingMailer,
    hub: Arc<BroadcastHub>,
    service: ServiceType,
    vehicle: VehiclePreference,
    uploads: tempfile::TempDir,
}

fn harness() -> Harness {
    booking_testing::init_tracing();
    let (catalog, service, vehicle) = fixtures::catalog();
    let store = InMemoryReservationStore::new();
    let mailer = RecordingMailer::new();
    let hub = BroadcastHub::new(16, 2);
    let gate = AdminGate {
        credentials: Some(AdminCredentials::new(USERNAME, PASSWORD)),
        tokens: Arc::new(InMemoryTokenRegistry::default()),
        ttl: DEFAULT_TTL,
        secure_cookie: false,
    };
    let uploads = tempfile::tempdir().unwrap();
    let state = AppState::new(
        Arc::new(catalog.clone()),
        Arc::new(store.clone()),
        hub.clone(),
        Arc::new(mailer.clone()),
        fixtures::ADMIN_EMAIL,
        gate,
    )
    .with_uploads(UploadDir::new(uploads.path(), None));

    Harness {
        router: build_router(state, &[]),
        store,
        catalog,
        mailer,
        hub,
        service,
        vehicle,
        uploads,
    }
}

impl Harness {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn login(&self) -> String {
        let (status, body) = self
            .send(json_request(
                "POST",
                "/api/admin/login",
                None,
                &json!({"username": USERNAME, "password": PASSWORD}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["token"].as_str().unwrap().to_string()
    }
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn wait_for_mail(mailer: &RecordingMailer) -> usize {
    for _ in 0..100 {
        if !mailer.sent().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    mailer.sent().len()
}

// ============================================================================
// Intake
// ============================================================================

#[tokio::test]
async fn valid_submission_is_accepted_and_notified() {
    let h = harness();
    let mut viewer = h.hub.subscribe().unwrap();

    let (status, body) = h
        .send(json_request(
            "POST",
            "/api/reservations",
            None,
            &fixtures::submission(&h.service, &h.vehicle),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["ok"], json!(true));
    let id = body["reservationId"].as_str().unwrap();
    let stored = h.store.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id.to_string(), id);
    assert_eq!(stored[0].status, ReservationStatus::New);

    let event = tokio::time::timeout(Duration::from_secs(1), viewer.next())
        .await
        .unwrap();
    let ViewerEvent::Event(event) = event else {
        panic!("expected an event, got {event:?}");
    };
    assert_eq!(event.event, "reservation:new");
    assert_eq!(event.data["id"], json!(id));
    assert_eq!(event.data["serviceType"], json!(h.service.name));

    assert_eq!(wait_for_mail(&h.mailer).await, 1);
    assert_eq!(h.mailer.sent()[0].to, fixtures::ADMIN_EMAIL);
}

#[tokio::test]
async fn out_of_range_time_is_rejected_with_field_errors() {
    let h = harness();
    let mut submission = fixtures::submission(&h.service, &h.vehicle);
    submission["pickupTime"] = json!("24:00");

    let (status, body) = h
        .send(json_request("POST", "/api/reservations", None, &submission))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid payload"));
    assert!(body["issues"]["fieldErrors"]["pickupTime"].is_array());
    assert!(body["details"].as_array().is_some_and(|d| !d.is_empty()));
    assert!(h.store.is_empty());
}

#[tokio::test]
async fn malformed_json_gets_the_same_error_shape() {
    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri("/api/reservations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let (status, body) = h.send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid payload"));
    assert!(body["issues"]["formErrors"].is_array());
}

#[tokio::test]
async fn unknown_vehicle_is_rejected_without_writing() {
    let h = harness();
    let mut submission = fixtures::submission(&h.service, &h.vehicle);
    submission["vehiclePreferenceId"] = json!(uuid_like());

    let (status, body) = h
        .send(json_request("POST", "/api/reservations", None, &submission))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Invalid serviceTypeId or vehiclePreferenceId"}));
    assert!(h.store.is_empty());
    assert!(h.mailer.sent().is_empty());
}

#[tokio::test]
async fn store_failure_is_a_generic_500() {
    let h = harness();
    h.store.fail_with("disk on fire");

    let (status, body) = h
        .send(json_request(
            "POST",
            "/api/reservations",
            None,
            &fixtures::submission(&h.service, &h.vehicle),
        ))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("disk on fire"));
}

fn uuid_like() -> String {
    "00000000-0000-4000-8000-000000000000".to_string()
}

// ============================================================================
// Admin gate
// ============================================================================

#[tokio::test]
async fn admin_routes_require_a_token() {
    let h = harness();
    for uri in [
        "/api/admin/reservations",
        "/api/admin/service-types",
        "/api/admin/vehicles",
        "/api/admin/ws",
    ] {
        let (status, _) = h.send(get(uri, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        let (status, _) = h.send(get(uri, Some("forged.token"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn login_check_logout_round_trip() {
    let h = harness();

    let (status, body) = h
        .send(json_request(
            "POST",
            "/api/admin/login",
            None,
            &json!({"username": USERNAME, "password": "wrong"}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");

    let (status, _) = h
        .send(json_request("POST", "/api/admin/login", None, &json!({"username": USERNAME})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let response = h
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/admin/login",
            None,
            &json!({"username": USERNAME, "password": PASSWORD}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("tb_admin="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Max-Age=604800"));
    let token = cookie
        .trim_start_matches("tb_admin=")
        .split(';')
        .next()
        .unwrap()
        .to_string();

    let with_cookie = Request::builder()
        .uri("/api/admin/check")
        .header(header::COOKIE, format!("theme=dark; tb_admin={token}"))
        .body(Body::empty())
        .unwrap();
    let (_, body) = h.send(with_cookie).await;
    assert_eq!(body, json!({"authenticated": true}));

    let (status, body) = h
        .send(json_request("POST", "/api/admin/logout", Some(&token), &json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = h.send(get("/api/admin/check", Some(&token))).await;
    assert_eq!(body, json!({"authenticated": false}));
    let (status, _) = h.send(get("/api/admin/reservations", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Admin reservations
// ============================================================================

#[tokio::test]
async fn admin_lists_and_updates_reservations() {
    let h = harness();
    let (_, created) = h
        .send(json_request(
            "POST",
            "/api/reservations",
            None,
            &fixtures::submission(&h.service, &h.vehicle),
        ))
        .await;
    let id = created["reservationId"].as_str().unwrap().to_string();
    let token = h.login().await;

    let (status, body) = h.send(get("/api/admin/reservations", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], json!(id));
    assert_eq!(rows[0]["status"], json!("NEW"));
    assert_eq!(rows[0]["serviceType"], json!(h.service.name));
    assert_eq!(rows[0]["vehiclePreference"], json!(h.vehicle.name));

    let uri = format!("/api/admin/reservations/{id}");
    let (status, body) = h
        .send(json_request("PATCH", &uri, Some(&token), &json!({"status": "CONFIRMED"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    assert_eq!(h.store.all()[0].status, ReservationStatus::Confirmed);

    let (status, body) = h
        .send(json_request("PATCH", &uri, Some(&token), &json!({"status": "DONE"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Invalid status"));
    assert_eq!(h.store.all()[0].status, ReservationStatus::Confirmed);

    let missing = format!("/api/admin/reservations/{}", uuid_like());
    let (status, _) = h
        .send(json_request("PATCH", &missing, Some(&token), &json!({"status": "NEW"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn public_catalog_is_sorted_by_name() {
    let h = harness();
    h.catalog.add_service_type("Corporate Event");

    let (status, body) = h.send(get("/api/service-types", None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Airport Transfer", "Corporate Event"]);

    let (_, body) = h.send(get("/api/vehicles", None)).await;
    let vehicle = &body["items"][0];
    assert_eq!(vehicle["name"], json!(h.vehicle.name));
    assert_eq!(vehicle["passengers"], json!(h.vehicle.passengers));
}

#[tokio::test]
async fn admin_manages_service_types() {
    let h = harness();
    let token = h.login().await;

    let (status, created) = h
        .send(json_request(
            "POST",
            "/api/admin/service-types",
            Some(&token),
            &json!({"name": "  Hourly / Charter "}),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], json!("Hourly / Charter"));

    let (status, _) = h
        .send(json_request(
            "POST",
            "/api/admin/service-types",
            Some(&token),
            &json!({"name": "Hourly / Charter"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = h
        .send(json_request("POST", "/api/admin/service-types", Some(&token), &json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Name is required"));

    let (_, listed) = h.send(get("/api/admin/service-types", Some(&token))).await;
    assert_eq!(listed[0]["name"], json!("Hourly / Charter"));

    let uri = format!("/api/admin/service-types/{}", created["id"].as_str().unwrap());
    let (status, _) = h
        .send(json_request("PATCH", &uri, Some(&token), &json!({"name": "Charter"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = h
        .send(json_request("DELETE", &uri, Some(&token), &json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (status, _) = h
        .send(json_request("PATCH", &uri, Some(&token), &json!({"name": "Gone"})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h
        .send(json_request("DELETE", &uri, Some(&token), &json!({})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_replaces_vehicle_attributes() {
    let h = harness();
    let token = h.login().await;

    let (status, created) = h
        .send(json_request(
            "POST",
            "/api/admin/vehicles",
            Some(&token),
            &json!({
                "name": "Sprinter",
                "category": "Group",
                "passengers": "12",
                "luggage": 10,
                "description": "Shuttle"
            }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["passengers"], json!(12));
    assert_eq!(created["category"], json!("Group"));

    let uri = format!("/api/admin/vehicles/{}", created["id"].as_str().unwrap());
    let (status, _) = h
        .send(json_request("PATCH", &uri, Some(&token), &json!({"name": "Sprinter Van"})))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, listed) = h.send(get("/api/admin/vehicles", Some(&token))).await;
    let updated = listed
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == created["id"])
        .unwrap();
    assert_eq!(updated["name"], json!("Sprinter Van"));
    assert_eq!(updated["category"], json!(""));
    assert_eq!(updated["passengers"], json!(0));
}

// ============================================================================
// Operational endpoints
// ============================================================================

#[tokio::test]
async fn health_and_readiness_answer() {
    let h = harness();
    let response = h.router.clone().oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-correlation-id"));

    let (status, body) = h.send(get("/ready", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("ready"));

    let (status, _) = h.send(get("/metrics", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

const BOUNDARY: &str = "booking-test-boundary";

fn upload_request(token: Option<&str>, parts: &[(&str, &str, &str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, filename, content_type, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/admin/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

#[tokio::test]
async fn uploaded_images_are_stored_and_served() {
    let h = harness();
    let token = h.login().await;

    let (status, body) = h
        .send(upload_request(
            Some(&token),
            &[("file", "my limo (1).png", "image/png", b"\x89PNG fake".as_slice())],
        ))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let url = body["url"].as_str().unwrap();
    assert!(url.starts_with("/uploads/vehicles/"), "{url}");
    assert!(url.ends_with("-my_limo__1_.png"), "{url}");

    let filename = url.rsplit('/').next().unwrap();
    let stored = std::fs::read(h.uploads.path().join("vehicles").join(filename)).unwrap();
    assert_eq!(stored, b"\x89PNG fake");

    let response = h.router.clone().oneshot(get(url, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&served[..], b"\x89PNG fake");
}

#[tokio::test]
async fn uploads_reject_missing_foreign_and_oversized_files() {
    let h = harness();
    let token = h.login().await;

    let (status, body) = h
        .send(upload_request(Some(&token), &[("other", "a.png", "image/png", b"x".as_slice())]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("No file provided"));

    let (status, body) = h
        .send(upload_request(Some(&token), &[("file", "notes.txt", "text/plain", b"hi".as_slice())]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("File must be an image"));

    let oversized = vec![0u8; MAX_IMAGE_BYTES + 1];
    let (status, body) = h
        .send(upload_request(Some(&token), &[("file", "huge.jpg", "image/jpeg", oversized.as_slice())]))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("File size must be less than 5MB"));

    assert!(!h.uploads.path().join("vehicles").exists());
}

#[tokio::test]
async fn uploads_require_an_admin_session() {
    let h = harness();
    let (status, _) = h
        .send(upload_request(None, &[("file", "a.png", "image/png", b"x".as_slice())]))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

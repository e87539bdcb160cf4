//! Integration tests for the MUN tracker API
//!
//! Each test runs the full router over a fresh in-memory database.

use axum::http::StatusCode;
use axum_test::TestServer;
use mun_api::{AppState, create_router};
use mun_core::db;
use serde_json::{Value, json};

fn create_test_server() -> TestServer {
    let pool = db::open_in_memory().unwrap();
    TestServer::new(create_router(AppState::new(pool))).unwrap()
}

async fn create_committee(server: &TestServer, name: &str, password: &str) -> String {
    let response = server
        .post("/committees")
        .json(&json!({"name": name, "password": password}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    body["id"].as_str().unwrap().to_string()
}

async fn set_portfolios(server: &TestServer, id: &str, portfolios: Value) {
    server
        .post(&format!("/committees/{id}/portfolios"))
        .json(&json!({"portfolios": portfolios}))
        .await
        .assert_status_ok();
}

async fn record(server: &TestServer, id: &str, kind: &str, details: Value) -> Value {
    let response = server
        .post(&format!("/committees/{id}/events"))
        .json(&json!({"type": kind, "details": details}))
        .await;
    response.assert_status_ok();
    response.json()
}

fn error_message(body: &Value) -> &str {
    body["error"].as_str().unwrap()
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
}

// ============ Committee Endpoint Tests ============

#[tokio::test]
async fn test_create_and_fetch_committee() {
    let server = create_test_server();

    let response = server
        .post("/committees")
        .json(&json!({"name": "  Security Council  ", "password": "secret"}))
        .await;
    response.assert_status_ok();
    let created: Value = response.json();
    assert_eq!(created["name"], "Security Council");
    assert_eq!(created["portfolioCount"], 0);
    assert_eq!(created["hasPassword"], true);
    assert!(created.get("password").is_none());

    let id = created["id"].as_str().unwrap();
    let response = server.get(&format!("/committees/{id}")).await;
    response.assert_status_ok();
    let fetched: Value = response.json();
    assert_eq!(fetched["name"], "Security Council");
    assert_eq!(fetched["portfolios"], json!([]));
    assert_eq!(fetched["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn test_create_committee_validation() {
    let server = create_test_server();

    let response = server
        .post("/committees")
        .json(&json!({"name": "   ", "password": "secret"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&response.json()), "Committee name is required");

    let response = server
        .post("/committees")
        .json(&json!({"name": "GA", "password": "abc"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        error_message(&response.json()),
        "Password must be at least 4 characters long"
    );

    let response = server
        .post("/committees")
        .text("{not json")
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_committees_newest_first() {
    let server = create_test_server();
    let first = create_committee(&server, "DISEC", "pass1").await;
    let second = create_committee(&server, "ECOSOC", "pass2").await;
    set_portfolios(&server, &first, json!(["USA", "France"])).await;

    let response = server.get("/committees").await;
    response.assert_status_ok();
    let body: Value = response.json();
    let list = body.as_array().unwrap();

    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second.as_str());
    assert_eq!(list[1]["id"], first.as_str());
    assert_eq!(list[1]["portfolioCount"], 2);
    assert!(list[0].get("portfolios").is_none());
}

#[tokio::test]
async fn test_get_committee_not_found() {
    let server = create_test_server();

    let response = server.get("/committees/does-not-exist").await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(error_message(&response.json()), "Committee not found");
}

#[tokio::test]
async fn test_verify_access() {
    let server = create_test_server();
    let id = create_committee(&server, "HRC", "letmein").await;
    let path = format!("/committees/{id}/verify");

    server
        .post(&path)
        .json(&json!({"password": "letmein"}))
        .await
        .assert_status_ok();

    let response = server.post(&path).json(&json!({"password": "wrong"})).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(error_message(&response.json()), "Invalid password");

    let response = server.post(&path).json(&json!({})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&response.json()), "Password is required");

    server
        .post("/committees/unknown/verify")
        .json(&json!({"password": "letmein"}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_delete_requires_matching_password() {
    let server = create_test_server();
    let id = create_committee(&server, "WHO", "health").await;
    set_portfolios(&server, &id, json!(["Brazil"])).await;
    record(&server, &id, "speech", json!({"portfolio": "Brazil"})).await;
    let path = format!("/committees/{id}");

    let response = server.delete(&path).json(&json!({"password": "Health"})).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        error_message(&response.json()),
        "Invalid password or committee not found"
    );
    server.get(&path).await.assert_status_ok();

    server
        .delete(&path)
        .json(&json!({"password": ""}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let response = server.delete(&path).json(&json!({"password": "health"})).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);

    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
    let events: Value = server.get(&format!("{path}/events")).await.json();
    assert_eq!(events, json!([]));
}

// ============ Portfolio Endpoint Tests ============

#[tokio::test]
async fn test_replace_portfolios_sorts_and_replaces() {
    let server = create_test_server();
    let id = create_committee(&server, "UNEP", "green").await;

    set_portfolios(&server, &id, json!(["Kenya", "argentina", "Japan"])).await;
    set_portfolios(&server, &id, json!(["zambia", "Chile", "Fiji"])).await;

    let body: Value = server.get(&format!("/committees/{id}")).await.json();
    assert_eq!(body["portfolios"], json!(["Chile", "Fiji", "zambia"]));
    assert_eq!(body["portfolioCount"], 3);
}

#[tokio::test]
async fn test_replace_portfolios_validation() {
    let server = create_test_server();
    let id = create_committee(&server, "UNHCR", "refuge").await;
    let path = format!("/committees/{id}/portfolios");

    for (body, expected) in [
        (json!({}), "Valid portfolios array is required"),
        (json!({"portfolios": []}), "Valid portfolios array is required"),
        (json!({"portfolios": ["USA", ""]}), "All portfolios must be non-empty strings"),
        (json!({"portfolios": ["USA", 1]}), "All portfolios must be non-empty strings"),
        (json!({"portfolios": ["USA", "USA"]}), "Duplicate portfolios found"),
    ] {
        let response = server.post(&path).json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(error_message(&response.json()), expected);
    }

    server
        .post("/committees/missing/portfolios")
        .json(&json!({"portfolios": ["USA"]}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// ============ Event Endpoint Tests ============

#[tokio::test]
async fn test_add_event_normalizes_details() {
    let server = create_test_server();
    let id = create_committee(&server, "SPECPOL", "space").await;

    let speech = record(
        &server,
        &id,
        "speech",
        json!({"portfolio": "India", "duration": "90 seconds", "description": "Opening"}),
    )
    .await;
    assert_eq!(speech["type"], "speech");
    assert_eq!(speech["committeeId"], id.as_str());
    assert_eq!(speech["portfolio"], "India");
    assert_eq!(speech["duration"], "90 seconds");
    assert!(speech.get("targetPortfolio").is_none());

    let point = record(
        &server,
        &id,
        "point_of_information",
        json!({"raiser": "Egypt", "targetPortfolio": "India"}),
    )
    .await;
    assert_eq!(point["portfolio"], "Egypt");
    assert_eq!(point["targetPortfolio"], "India");

    let motion = record(
        &server,
        &id,
        "motion",
        json!({"raiser": "Egypt", "type": "moderated_caucus"}),
    )
    .await;
    assert_eq!(motion["motionType"], "moderated_caucus");
    assert_eq!(motion["motionStatus"], "pending");
}

#[tokio::test]
async fn test_add_event_rejects_bad_requests() {
    let server = create_test_server();
    let id = create_committee(&server, "Legal", "bench").await;
    let path = format!("/committees/{id}/events");

    let response = server
        .post(&path)
        .json(&json!({"type": "filibuster", "details": {"portfolio": "USA"}}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&response.json()), "Invalid event type");

    let response = server.post(&path).json(&json!({"type": "speech"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&response.json()), "Type and details are required");

    server
        .post("/committees/missing/events")
        .json(&json!({"type": "speech", "details": {"portfolio": "USA"}}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_events_newest_first() {
    let server = create_test_server();
    let id = create_committee(&server, "IAEA", "atoms").await;

    let first = record(&server, &id, "speech", json!({"portfolio": "Iran"})).await;
    let second = record(&server, &id, "point_of_order", json!({"portfolio": "Israel"})).await;
    let third = record(&server, &id, "speech", json!({"portfolio": "Iran"})).await;

    let body: Value = server.get(&format!("/committees/{id}/events")).await.json();
    let ids: Vec<&Value> = body.as_array().unwrap().iter().map(|e| &e["id"]).collect();
    assert_eq!(ids, vec![&third["id"], &second["id"], &first["id"]]);

    let body: Value = server.get("/committees/unknown/events").await.json();
    assert_eq!(body, json!([]));
}

// ============ Stats Endpoint Tests ============

#[tokio::test]
async fn test_committee_stats_scenario() {
    let server = create_test_server();
    let id = create_committee(&server, "GA1", "first").await;
    set_portfolios(&server, &id, json!(["USA", "France"])).await;
    record(&server, &id, "speech", json!({"portfolio": "USA"})).await;
    record(&server, &id, "point_of_order", json!({"portfolio": "France"})).await;
    record(&server, &id, "motion", json!({"raiser": "USA", "motionType": "adjourn", "status": "passed"})).await;

    let response = server
        .get(&format!("/committees/{id}/stats"))
        .add_query_param("sort", "portfolio")
        .add_query_param("direction", "asc")
        .await;
    response.assert_status_ok();
    let body: Value = response.json();

    assert_eq!(
        body["delegates"],
        json!([
            {"portfolio": "France", "speeches": 0, "pointsOfOrder": 1, "pointsOfInformation": 0, "totalParticipation": 1},
            {"portfolio": "USA", "speeches": 1, "pointsOfOrder": 0, "pointsOfInformation": 0, "totalParticipation": 1}
        ])
    );
    assert_eq!(
        body["totals"],
        json!({"speeches": 1, "pointsOfOrder": 1, "pointsOfInformation": 0, "totalParticipation": 2})
    );
    assert_eq!(body["activeDelegates"], 2);
}

#[tokio::test]
async fn test_committee_stats_errors() {
    let server = create_test_server();
    let id = create_committee(&server, "GA2", "second").await;

    server
        .get(&format!("/committees/{id}/stats"))
        .add_query_param("sort", "votes")
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    server
        .get("/committees/unknown/stats")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

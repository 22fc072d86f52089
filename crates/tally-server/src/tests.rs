//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use rust_decimal_macros::dec;
use std::sync::Arc;
use tower::ServiceExt;

use tally_core::{Database, FixedClock, NewAssetRecord, NewExpense, RecordType};

fn fixed_today() -> NaiveDate {
    // Oct 31: 2 whole months and 61 days to Dec 31
    NaiveDate::from_ymd_opt(2026, 10, 31).unwrap()
}

fn setup_test_app() -> (Router, Database) {
    let db = Database::in_memory().unwrap();
    let router = create_router_with_clock(
        db.clone(),
        ServerConfig::default(),
        Arc::new(FixedClock(fixed_today())),
    );
    (router, db)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn salary_body(user_id: i64, amount: f64) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "record_type": "salary",
        "amount": amount,
        "record_date": "2026-02-01",
        "owner": "alice"
    })
}

fn seed_salary_and_gold(db: &Database) {
    db.create_asset_record(&NewAssetRecord {
        user_id: 1,
        record_type: RecordType::Salary,
        amount: Some(dec!(10000)),
        description: None,
        record_date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        gold_weight: None,
        annual_interest_rate: None,
        owner: "alice".to_string(),
    })
    .unwrap();
    db.create_asset_record(&NewAssetRecord {
        user_id: 1,
        record_type: RecordType::Gold,
        amount: Some(dec!(5000)),
        description: None,
        record_date: NaiveDate::from_ymd_opt(2026, 1, 20).unwrap(),
        gold_weight: Some(dec!(10)),
        annual_interest_rate: None,
        owner: "alice".to_string(),
    })
    .unwrap();
}

#[tokio::test]
async fn test_health() {
    let (app, _db) = setup_test_app();

    let response = app.oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["asset_records"], 0);
}

#[tokio::test]
async fn test_create_and_get_asset_record() {
    let (app, _db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/asset-records", salary_body(1, 9876.5)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    let id = json["id"].as_i64().unwrap();
    assert!(id > 0);
    assert_eq!(json["record_type"], "salary");
    assert_eq!(json["owner"], "alice");

    let response = app
        .oneshot(get(&format!("/api/asset-records/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!((json["amount"].as_f64().unwrap() - 9876.5).abs() < 1e-9);
}

#[tokio::test]
async fn test_create_invalid_record_is_bad_request() {
    let (app, db) = setup_test_app();

    // Gold without a weight fails validation
    let body = serde_json::json!({
        "user_id": 1,
        "record_type": "gold",
        "amount": 5000,
        "record_date": "2026-02-01",
        "owner": "alice"
    });
    let response = app
        .oneshot(json_request("POST", "/api/asset-records", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = get_body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Invalid"));
    assert_eq!(db.count_asset_records().unwrap(), 0);
}

#[tokio::test]
async fn test_missing_record_is_not_found() {
    let (app, _db) = setup_test_app();

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/42"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/asset-records/42", salary_body(1, 1.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/asset-records/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_and_delete_asset_record() {
    let (app, db) = setup_test_app();
    seed_salary_and_gold(&db);

    let response = app
        .clone()
        .oneshot(json_request("PUT", "/api/asset-records/1", salary_body(1, 12000.0)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert!((json["amount"].as_f64().unwrap() - 12000.0).abs() < 1e-9);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/asset-records/1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(db.get_asset_record(1).unwrap().is_none());
}

#[tokio::test]
async fn test_listing_endpoints() {
    let (app, db) = setup_test_app();
    seed_salary_and_gold(&db);

    let response = app.clone().oneshot(get("/api/asset-records")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/user/1/type/gold"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["record_type"], "gold");

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/owner/alice"))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get(
            "/api/asset-records/user/1/range?start=2026-01-16&end=2026-01-31",
        ))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 1);

    // Half a range is a client error
    let response = app
        .oneshot(get("/api/asset-records/user/1/total?start=2026-01-01"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_aggregate_endpoints() {
    let (app, db) = setup_test_app();
    seed_salary_and_gold(&db);

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/user/1/total"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!((json.as_f64().unwrap() - 15000.0).abs() < 1e-9);

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/total?record_type=gold"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!((json.as_f64().unwrap() - 5000.0).abs() < 1e-9);

    let response = app
        .oneshot(get("/api/asset-records/monthly-income"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!((json.as_f64().unwrap() - 10000.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_forecast_endpoint_with_fixed_clock() {
    let (app, db) = setup_test_app();
    seed_salary_and_gold(&db);

    for uri in ["/api/asset-records/user/1/forecast", "/api/asset-records/forecast"] {
        let response = app.clone().oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = get_body_json(response).await;
        assert!((json["current_total_assets"].as_f64().unwrap() - 15000.0).abs() < 1e-9);
        assert!((json["monthly_income"].as_f64().unwrap() - 10000.0).abs() < 1e-9);
        assert_eq!(json["daily_expense"].as_f64().unwrap(), 0.0);
        assert!((json["expected_income"].as_f64().unwrap() - 20000.0).abs() < 1e-9);
        assert_eq!(json["expected_expense"].as_f64().unwrap(), 0.0);
        assert_eq!(json["interest_income"].as_f64().unwrap(), 0.0);
        assert!((json["predicted_year_end_assets"].as_f64().unwrap() - 35000.0).abs() < 1e-9);
    }
}

#[tokio::test]
async fn test_recent_endpoint_limit_quirk() {
    let (app, db) = setup_test_app();

    for i in 0..12i64 {
        db.create_asset_record(&NewAssetRecord {
            user_id: 1,
            record_type: RecordType::Other("misc".to_string()),
            amount: Some(dec!(1)),
            description: None,
            record_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()
                + chrono::Duration::days(i),
            gold_weight: None,
            annual_interest_rate: None,
            owner: "alice".to_string(),
        })
        .unwrap();
    }

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/user/1/recent?limit=5"))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 10);

    let response = app
        .clone()
        .oneshot(get("/api/asset-records/user/1/recent?limit=11"))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 12);

    let response = app
        .oneshot(get("/api/asset-records/user/1/recent?limit=0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_expense_filter_params() {
    let (app, db) = setup_test_app();

    db.create_expense(&NewExpense {
        amount: dec!(30),
        category_name: Some("groceries".to_string()),
        description: None,
        expense_date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
        payer: "alice".to_string(),
        is_public: true,
        user_id: Some(1),
    })
    .unwrap();
    db.create_expense(&NewExpense {
        amount: dec!(70),
        category_name: Some("dining".to_string()),
        description: None,
        expense_date: NaiveDate::from_ymd_opt(2026, 10, 21).unwrap(),
        payer: "bob".to_string(),
        is_public: false,
        user_id: Some(2),
    })
    .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/expenses?payer=bob"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["category_name"], "dining");

    let response = app
        .clone()
        .oneshot(get("/api/expenses?is_public=true"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["payer"], "alice");

    let response = app
        .clone()
        .oneshot(get("/api/expenses?category=groceries&payer=bob"))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 0);

    let response = app
        .oneshot(get(
            "/api/expenses/statistics?start=2026-10-01&end=2026-10-31&category=dining",
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!((json["total_amount"].as_f64().unwrap() - 70.0).abs() < 1e-9);
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["by_category"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_expense_crud_and_statistics() {
    let (app, db) = setup_test_app();

    let body = serde_json::json!({
        "amount": 42.5,
        "category_name": "groceries",
        "expense_date": "2026-10-20",
        "payer": "alice",
        "user_id": 1
    });
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/expenses", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let id = json["id"].as_i64().unwrap();
    assert_eq!(json["payer"], "alice");

    db.create_expense(&NewExpense {
        amount: dec!(7.5),
        category_name: Some("dining".to_string()),
        description: None,
        expense_date: NaiveDate::from_ymd_opt(2026, 10, 21).unwrap(),
        payer: "bob".to_string(),
        is_public: true,
        user_id: None,
    })
    .unwrap();

    let response = app
        .clone()
        .oneshot(get("/api/expenses?start=2026-10-01&end=2026-10-31"))
        .await
        .unwrap();
    assert_eq!(get_body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get("/api/expenses/statistics?start=2026-10-01&end=2026-10-31"))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!((json["total_amount"].as_f64().unwrap() - 50.0).abs() < 1e-9);
    assert_eq!(json["total_count"], 2);
    assert_eq!(json["by_category"][0]["category"], "groceries");
    assert_eq!(json["by_day"].as_array().unwrap().len(), 2);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.get_expense(id).unwrap().is_none());
}

mod common;

use axum::http::StatusCode;
use time::{Duration, OffsetDateTime};

use common::{Factory, TestApp};
use notedrop::models::Stage;

#[tokio::test]
async fn test_statistics_empty_account() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    let response = app
        .server
        .get("/api/statistics")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["timeRange"], "all");
    assert_eq!(body["summary"]["totalCollections"], 0);
    assert_eq!(body["summary"]["totalGrowth"], 0.0);
    assert_eq!(body["monthlyData"].as_array().unwrap().len(), 12);
    assert!(body["chainDistribution"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_statistics_time_range() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;
    let now = OffsetDateTime::now_utc();

    factory
        .create_collection(auth.user_id, "Fresh", Stage::Active, "Base")
        .await;
    factory
        .create_collection(auth.user_id, "Also Fresh", Stage::Ended, "Ethereum")
        .await;
    factory
        .create_collection_at(auth.user_id, Stage::Upcoming, now - Duration::days(400))
        .await;

    let all: serde_json::Value = app
        .server
        .get("/api/statistics?range=all")
        .add_header("Authorization", auth.auth_header())
        .await
        .json();
    assert_eq!(all["summary"]["totalCollections"], 3);
    assert_eq!(all["summary"]["uniqueChains"], 2);

    let week: serde_json::Value = app
        .server
        .get("/api/statistics?range=7d")
        .add_header("Authorization", auth.auth_header())
        .await
        .json();
    assert_eq!(week["timeRange"], "7d");
    assert_eq!(week["summary"]["totalCollections"], 2);
    assert_eq!(week["summary"]["activeCollections"], 1);
    assert_eq!(week["summary"]["upcomingCollections"], 0);

    let stage_total: u64 = week["stageDistribution"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["value"].as_u64().unwrap())
        .sum();
    assert_eq!(stage_total, 2);
}

#[tokio::test]
async fn test_statistics_rejects_unknown_range() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    let response = app
        .server
        .get("/api/statistics?range=2w")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_charts_empty_state() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    let response = app
        .server
        .get("/api/statistics/charts")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["series"], "total");
    assert_eq!(body["line"]["status"], "empty");
    assert_eq!(body["bars"]["status"], "empty");
    assert_eq!(body["chains"]["status"], "empty");
    assert_eq!(body["stages"]["status"], "empty");
    assert_eq!(body["labels"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_charts_geometry() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    factory
        .create_collection(auth.user_id, "One", Stage::Active, "Base")
        .await;
    factory
        .create_collection(auth.user_id, "Two", Stage::Upcoming, "Base")
        .await;

    let response = app
        .server
        .get("/api/statistics/charts?series=active")
        .add_header("Authorization", auth.auth_header())
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();

    assert_eq!(body["series"], "active");
    assert_eq!(body["line"]["status"], "ready");
    let line = &body["line"]["geometry"];
    assert_eq!(line["points"].as_array().unwrap().len(), 12);
    assert!(line["path"].as_str().unwrap().starts_with("M 0,"));
    assert!(line["area_path"].as_str().unwrap().ends_with("L 100,100 L 0,100 Z"));

    // Both records sit on one chain: a single full-circle wedge
    let chains = &body["chains"]["geometry"];
    assert_eq!(chains["wedges"].as_array().unwrap().len(), 1);
    assert_eq!(chains["wedges"][0]["sweep_angle"], 360.0);

    let stages = &body["stages"]["geometry"];
    let sweep: f64 = stages["wedges"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["sweep_angle"].as_f64().unwrap())
        .sum();
    assert!((sweep - 360.0).abs() < 1e-9);
    assert_eq!(stages["wedges"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_export_csv() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    factory
        .create_collection(auth.user_id, "One", Stage::Active, "Base")
        .await;
    factory
        .create_collection(auth.user_id, "Two", Stage::Ended, "Base")
        .await;

    let response = app
        .server
        .get("/api/statistics/export?format=csv&growth=true")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type"),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"notedrop-detailed-report.csv\""
    );

    let text = response.text();
    let lines: Vec<&str> = text.split('\n').collect();
    assert_eq!(lines.len(), 14);
    assert_eq!(
        lines[0],
        "Month,Total Collections,Active,Upcoming,Ended,Growth"
    );
    assert_eq!(lines[13], "Total,2,1,0,1,");
    assert!(!text.ends_with('\n'));
}

#[tokio::test]
async fn test_export_json() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    factory
        .create_collection(auth.user_id, "One", Stage::Upcoming, "Solana")
        .await;

    let response = app
        .server
        .get("/api/statistics/export?format=json&range=30d")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/json");

    let body: serde_json::Value = serde_json::from_str(&response.text()).unwrap();
    assert_eq!(body["timeRange"], "30d");
    assert_eq!(body["summary"]["totalCollections"], 1);
    assert_eq!(body["chainDistribution"][0]["name"], "Solana");
    assert_eq!(body["chainDistribution"][0]["percentage"], 100.0);
}

#[tokio::test]
async fn test_export_rejects_unknown_format() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    let response = app
        .server
        .get("/api/statistics/export?format=xlsx")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_charts_stack_active_share_on_total_only() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app);
    let auth = factory.create_user().await;

    factory
        .create_collection(auth.user_id, "One", Stage::Active, "Base")
        .await;
    factory
        .create_collection(auth.user_id, "Two", Stage::Active, "Base")
        .await;
    factory
        .create_collection(auth.user_id, "Three", Stage::Ended, "Base")
        .await;
    let month = OffsetDateTime::now_utc().month() as usize - 1;

    let ended: serde_json::Value = app
        .server
        .get("/api/statistics/charts?series=ended")
        .add_header("Authorization", auth.auth_header())
        .await
        .json();
    let bar = &ended["bars"]["geometry"][month];
    assert_eq!(bar["value"], 1);
    assert!(bar.get("stacked").is_none());

    let total: serde_json::Value = app
        .server
        .get("/api/statistics/charts?series=total")
        .add_header("Authorization", auth.auth_header())
        .await
        .json();
    let bar = &total["bars"]["geometry"][month];
    assert_eq!(bar["value"], 3);
    assert_eq!(bar["stacked"]["value"], 2);
    let height = bar["stacked"]["height"].as_f64().unwrap();
    assert!((height - 200.0 / 3.0).abs() < 1e-9);
}

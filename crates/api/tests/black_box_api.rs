use std::sync::Arc;

use carestock_api::config::AppConfig;
use carestock_infra::{InMemoryRowSource, RowSource};
use carestock_inventory::{InventoryRow, StockStatus};
use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serve the given rows as the active session.
    async fn spawn(rows: Vec<InventoryRow>) -> Self {
        let source: Arc<dyn RowSource> = Arc::new(InMemoryRowSource::new(rows));
        let app = carestock_api::app::build_app_with_source(&AppConfig::default(), Some(source))
            .expect("failed to build app");
        Self::serve(app).await
    }

    /// No sources configured: the demo dataset is served.
    async fn spawn_demo() -> Self {
        let app =
            carestock_api::app::build_app(&AppConfig::default()).expect("failed to build app");
        Self::serve(app).await
    }

    async fn serve(app: axum::Router) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn row(
    location: &str,
    item: &str,
    stock: f64,
    demand: f64,
    lead: u32,
    days: f64,
    status: StockStatus,
) -> InventoryRow {
    InventoryRow {
        location: location.to_string(),
        item: item.to_string(),
        closing_stock: stock,
        avg_daily_demand: demand,
        lead_time_days: lead,
        days_to_stockout: days,
        stock_status: status,
    }
}

fn ward_rows() -> Vec<InventoryRow> {
    vec![
        row("ICU", "Oxygen", 10.0, 3.0, 4, 3.3, StockStatus::Critical),
        row("Ward A", "Gauze", 80.0, 8.0, 2, 10.0, StockStatus::Warning),
        row("Ward B", "Saline", 1000.0, 2.0, 2, 500.0, StockStatus::Healthy),
    ]
}

async fn get_json(client: &reqwest::Client, url: String) -> Value {
    let res = client.get(url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

#[tokio::test]
async fn health_reports_live_session_data() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let body = get_json(&client, srv.url("/health")).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data"]["kind"], "live");
    assert_eq!(body["data"]["source"], "active-session");
}

#[tokio::test]
async fn demo_data_is_labeled_as_fallback() {
    let srv = TestServer::spawn_demo().await;
    let client = reqwest::Client::new();

    let body = get_json(&client, srv.url("/health")).await;
    assert_eq!(body["data"]["kind"], "fallback");

    let rows = get_json(&client, srv.url("/rows")).await;
    assert_eq!(rows["data"]["kind"], "fallback");
    assert!(!rows["rows"].as_array().unwrap().is_empty());

    // Demo sessions include the sample items with expiry dates.
    let alerts = get_json(&client, srv.url("/alerts?kind=expiry")).await;
    let items: Vec<&str> = alerts["alerts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["item"].as_str().unwrap())
        .collect();
    assert!(items.contains(&"Oxygen"));
}

#[tokio::test]
async fn rows_carry_derived_fields_and_filter() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let body = get_json(&client, srv.url("/rows")).await;
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    let oxygen = &rows[0];
    assert_eq!(oxygen["item"], "Oxygen");
    assert_eq!(oxygen["item_priority"], "Life-saving");
    assert_eq!(oxygen["status_badge"], "🔴 Critical");
    assert_eq!(oxygen["safety_stock"], 3.0);
    assert_eq!(oxygen["reorder_point"], 15.0);
    assert_eq!(oxygen["recommendation"], "Order now");
    assert_eq!(oxygen["reorder_badge"], "🔴 Order now");
    assert_eq!(oxygen["priority_badge"], "🔴 Life-saving");
    assert_eq!(oxygen["location_name"], "ICU");

    let url = srv.url("/rows?locations=Ward%20A,Ward%20B&items=Saline");
    let filtered = get_json(&client, url).await;
    let filtered = filtered["rows"].as_array().unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0]["item"], "Saline");
    assert_eq!(filtered[0]["overstock_risk"], true);
}

#[tokio::test]
async fn summary_and_analytics_views() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let summary = get_json(&client, srv.url("/summary")).await;
    assert_eq!(
        summary["health"],
        json!({ "critical": 1, "warning": 1, "healthy": 1, "overstock": 1 })
    );
    assert_eq!(summary["at_risk"].as_array().unwrap().len(), 2);
    assert_eq!(summary["life_saving_at_risk"].as_array().unwrap().len(), 1);
    assert_eq!(summary["life_saving_at_risk"][0]["item"], "Oxygen");

    let analytics = get_json(&client, srv.url("/analytics")).await;
    assert_eq!(analytics["status_distribution"]["Healthy"], 1);
    assert_eq!(analytics["location_risk"][0]["location"], "ICU");
    assert_eq!(analytics["impact"]["patients_protected"], 30);
    assert_eq!(analytics["impact"]["emergency_cost_avoided"], 2500);
    assert_eq!(analytics["days_of_cover"]["locations"], json!(["ICU", "Ward A", "Ward B"]));
}

#[tokio::test]
async fn priority_export_is_a_csv_download() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/export/priority.csv")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/csv");
    let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("carestock_priority_actions.csv"));

    let body = res.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "LOCATION,ITEM,ITEM_PRIORITY,STATUS_BADGE,CLOSING_STOCK,DAYS_TO_STOCKOUT"
    );
}

#[tokio::test]
async fn recording_an_action_updates_the_row_and_the_log() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let res = client
        .post(srv.url("/actions"))
        .json(&json!({
            "location": "ICU",
            "item": "Oxygen",
            "action_type": "Delivered to location",
            "quantity_delta": 5.0,
            "notes": "cylinders from central store",
            "actor": "Supply Team",
        }))
        .send()
        .await
        .unwrap();
    if res.status() != StatusCode::CREATED {
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        panic!("expected 201 Created from /actions, got {status} body={body}");
    }
    let receipt: Value = res.json().await.unwrap();
    assert_eq!(receipt["row"]["closing_stock"], 15.0);
    assert_eq!(receipt["row"]["days_to_stockout"], 5.0);
    assert_eq!(receipt["row"]["stock_status"], "Critical");
    assert_eq!(receipt["entry"]["actor"], "Supply Team");

    let log = get_json(&client, srv.url("/actions")).await;
    let actions = log["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 1);
    assert_eq!(actions[0]["quantity_delta"], 5.0);

    let rows = get_json(&client, srv.url("/rows?items=Oxygen")).await;
    assert_eq!(rows["rows"][0]["closing_stock"], 15.0);
}

#[tokio::test]
async fn rejected_actions_change_nothing() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let attempt = |body: Value| {
        let client = client.clone();
        let url = srv.url("/actions");
        async move { client.post(url).json(&body).send().await.unwrap() }
    };

    let res = attempt(json!({
        "location": "ICU", "item": "Oxygen", "action_type": "Other",
        "quantity_delta": 1.0, "actor": "  "
    }))
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");

    let res = attempt(json!({
        "location": "ICU", "item": "Ventilator", "action_type": "Other", "actor": "Supply Team"
    }))
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = attempt(json!({
        "location": "ICU", "item": "Oxygen", "action_type": "Other",
        "quantity_delta": -20.0, "actor": "Supply Team"
    }))
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = attempt(json!({ "location": "ICU" })).await;
    assert!(res.status().is_client_error());
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_body");

    let log = get_json(&client, srv.url("/actions")).await;
    assert!(log["actions"].as_array().unwrap().is_empty());
    let rows = get_json(&client, srv.url("/rows?items=Oxygen")).await;
    assert_eq!(rows["rows"][0]["closing_stock"], 10.0);
}

#[tokio::test]
async fn alert_rules_drive_low_stock_alerts() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let alerts = get_json(&client, srv.url("/alerts")).await;
    assert!(alerts["alerts"].as_array().unwrap().is_empty());

    // Oxygen sits at 66.7% of its reorder point (10 / 15).
    let res = client
        .put(srv.url("/alerts/rules"))
        .json(&json!({
            "overrides": [
                { "item": "Oxygen", "low_pct": 70.0, "over_pct": 50.0, "perishable_days": 30 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let alerts = get_json(&client, srv.url("/alerts?kind=low_stock")).await;
    assert_eq!(alerts["summary"], json!({ "critical": 0, "warning": 1, "info": 0 }));
    assert_eq!(alerts["alerts"][0]["item"], "Oxygen");
    assert_eq!(alerts["alerts"][0]["kind"], "Low stock");
    assert_eq!(alerts["alerts"][0]["message"], "Oxygen at 66.7% of reorder level");

    let res = client.get(srv.url("/alerts?severity=urgent")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_rule_table_keeps_previous_rules() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/alerts/rules"))
        .json(&json!({
            "default_rule": { "low_pct": 25.0, "over_pct": 50.0, "perishable_days": 30 },
            "overrides": [
                { "item": "Insulin", "low_pct": 150.0, "over_pct": 50.0, "perishable_days": 30 }
            ]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let rules = get_json(&client, srv.url("/alerts/rules")).await;
    assert_eq!(rules["default_rule"]["low_pct"], 20.0);
    assert!(rules["overrides"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn notification_settings_round_trip_and_validation() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let defaults = get_json(&client, srv.url("/settings/notifications")).await;
    assert_eq!(defaults["email_alert"], false);
    assert_eq!(defaults["alert_levels"], json!(["Critical", "Warning"]));
    assert_eq!(defaults["recipients"], json!(["Hospital procurement team"]));

    let mut bad = defaults.clone();
    bad["sms_alert"] = json!(true);
    let res = client
        .put(srv.url("/settings/notifications"))
        .json(&bad)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let mut good = defaults.clone();
    good["email_alert"] = json!(true);
    good["email"] = json!("procurement@district-hospital.org");
    let res = client
        .put(srv.url("/settings/notifications"))
        .json(&good)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let current = get_json(&client, srv.url("/settings/notifications")).await;
    assert_eq!(current, good);
}

#[tokio::test]
async fn renamed_locations_show_in_row_views() {
    let srv = TestServer::spawn(ward_rows()).await;
    let client = reqwest::Client::new();

    let res = client
        .put(srv.url("/settings/locations/ICU"))
        .json(&json!({ "display_name": "Intensive Care Unit" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let rows = get_json(&client, srv.url("/rows?locations=ICU")).await;
    assert_eq!(rows["rows"][0]["location"], "ICU");
    assert_eq!(rows["rows"][0]["location_name"], "Intensive Care Unit");

    let res = client
        .put(srv.url("/settings/locations/ICU"))
        .json(&json!({ "display_name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::StatusCode;
use serde_json::json;

use stallbook_api::app::services::{AppServices, SharedClock};
use stallbook_api::config::ApiConfig;
use stallbook_core::FixedClock;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(app: axum::Router) -> Self {
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

    async fn in_memory(allow_set_sold: bool) -> Self {
        let clock: SharedClock = Arc::new(FixedClock::new(today()));
        let services = AppServices::in_memory(clock, allow_set_sold);
        Self::spawn(stallbook_api::app::build_app_with(services)).await
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

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

async fn create(
    client: &reqwest::Client,
    srv: &TestServer,
    name: &str,
    prepared: i64,
    price: f64,
) -> serde_json::Value {
    let res = client
        .post(srv.url("/api/food_items"))
        .json(&json!({
            "name": name,
            "date": "2024-06-14",
            "time_slot": "Lunch",
            "quantity_prepared": prepared,
            "price": price,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

async fn sell(client: &reqwest::Client, srv: &TestServer, id: u64, quantity: i64) -> reqwest::Response {
    client
        .post(srv.url(&format!("/api/food_items/{id}/sell")))
        .json(&json!({ "quantity": quantity }))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::in_memory(false).await;
    let res = reqwest::get(srv.url("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn selling_session_lifecycle() {
    let srv = TestServer::in_memory(false).await;
    let client = reqwest::Client::new();

    let a = create(&client, &srv, "Samosa", 10, 5.0).await;
    let b = create(&client, &srv, "Chai", 5, 2.0).await;
    let a_id = a["id"].as_u64().unwrap();
    assert_eq!(a["quantity_sold"], 0);
    assert_eq!(a["sales_closed"], false);

    let res = sell(&client, &srv, a_id, 3).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity_sold"], 3);

    let res = sell(&client, &srv, a_id, 8).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "capacity_exceeded");
    assert_eq!(body["remaining"], 7);

    let res = sell(&client, &srv, a_id, 7).await;
    assert_eq!(res.status(), StatusCode::OK);

    // Open: remainder is reported as unsold.
    let report: serde_json::Value = client
        .get(srv.url("/api/reports/daily"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["remainder_label"], "Unsold");
    assert_eq!(report["total_remainder"], 5);

    let res = client.post(srv.url("/api/close_sales")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r["sales_closed"] == true));
    assert_eq!(records[1]["id"], b["id"]);
    assert_eq!(records[1]["quantity_wasted"], 5);

    let res = client.post(srv.url("/api/close_sales")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "session_closed");

    let res = sell(&client, &srv, a_id, 1).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let session: serde_json::Value = client
        .get(srv.url("/api/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["state"], "closed");
    assert_eq!(session["remainder_label"], "Wasted");

    let report: serde_json::Value = client
        .get(srv.url("/api/reports/daily?date=2024-06-14"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["empty"], false);
    assert_eq!(report["remainder_label"], "Wasted");
    assert_eq!(report["total_sold"], 10);
    assert_eq!(report["total_remainder"], 5);
    assert_eq!(report["total_sales"].as_f64(), Some(50.0));

    let res = client
        .get(srv.url("/api/reports/weekly.csv?ending=2024-06-14"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let disposition = res.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("weekly_analysis_2024-06-08_2024-06-14.csv"));
    let csv = res.text().await.unwrap();
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Name,Sold,Wasted/Unsold,Price,Sales",
            "Samosa,10,0,5.00,50.00",
            "Chai,0,5,2.00,0.00",
        ]
    );

    let res = client.post(srv.url("/api/start_new_sales")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["discarded"], 2);

    let items: serde_json::Value = client
        .get(srv.url("/api/food_items"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items, json!([]));

    let report: serde_json::Value = client
        .get(srv.url("/api/reports/weekly"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(report["empty"], true);

    // Ids are never handed out twice, not even after a reset.
    let c = create(&client, &srv, "Vada", 1, 1.0).await;
    assert_eq!(c["id"], 3);
}

#[tokio::test]
async fn invalid_requests_are_rejected_without_changes() {
    let srv = TestServer::in_memory(false).await;
    let client = reqwest::Client::new();

    let bad_items = [
        json!({ "name": "  ", "time_slot": "Lunch", "quantity_prepared": 1, "price": 1.0 }),
        json!({ "name": "Idli", "time_slot": "Lunch", "quantity_prepared": -1, "price": 1.0 }),
        json!({ "name": "Idli", "time_slot": "Lunch", "quantity_prepared": 1, "price": -0.5 }),
        json!({ "name": "Idli", "date": "14-06-2024", "time_slot": "Lunch", "quantity_prepared": 1, "price": 1.0 }),
    ];
    for body in bad_items {
        let res = client
            .post(srv.url("/api/food_items"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "accepted {body}");
    }

    let close = client.post(srv.url("/api/close_sales")).send().await.unwrap();
    assert_eq!(close.status(), StatusCode::BAD_REQUEST);

    let item = create(&client, &srv, "Idli", 4, 1.5).await;
    let id = item["id"].as_u64().unwrap();

    for quantity in [0, -2] {
        let res = sell(&client, &srv, id, quantity).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    let res = sell(&client, &srv, 999, 1).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(srv.url("/api/food_items/not-a-number"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let fetched: serde_json::Value = client
        .get(srv.url(&format!("/api/food_items/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["quantity_sold"], 0);

    let res = client
        .delete(srv.url(&format!("/api/food_items/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = client
        .delete(srv.url(&format!("/api/food_items/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn absolute_sold_overwrite_is_opt_in() {
    let client = reqwest::Client::new();

    let locked = TestServer::in_memory(false).await;
    let item = create(&client, &locked, "Poha", 6, 3.0).await;
    let res = client
        .put(locked.url(&format!("/api/food_items/{}", item["id"])))
        .json(&json!({ "quantity_sold": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let open = TestServer::in_memory(true).await;
    let item = create(&client, &open, "Poha", 6, 3.0).await;
    let url = open.url(&format!("/api/food_items/{}", item["id"]));

    let res = client.put(&url).json(&json!({ "quantity_sold": 4 })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["quantity_sold"], 4);

    let res = client.put(&url).json(&json!({ "quantity_sold": 7 })).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schedule_order_lists_newest_date_first() {
    let srv = TestServer::in_memory(false).await;
    let client = reqwest::Client::new();

    for (name, date, slot) in [
        ("old-lunch", "2024-06-12", "Lunch"),
        ("new-lunch", "2024-06-14", "Lunch"),
        ("new-breakfast", "2024-06-14", "Breakfast"),
    ] {
        let res = client
            .post(srv.url("/api/food_items"))
            .json(&json!({
                "name": name,
                "date": date,
                "time_slot": slot,
                "quantity_prepared": 1,
                "price": 1.0,
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let names = |items: serde_json::Value| -> Vec<String> {
        items
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["name"].as_str().unwrap().to_string())
            .collect()
    };

    let inserted = client.get(srv.url("/api/food_items")).send().await.unwrap();
    assert_eq!(
        names(inserted.json().await.unwrap()),
        vec!["old-lunch", "new-lunch", "new-breakfast"]
    );

    let scheduled = client
        .get(srv.url("/api/food_items?order=schedule"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        names(scheduled.json().await.unwrap()),
        vec!["new-breakfast", "new-lunch", "old-lunch"]
    );
}

#[tokio::test]
async fn file_backed_records_survive_restart() {
    let path = std::env::temp_dir().join(format!("stallbook-api-{}.json", uuid::Uuid::now_v7()));
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        data_file: Some(PathBuf::from(&path)),
        allow_set_sold: false,
    };
    let client = reqwest::Client::new();

    let id = {
        let srv = TestServer::spawn(stallbook_api::app::build_app(&config).unwrap()).await;
        let item = create(&client, &srv, "Kachori", 12, 4.0).await;
        let id = item["id"].as_u64().unwrap();
        assert_eq!(sell(&client, &srv, id, 5).await.status(), StatusCode::OK);
        id
    };

    let srv = TestServer::spawn(stallbook_api::app::build_app(&config).unwrap()).await;
    let item: serde_json::Value = client
        .get(srv.url(&format!("/api/food_items/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(item["name"], "Kachori");
    assert_eq!(item["quantity_sold"], 5);
    assert_eq!(item["remaining"], 7);

    let _ = std::fs::remove_file(&path);
}

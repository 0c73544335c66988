use reqwest::StatusCode;
use serde_json::{Value, json};

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = stockroom_api::app::build_app();
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
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn create_item(client: &reqwest::Client, base_url: &str, sku: &str, stock: i64) {
    let res = client
        .post(format!("{base_url}/items"))
        .json(&json!({"sku": sku, "name": "Espresso Beans", "price": 10.99, "stock": stock}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn get_stock(client: &reqwest::Client, base_url: &str, sku: &str) -> i64 {
    let item: Value = client
        .get(format!("{base_url}/items/{sku}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    item["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn item_crud_lifecycle() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    create_item(&client, base, "ESP-001", 20).await;

    // Duplicate sku conflicts and leaves the record unmodified.
    let res = client
        .post(format!("{base}/items"))
        .json(&json!({"sku": "ESP-001", "name": "Other", "price": 1, "stock": 99}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(get_stock(&client, base, "ESP-001").await, 20);

    // Missing required field.
    let res = client
        .post(format!("{base}/items"))
        .json(&json!({"sku": "X", "name": "No price", "stock": 1}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Missing field: price");

    // Update ignores unknown fields; an all-unknown update is rejected.
    let res = client
        .put(format!("{base}/items/ESP-001"))
        .json(&json!({"color": "red"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .put(format!("{base}/items/ESP-001"))
        .json(&json!({"price": "12.50"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["price"], json!(12.5));

    // List is an array containing the item.
    let items: Value = client
        .get(format!("{base}/items"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(items.as_array().unwrap().len(), 1);

    // Delete twice: both 204.
    for _ in 0..2 {
        let res = client
            .delete(format!("{base}/items/ESP-001"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    let res = client.get(format!("{base}/items/ESP-001")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn stock_out_decrements_and_audits() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    create_item(&client, base, "ESP-001", 20).await;

    let res = client
        .post(format!("{base}/stock/out"))
        .json(&json!({"sku": "ESP-001", "qty": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["item"]["stock"], json!(15));
    assert_eq!(body["movement"]["type"], "OUT");
    assert_eq!(body["movement"]["qty"], json!(5));
    assert_eq!(body["movement"]["reason"], "sale");

    // Demand beyond availability fails and changes nothing.
    let res = client
        .post(format!("{base}/stock/out"))
        .json(&json!({"sku": "ESP-001", "qty": 100}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(get_stock(&client, base, "ESP-001").await, 15);

    // Stock-in with an explicit reason.
    let res = client
        .post(format!("{base}/stock/in"))
        .json(&json!({"sku": "ESP-001", "qty": 10, "reason": "restock"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["item"]["stock"], json!(25));
    assert_eq!(body["movement"]["reason"], "restock");

    // Audit trail: the successful OUT and IN, in order.
    let trail: Value = client
        .get(format!("{base}/stock/movements/ESP-001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let trail = trail.as_array().unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0]["type"], "OUT");
    assert_eq!(trail[1]["type"], "IN");
}

#[tokio::test]
async fn order_placement_consumes_stock() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    create_item(&client, base, "ESP-001", 15).await;

    let res = client
        .post(format!("{base}/orders"))
        .json(&json!({"items": [{"sku": "ESP-001", "qty": 3}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: Value = res.json().await.unwrap();
    assert_eq!(order["status"], "PLACED");
    assert_eq!(order["items"][0]["qty"], json!(3));
    let order_id = order["id"].as_str().unwrap().to_string();

    assert_eq!(get_stock(&client, base, "ESP-001").await, 12);

    // The order is retrievable and patchable (status only).
    let res = client
        .get(format!("{base}/orders/{order_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .patch(format!("{base}/orders/{order_id}"))
        .json(&json!({"status": "FULFILLED"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = res.json().await.unwrap();
    assert_eq!(patched["status"], "FULFILLED");
}

#[tokio::test]
async fn unsatisfiable_order_leaves_no_trace() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    create_item(&client, base, "ESP-001", 15).await;

    let res = client
        .post(format!("{base}/orders"))
        .json(&json!({"items": [{"sku": "ESP-001", "qty": 1000}]}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    assert_eq!(get_stock(&client, base, "ESP-001").await, 15);

    let orders: Value = client
        .get(format!("{base}/orders"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(orders.as_array().unwrap().is_empty());

    // Empty order is a validation failure.
    let res = client
        .post(format!("{base}/orders"))
        .json(&json!({"items": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "No items in order");
}

#[tokio::test]
async fn concurrent_stock_out_never_oversells() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let base = server.base_url.clone();

    create_item(&client, &base, "ESP-001", 10).await;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let client = client.clone();
        let base = base.clone();
        tasks.push(tokio::spawn(async move {
            client
                .post(format!("{base}/stock/out"))
                .json(&json!({"sku": "ESP-001", "qty": 3}))
                .send()
                .await
                .unwrap()
                .status()
                == StatusCode::OK
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap() {
            successes += 1;
        }
    }

    // 10 / 3 => exactly 3 decrements fit; the rest fail with a conflict.
    assert_eq!(successes, 3);
    assert_eq!(get_stock(&client, &base, "ESP-001").await, 1);
}

#[tokio::test]
async fn routing_edges() {
    let server = TestServer::spawn().await;
    let client = reqwest::Client::new();
    let base = &server.base_url;

    // Unknown path.
    let res = client.get(format!("{base}/customers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Known path, wrong verb.
    let res = client.patch(format!("{base}/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    // A verb outside the dispatch vocabulary: still 404 on an unknown path,
    // 405 on a known one.
    let res = client.head(format!("{base}/customers")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = client.head(format!("{base}/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

    // CORS preflight.
    let res = client
        .request(reqwest::Method::OPTIONS, format!("{base}/items"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    // Health endpoint bypasses dispatch.
    let res = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

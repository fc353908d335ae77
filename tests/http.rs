use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::sleep;

const FEEDS: [&str; 8] = [
    "realtime.json",
    "today.json",
    "top-traffic-sources-30-days.json",
    "top-downloads-yesterday.json",
    "top-domains-7-days.json",
    "top-domains-30-days.json",
    "top-pages-realtime.json",
    "top-cities-realtime.json",
];

#[derive(Clone, Default)]
struct Upstream {
    requests: Arc<Mutex<Vec<String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    bodies: Arc<Mutex<HashMap<String, String>>>,
}

impl Upstream {
    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn clear(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    /// Answers `path` with 200 and the given raw body instead of the fixture.
    fn respond(&self, path: &str, body: &str) {
        self.bodies.lock().unwrap().insert(path.to_string(), body.to_string());
    }
}

struct TestServer {
    base_url: String,
    upstream: Upstream,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(unix)]
mod cleanup {
    use once_cell::sync::Lazy;
    use std::sync::Mutex;
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PIDS: Lazy<Mutex<Vec<i32>>> = Lazy::new(|| Mutex::new(Vec::new()));

    pub fn register(pid: u32) {
        if let Ok(mut pids) = PIDS.lock() {
            pids.push(pid as i32);
        }
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = PIDS.lock() {
            for pid in pids.iter().filter(|pid| **pid > 0) {
                unsafe {
                    libc::kill(*pid, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn rows(count: usize, make: impl Fn(usize) -> Value) -> Value {
    json!({ "data": (0..count).map(make).collect::<Vec<_>>() })
}

fn fixture(file: &str) -> Option<Value> {
    let body = match file {
        "realtime.json" => json!({ "data": [{ "active_visitors": "1234567" }] }),
        "today.json" => rows(24, |i| json!({ "hour": format!("{i:02}"), "visits": (i * 10).to_string() })),
        "top-traffic-sources-30-days.json" => {
            json!({ "data": [], "totals": { "visits": 98765432, "users": "1234" } })
        }
        "top-downloads-yesterday.json" => rows(25, |i| {
            json!({
                "page_title": format!("Annual report on federal download number {i}"),
                "total_events": (1000 - i).to_string(),
            })
        }),
        "top-domains-7-days.json" | "top-domains-30-days.json" => {
            rows(25, |i| json!({ "domain": format!("site{i}.gov"), "visits": 5000 - i }))
        }
        "top-pages-realtime.json" => rows(22, |i| {
            json!({ "page_title": format!("Page {i}"), "active_visitors": (300 - i).to_string() })
        }),
        "top-cities-realtime.json" => json!({
            "data": [
                { "city": "New York", "active_visitors": "500" },
                { "city": "Gotham", "active_visitors": "9" },
                { "city": "Boston ", "active_visitors": "40" },
            ]
        }),
        _ => return None,
    };
    Some(body)
}

async fn serve_feed(
    State(upstream): State<Upstream>,
    Path((dept, file)): Path<(String, String)>,
) -> Response {
    let path = format!("{dept}/{file}");
    upstream.requests.lock().unwrap().push(path.clone());
    if upstream.failing.lock().unwrap().contains(&path) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream down").into_response();
    }
    if let Some(body) = upstream.bodies.lock().unwrap().get(&path).cloned() {
        return body.into_response();
    }
    match fixture(&file) {
        Some(body) => Json(body).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn spawn_upstream() -> (String, Upstream) {
    let upstream = Upstream::default();
    let app = Router::new()
        .route("/data/:dept/:file", get(serve_feed))
        .with_state(upstream.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/data"), upstream)
}

async fn wait_until_ready(base_url: &str) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = Client::new().get(format!("{base_url}/healthz")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let (upstream_url, upstream) = spawn_upstream().await;
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_gov_analytics"))
        .env("PORT", port.to_string())
        .env("ANALYTICS_BASE_URL", upstream_url)
        .env("ANALYTICS_TIMEOUT_SECS", "5")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        upstream,
        child,
    }
}

async fn get_json(url: String) -> (StatusCode, Value) {
    let resp = Client::new().get(url).send().await.unwrap();
    let status = resp.status();
    let body = resp.json().await.unwrap_or(Value::Null);
    (status, body)
}

fn requested_feeds(paths: &[String], dept: &str) -> Vec<String> {
    let mut feeds: Vec<String> = paths
        .iter()
        .filter_map(|path| path.strip_prefix(&format!("{dept}/")).map(str::to_string))
        .collect();
    feeds.sort();
    feeds
}

fn all_feeds() -> Vec<String> {
    let mut feeds: Vec<String> = FEEDS.iter().map(|feed| feed.to_string()).collect();
    feeds.sort();
    feeds
}

#[tokio::test]
async fn http_dashboard_shapes_every_panel() {
    let server = spawn_server().await;

    let (status, body) = get_json(format!("{}/api/live/dashboard", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["department"], "live");

    assert_eq!(body["active_users"]["status"], "ok");
    assert_eq!(body["active_users"]["data"]["value"], "1,234,567");
    assert_eq!(body["active_users"]["data"]["label"], "people on all sites right now");
    assert_eq!(body["monthly_visits"]["data"]["value"], "98,765,432");

    let today = &body["visits_today"]["data"];
    assert_eq!(today["labels"].as_array().unwrap().len(), 23);
    assert_eq!(today["labels"][0], "1 AM");
    assert_eq!(today["values"][0], 10);

    let downloads = &body["top_downloads"]["data"];
    assert_eq!(downloads["labels"].as_array().unwrap().len(), 20);
    assert_eq!(downloads["values"].as_array().unwrap().len(), 20);
    assert_eq!(downloads["labels"][0], "Annual report on federal downl...");
    assert_eq!(downloads["values"][0], 1000);

    for key in ["top_domains_7_days", "top_domains_30_days"] {
        let domains = &body[key]["data"];
        assert_eq!(domains["labels"].as_array().unwrap().len(), 20);
        assert_eq!(domains["labels"][19], "site19.gov");
    }
    assert_eq!(body["top_pages"]["data"]["labels"][0], "Page 0");

    let series = body["visitor_locations"]["data"]["series"].as_array().unwrap();
    assert_eq!(series.len(), 5);
    let points = series[0]["points"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["name"], "New York");
    assert_eq!(points[1]["name"], "Boston");
    assert_eq!(points[1]["size"], 20.0);

    assert_eq!(requested_feeds(&server.upstream.requests(), "live"), all_feeds());
}

#[tokio::test]
async fn http_switching_department_requeries_every_panel_in_order() {
    let server = spawn_server().await;
    server.upstream.clear();

    let (status, commerce) = get_json(format!("{}/api/commerce/dashboard", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(commerce["department"], "commerce");
    assert_eq!(commerce["active_users"]["data"]["label"], "people on Commerce sites right now");

    let (status, live) = get_json(format!("{}/api/live/dashboard", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(live["department"], "live");

    let paths = server.upstream.requests();
    assert_eq!(paths.len(), 16);
    assert!(paths[..8].iter().all(|path| path.starts_with("commerce/")));
    assert!(paths[8..].iter().all(|path| path.starts_with("live/")));
    assert_eq!(requested_feeds(&paths, "commerce"), all_feeds());
    assert_eq!(requested_feeds(&paths, "live"), all_feeds());
}

#[tokio::test]
async fn http_failing_feed_only_breaks_its_panel() {
    let server = spawn_server().await;
    server.upstream.fail("energy/top-pages-realtime.json");

    let (status, body) = get_json(format!("{}/api/energy/dashboard", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top_pages"]["status"], "error");
    assert!(body["top_pages"]["message"].as_str().unwrap().contains("500"));
    for key in [
        "active_users",
        "monthly_visits",
        "visits_today",
        "top_downloads",
        "top_domains_7_days",
        "top_domains_30_days",
        "visitor_locations",
    ] {
        assert_eq!(body[key]["status"], "ok", "panel {key} should load");
    }

    let resp = Client::new()
        .get(format!("{}/api/energy/top-pages", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn http_malformed_feeds_surface_as_panel_errors() {
    let server = spawn_server().await;
    server.upstream.respond("justice/realtime.json", r#"{"data": []}"#);
    server.upstream.respond("justice/top-traffic-sources-30-days.json", r#"{"totals": {}}"#);
    server.upstream.respond("justice/top-pages-realtime.json", "<html>outage</html>");
    server.upstream.respond("justice/today.json", r#"{"error": "feed moved"}"#);

    let (status, body) = get_json(format!("{}/api/justice/dashboard", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);

    let message = |key: &str| {
        assert_eq!(body[key]["status"], "error", "panel {key} should fail");
        body[key]["message"].as_str().unwrap().to_string()
    };
    assert!(message("active_users").contains("data[0].active_visitors"));
    assert!(message("monthly_visits").contains("totals.visits"));
    assert!(message("top_pages").contains("unexpected body"));
    assert!(message("visits_today").contains("unexpected body"));
    for key in [
        "top_downloads",
        "top_domains_7_days",
        "top_domains_30_days",
        "visitor_locations",
    ] {
        assert_eq!(body[key]["status"], "ok", "panel {key} should load");
    }

    for path in [
        "/api/justice/active-users",
        "/api/justice/monthly-traffic/visits",
        "/api/justice/top-pages",
        "/api/justice/visits-today",
    ] {
        let resp = Client::new()
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY, "{path}");
    }

    let (status, _) = get_json(format!("{}/api/labor/active-users", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn http_rejects_unknown_parameters_without_fetching() {
    let server = spawn_server().await;
    server.upstream.clear();

    for path in [
        "/api/not-a-department/dashboard",
        "/api/commerce/top-domains/14",
        "/api/commerce/monthly-traffic/sessions",
    ] {
        let resp = Client::new()
            .get(format!("{}{path}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{path}");
    }

    let message = Client::new()
        .get(format!("{}/api/commerce/top-domains/14", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(message, "days must be 7 or 30, got '14'");
    assert!(server.upstream.requests().is_empty());
}

#[tokio::test]
async fn http_single_panel_endpoints() {
    let server = spawn_server().await;

    let (status, users) = get_json(format!("{}/api/labor/monthly-traffic/users", server.base_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(users["value"], "1,234");
    assert_eq!(users["label"], "total users (past month)");

    let (_, domains) = get_json(format!("{}/api/labor/top-domains/30", server.base_url)).await;
    assert_eq!(domains["labels"].as_array().unwrap().len(), 20);

    let (_, today) = get_json(format!("{}/api/labor/visits-today", server.base_url)).await;
    assert_eq!(today["values"].as_array().unwrap().len(), 23);

    let (_, options) = get_json(format!("{}/api/departments", server.base_url)).await;
    assert_eq!(options[0], json!({ "label": "All", "value": "live" }));

    let html = Client::new()
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("USA Government Website Analytics"));
    assert!(html.contains(r#"<option value="labor">Labor</option>"#));

    let paths = server.upstream.requests();
    assert!(paths.contains(&"labor/top-traffic-sources-30-days.json".to_string()));
    assert!(paths.contains(&"labor/top-domains-30-days.json".to_string()));
    assert!(paths.contains(&"labor/today.json".to_string()));
}

//! In-process fake of the three upstream services: the IP ranking page, the
//! Cloudflare DNS records API and the PushPlus send endpoint.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dnscf::Config;

pub const ZONE_ID: &str = "zone123";
pub const DNS_NAME: &str = "cdn.example.com";
pub const API_TOKEN: &str = "cf-token";

/// A PUT that reached the fake Cloudflare API.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedPut {
    pub record_id: String,
    pub body: Value,
}

/// Scripted responses plus everything the fake saw.
pub struct Upstream {
    pub ip_status: StatusCode,
    pub ip_body: String,
    pub list_status: StatusCode,
    /// (id, name) pairs in the order Cloudflare returns them.
    pub records: Vec<(String, String)>,
    /// Record ids whose PUT always answers 500.
    pub failing_records: Vec<String>,
    pub push_status: StatusCode,

    pub ip_requests: usize,
    pub list_requests: usize,
    pub puts: Vec<RecordedPut>,
    pub auth_headers: Vec<String>,
    pub notifications: Vec<Value>,
}

impl Upstream {
    pub fn new(ip_body: &str, records: &[(&str, &str)]) -> Self {
        Self {
            ip_status: StatusCode::OK,
            ip_body: ip_body.to_string(),
            list_status: StatusCode::OK,
            records: records
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
            failing_records: Vec::new(),
            push_status: StatusCode::OK,
            ip_requests: 0,
            list_requests: 0,
            puts: Vec::new(),
            auth_headers: Vec::new(),
            notifications: Vec::new(),
        }
    }

    pub fn notification_contents(&self) -> Vec<String> {
        self.notifications
            .iter()
            .map(|n| n["content"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

type Shared = Arc<Mutex<Upstream>>;

pub struct FakeUpstream {
    pub state: Shared,
    addr: SocketAddr,
}

impl FakeUpstream {
    pub async fn start(upstream: Upstream) -> Self {
        let state = Arc::new(Mutex::new(upstream));

        let app = Router::new()
            .route("/ipTop10.html", get(ip_list))
            .route("/client/v4/zones/{zone_id}/dns_records", get(list_records))
            .route(
                "/client/v4/zones/{zone_id}/dns_records/{record_id}",
                put(update_record),
            )
            .route("/send", post(push))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { state, addr }
    }

    /// Config pointing every endpoint at this fake, with no retry delay.
    pub fn config(&self) -> Config {
        let vars: HashMap<&str, String> = HashMap::from([
            ("CF_API_TOKEN", API_TOKEN.to_string()),
            ("CF_ZONE_ID", ZONE_ID.to_string()),
            ("CF_DNS_NAME", DNS_NAME.to_string()),
            ("PUSHPLUS_TOKEN", "push-token".to_string()),
            ("CF_API_BASE", format!("http://{}/client/v4", self.addr)),
            ("IP_SOURCE_URL", format!("http://{}/ipTop10.html", self.addr)),
            ("PUSHPLUS_URL", format!("http://{}/send", self.addr)),
        ]);

        let mut config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
        config.retry_delay = Duration::ZERO;
        config
    }

    pub fn with<R>(&self, f: impl FnOnce(&Upstream) -> R) -> R {
        f(&*self.state.lock().unwrap())
    }
}

async fn ip_list(State(state): State<Shared>) -> (StatusCode, String) {
    let mut s = state.lock().unwrap();
    s.ip_requests += 1;
    (s.ip_status, s.ip_body.clone())
}

async fn list_records(
    State(state): State<Shared>,
    Path(zone_id): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let mut s = state.lock().unwrap();
    s.list_requests += 1;
    record_auth(&mut s, &headers);

    if zone_id != ZONE_ID || s.list_status != StatusCode::OK {
        let status = if zone_id != ZONE_ID {
            StatusCode::NOT_FOUND
        } else {
            s.list_status
        };
        return (
            status,
            Json(json!({"success": false, "errors": [{"code": 7003, "message": "Could not route"}], "result": null})),
        );
    }

    let result: Vec<Value> = s
        .records
        .iter()
        .map(|(id, name)| json!({"id": id, "name": name, "type": "A", "content": "0.0.0.0", "proxied": false}))
        .collect();

    (
        StatusCode::OK,
        Json(json!({"success": true, "errors": [], "result": result})),
    )
}

async fn update_record(
    State(state): State<Shared>,
    Path((zone_id, record_id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut s = state.lock().unwrap();
    record_auth(&mut s, &headers);
    s.puts.push(RecordedPut {
        record_id: record_id.clone(),
        body: body.clone(),
    });

    if zone_id != ZONE_ID || s.failing_records.contains(&record_id) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "errors": [{"code": 10000, "message": "Internal error"}]})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({"success": true, "errors": [], "result": {"id": record_id, "name": body["name"], "content": body["content"]}})),
    )
}

async fn push(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut s = state.lock().unwrap();
    s.notifications.push(body);
    let status = s.push_status;
    (status, Json(json!({"code": status.as_u16(), "msg": "ok"})))
}

fn record_auth(s: &mut Upstream, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    s.auth_headers.push(auth);
}

#![allow(dead_code)]

//! 进程内模拟后端：按 `{code,msg,data}` 信封应答，记录每个请求，
//! 并可随时让 Access Token 失效以触发刷新流程。

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use group_buy_client::config::AppConfig;
use group_buy_client::features::auth::LoginRequest;
use group_buy_client::notify::MemoryNotifier;
use group_buy_client::session::MemorySessionStorage;
use group_buy_client::state::AppState;

pub const PASSWORD: &str = "secret";

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
    username: String,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub refresh_calls: AtomicUsize,
    pub refresh_fails: AtomicBool,
    pub refresh_delay_ms: AtomicU64,
    tokens: Mutex<Tokens>,
    requests: Mutex<Vec<Recorded>>,
}

impl MockState {
    /// 让客户端当前持有的 Access Token 失效（Refresh Token 仍有效）
    pub fn expire_access_token(&self) {
        self.tokens.lock().unwrap().access = Some("server-rotated".to_string());
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request recorded")
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

pub async fn spawn_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = Router::new().fallback(handle).with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockBackend {
        base_url: format!("http://{addr}/api"),
        state,
    }
}

/// 一个没有任何服务监听的地址
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}/api")
}

pub struct TestClient {
    pub app: AppState,
    pub notifier: Arc<MemoryNotifier>,
    pub storage: Arc<MemorySessionStorage>,
}

pub fn client(base_url: &str) -> TestClient {
    let mut config = AppConfig::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;

    let notifier = Arc::new(MemoryNotifier::new());
    let storage = Arc::new(MemorySessionStorage::new());
    let app = AppState::with_parts(config, storage.clone(), notifier.clone()).expect("AppState");
    TestClient {
        app,
        notifier,
        storage,
    }
}

pub fn credentials(username: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: PASSWORD.to_string(),
    }
}

/// 登录并进入角色首页
pub async fn login(tc: &TestClient, username: &str) {
    tc.app
        .login_and_enter(&credentials(username), None)
        .await
        .expect("login");
}

fn envelope(data: Value) -> Response {
    Json(json!({ "code": "00000", "msg": "success", "data": data })).into_response()
}

fn business_error(code: Value, msg: Option<&str>) -> Response {
    let mut body = json!({ "code": code });
    if let Some(msg) = msg {
        body["msg"] = Value::from(msg);
    }
    Json(body).into_response()
}

fn auth_payload(username: &str, access: &str, refresh: &str) -> Value {
    let (user_id, role) = if username == "admin" {
        ("A1", "ADMIN")
    } else {
        ("U1", "USER")
    };
    json!({
        "userId": user_id,
        "username": username,
        "nickname": format!("{username}-nick"),
        "role": role,
        "avatar": null,
        "accessToken": access,
        "refreshToken": refresh,
    })
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().trim_start_matches("/api").to_string();
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(Recorded {
        method: method.to_string(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        authorization: authorization.clone(),
        body: body.clone(),
    });

    match (method.as_str(), path.as_str()) {
        ("POST", "/auth/login") => return login_handler(&state, body),
        ("POST", "/auth/register") => {
            let username = body
                .as_ref()
                .and_then(|b| b["username"].as_str())
                .unwrap_or_default()
                .to_string();
            return envelope(auth_payload(&username, "unused", "unused"));
        }
        ("POST", "/auth/refresh") => return refresh_handler(&state, body).await,
        _ => {}
    }

    if let Some(code) = path.strip_prefix("/status/") {
        let status = code
            .parse::<u16>()
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        return (status, Json(json!({ "message": format!("status {}", status.as_u16()) })))
            .into_response();
    }
    if let Some(code) = path.strip_prefix("/status-plain/") {
        let status = code
            .parse::<u16>()
            .ok()
            .and_then(|c| StatusCode::from_u16(c).ok())
            .unwrap_or(StatusCode::BAD_REQUEST);
        return (status, "plain failure").into_response();
    }

    let expected = state
        .tokens
        .lock()
        .unwrap()
        .access
        .as_ref()
        .map(|t| format!("Bearer {t}"));
    let authorized = expected.is_some() && authorization == expected;
    if !authorized || path == "/always-unauthorized" {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "unauthorized" })))
            .into_response();
    }

    match path.as_str() {
        "/business/text" => business_error(json!("A0401"), Some("活动已结束")),
        "/business/numeric" => business_error(json!(401), Some("登录状态失效")),
        "/business/silent" => business_error(json!("B0001"), None),
        "/garbage" => (StatusCode::OK, "<html>not json</html>").into_response(),
        "/goods/SKU1/trial" => envelope(json!({
            "skuId": "SKU1",
            "originalPrice": 100.0,
            "discountPrice": 80.0,
            "discountDesc": "直减20元",
            "activityId": "ACT1",
            "activityName": "周末拼团",
            "hitActivity": true,
        })),
        "/goods/SKU1/teams" => envelope(json!([{
            "orderId": "ORD1",
            "spuId": "SKU1",
            "currentCount": 1,
            "targetCount": 3,
            "remainingSeconds": 600,
            "leaderNickname": "团长",
        }])),
        "/goods/spu/list" => envelope(json!([{
            "spuId": "SPU1",
            "spuName": "拼团好物",
            "minOriginalPrice": 100.0,
            "minGroupPrice": 80.0,
            "hasActivity": true,
            "activityId": "ACT1",
        }])),
        "/trade/lock" => {
            let req = body.unwrap_or(Value::Null);
            envelope(json!({
                "tradeOrderId": "TRD1",
                "orderId": req["orderId"],
                "activityId": req["activityId"],
                "goodsId": req["skuId"],
                "payPrice": req["payPrice"],
                "outTradeNo": req["outTradeNo"],
                "status": "CREATE",
            }))
        }
        "/user/profile" => envelope(json!({
            "userId": "U1",
            "username": "alice",
            "nickname": "新昵称",
            "avatar": "https://cdn.example.com/u1.png",
        })),
        "/user/orders" => envelope(json!([{
            "tradeOrderId": "TRD1",
            "goodsName": "拼团好物",
            "payPrice": 80.0,
            "tradeStatus": "PAID",
        }])),
        "/payment/query" => envelope(json!({
            "success": true,
            "tradeNo": "2024",
            "outTradeNo": uri.query().unwrap_or_default(),
            "tradeStatus": "TRADE_SUCCESS",
            "totalAmount": 80.0,
        })),
        "/payment/create" => envelope(json!("<form>pay</form>")),
        "/trade/refund/TRD1" => envelope(Value::Null),
        _ => envelope(json!({
            "method": method.as_str(),
            "path": path,
            "query": uri.query(),
            "body": body,
        })),
    }
}

fn login_handler(state: &MockState, body: Option<Value>) -> Response {
    let body = body.unwrap_or(Value::Null);
    let username = body["username"].as_str().unwrap_or_default().to_string();
    if body["password"].as_str() != Some(PASSWORD) {
        return business_error(json!("A0201"), Some("用户名或密码错误"));
    }
    let mut tokens = state.tokens.lock().unwrap();
    tokens.access = Some("access-1".to_string());
    tokens.refresh = Some("refresh-1".to_string());
    tokens.username = username.clone();
    envelope(auth_payload(&username, "access-1", "refresh-1"))
}

async fn refresh_handler(state: &MockState, body: Option<Value>) -> Response {
    let n = state.refresh_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let delay = state.refresh_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let presented = body
        .as_ref()
        .and_then(|b| b["refreshToken"].as_str())
        .map(str::to_string);
    let mut tokens = state.tokens.lock().unwrap();
    if state.refresh_fails.load(Ordering::SeqCst) || presented.is_none() || presented != tokens.refresh
    {
        return business_error(json!("A0230"), Some("刷新令牌无效"));
    }

    let access = format!("access-r{n}");
    let refresh = format!("refresh-r{n}");
    tokens.access = Some(access.clone());
    tokens.refresh = Some(refresh.clone());
    let username = tokens.username.clone();
    envelope(auth_payload(&username, &access, &refresh))
}

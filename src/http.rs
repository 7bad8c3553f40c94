//! 带鉴权的 HTTP 客户端。
//!
//! - 出站：持有 Token 时附加 `Authorization: Bearer <token>`
//! - 入站：按业务信封 code 与 HTTP 状态码分类，失败时发出一条用户提示
//! - 401：通过会话存储刷新一次 Token 后重放原请求一次，不会无限重试

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::{ClientError, MSG_REQUEST_FAILED};
use crate::notify::Notifier;
use crate::router::LOGIN_PATH;
use crate::session::SessionStore;

/// 业务成功码
pub const SUCCESS_CODE: &str = "00000";

/// 业务层“登录失效”码。后端以数字形式下发时才会命中。
const SESSION_EXPIRED_CODE: i64 = 401;

/// 业务状态码：后端通常下发字符串（如 "00000"、"A0401"），个别场景为数字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BusinessCode {
    Text(String),
    Number(i64),
}

impl BusinessCode {
    pub fn is_success(&self) -> bool {
        matches!(self, BusinessCode::Text(c) if c == SUCCESS_CODE)
    }

    /// 仅数字 401 视为登录失效，字符串 "401" / "A0401" 不命中
    pub fn is_session_expired(&self) -> bool {
        matches!(self, BusinessCode::Number(SESSION_EXPIRED_CODE))
    }
}

impl std::fmt::Display for BusinessCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusinessCode::Text(s) => f.write_str(s),
            BusinessCode::Number(n) => write!(f, "{n}"),
        }
    }
}

/// 统一响应信封 `{code, msg, data}`
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T = Value> {
    pub code: BusinessCode,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<T>,
}

/// 一次出站请求的描述，可被克隆用于重放
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.starts_with('/') {
            path.insert(0, '/');
        }
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// 追加查询参数
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// 追加可选查询参数，None 时跳过
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.query(key, v),
            None => self,
        }
    }

    /// 将结构体的顶层字段展开为查询参数（null 字段跳过）
    pub fn query_from<Q: Serialize + ?Sized>(mut self, params: &Q) -> Result<Self, ClientError> {
        match serde_json::to_value(params)? {
            Value::Object(map) => {
                for (key, value) in map {
                    match value {
                        Value::Null => {}
                        Value::String(s) => self.query.push((key, s)),
                        other => self.query.push((key, other.to_string())),
                    }
                }
                Ok(self)
            }
            Value::Null => Ok(self),
            other => Err(ClientError::Internal(format!(
                "查询参数必须是对象，收到: {other}"
            ))),
        }
    }

    /// 设置 JSON 请求体
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// 将 ID 等动态片段编码为单个路径段
pub fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// 单次发送的结果
enum Attempt {
    Settled(Result<Value, ClientError>),
    Unauthorized,
}

/// 带鉴权与响应分类的 HTTP 客户端，克隆后共享连接池与会话
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpInner>,
}

struct HttpInner {
    client: Client,
    base_url: String,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
}

impl HttpClient {
    pub fn new(
        config: &ApiConfig,
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()
            .map_err(|e| ClientError::Internal(format!("初始化 HTTP Client 失败: {e}")))?;

        Ok(Self {
            inner: Arc::new(HttpInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                session,
                notifier,
            }),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    /// 发送请求并把信封中的 `data` 解析为 `T`（缺失的 data 按 JSON null 处理）
    pub async fn send<T: DeserializeOwned>(&self, req: ApiRequest) -> Result<T, ClientError> {
        let data = self.execute(&req).await?;
        self.decode(&req, data)
    }

    /// 发送请求并丢弃响应数据
    pub async fn send_unit(&self, req: ApiRequest) -> Result<(), ClientError> {
        self.execute(&req).await.map(|_| ())
    }

    /// 不参与 401 刷新重放的发送，认证接口（登录/注册/刷新）使用，避免刷新递归
    pub async fn send_without_refresh<T: DeserializeOwned>(
        &self,
        req: ApiRequest,
    ) -> Result<T, ClientError> {
        let token = self.inner.session.token();
        let data = match self.attempt(&req, token.as_deref()).await {
            Attempt::Settled(result) => result?,
            Attempt::Unauthorized => return Err(self.reject(ClientError::SessionExpired)),
        };
        self.decode(&req, data)
    }

    fn decode<T: DeserializeOwned>(&self, req: &ApiRequest, data: Value) -> Result<T, ClientError> {
        serde_json::from_value(data).map_err(|e| {
            self.reject(ClientError::Json(format!(
                "{} {} 响应数据解析失败: {e}",
                req.method(),
                req.path()
            )))
        })
    }

    async fn execute(&self, req: &ApiRequest) -> Result<Value, ClientError> {
        let mut replayed = false;
        loop {
            let token = self.inner.session.token();
            match self.attempt(req, token.as_deref()).await {
                Attempt::Settled(result) => return result,
                Attempt::Unauthorized => {
                    if !replayed
                        && self
                            .inner
                            .session
                            .refresh_if_stale(self, token.as_deref())
                            .await
                    {
                        debug!(method = %req.method, path = %req.path, "Token 已刷新，重放原请求");
                        replayed = true;
                        continue;
                    }
                    return Err(self.reject(ClientError::SessionExpired));
                }
            }
        }
    }

    /// 发送一次并分类响应；401 交给调用方决定是否刷新
    async fn attempt(&self, req: &ApiRequest, token: Option<&str>) -> Attempt {
        let resp = match self.dispatch(req, token).await {
            Ok(resp) => resp,
            Err(e) => return Attempt::Settled(Err(self.reject(ClientError::from(e)))),
        };

        let status = resp.status();
        if status.is_success() {
            Attempt::Settled(self.read_envelope(req, resp).await)
        } else if status == StatusCode::UNAUTHORIZED {
            Attempt::Unauthorized
        } else {
            Attempt::Settled(Err(self.reject_status(status, resp).await))
        }
    }

    async fn dispatch(
        &self,
        req: &ApiRequest,
        token: Option<&str>,
    ) -> Result<Response, reqwest::Error> {
        let mut builder = self
            .inner
            .client
            .request(req.method.clone(), self.endpoint(&req.path));
        if !req.query.is_empty() {
            builder = builder.query(&req.query);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        debug!(method = %req.method, path = %req.path, authed = token.is_some(), "发送请求");
        builder.send().await
    }

    async fn read_envelope(&self, req: &ApiRequest, resp: Response) -> Result<Value, ClientError> {
        let envelope: Envelope = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                return Err(self.reject(ClientError::Json(format!(
                    "{} {} 响应不是合法信封: {e}",
                    req.method, req.path
                ))));
            }
        };

        if envelope.code.is_success() {
            return Ok(envelope.data.unwrap_or(Value::Null));
        }

        let expired = envelope.code.is_session_expired();
        let err = self.reject(ClientError::Business {
            code: envelope.code,
            msg: envelope.msg,
        });
        if expired {
            warn!("业务码提示登录失效，强制退出登录");
            self.inner.session.logout();
        }
        Err(err)
    }

    async fn reject_status(&self, status: StatusCode, resp: Response) -> ClientError {
        let err = match status {
            StatusCode::FORBIDDEN => ClientError::Forbidden,
            StatusCode::NOT_FOUND => ClientError::NotFound,
            StatusCode::INTERNAL_SERVER_ERROR => ClientError::Server,
            other => {
                let message = resp
                    .json::<Value>()
                    .await
                    .ok()
                    .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| MSG_REQUEST_FAILED.to_string());
                ClientError::Status {
                    status: other.as_u16(),
                    message,
                }
            }
        };
        let err = self.reject(err);
        if matches!(err, ClientError::Forbidden) {
            self.inner.session.navigate(LOGIN_PATH);
        }
        err
    }

    /// 记录日志并发出用户提示，原样返回错误
    fn reject(&self, err: ClientError) -> ClientError {
        warn!("请求失败: {}", err);
        self.inner.notifier.error(&err.user_message());
        err
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.inner.base_url)
            .field("session", &self.inner.session)
            .finish()
    }
}

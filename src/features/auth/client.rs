use std::future::Future;

use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;
use crate::http::{ApiRequest, HttpClient};

use super::models::{AuthResponse, LoginRequest, RefreshTokenRequest, RegisterRequest};

/// 认证后端：会话存储通过它完成登录、注册与 Token 刷新
pub trait AuthGateway: Send + Sync {
    fn login(
        &self,
        credentials: &LoginRequest,
    ) -> impl Future<Output = Result<AuthResponse, ClientError>> + Send;

    fn register(
        &self,
        data: &RegisterRequest,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<AuthResponse, ClientError>> + Send;
}

/// `/auth/*` 接口。均不走 401 刷新重放。
#[derive(Debug, Clone, Copy)]
pub struct AuthApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AuthApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ClientError> {
        debug!(username = %credentials.username, "调用登录接口");
        let req = ApiRequest::post("/auth/login").json(credentials)?;
        self.http.send_without_refresh(req).await
    }

    /// 注册成功时后端同样返回认证信息，这里原样交给调用方
    pub async fn register(&self, data: &RegisterRequest) -> Result<Value, ClientError> {
        debug!(username = %data.username, "调用注册接口");
        let req = ApiRequest::post("/auth/register").json(data)?;
        self.http.send_without_refresh(req).await
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ClientError> {
        let req = ApiRequest::post("/auth/refresh").json(&RefreshTokenRequest { refresh_token })?;
        self.http.send_without_refresh(req).await
    }
}

impl HttpClient {
    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi::new(self)
    }
}

impl AuthGateway for HttpClient {
    async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.auth().login(credentials).await
    }

    async fn register(&self, data: &RegisterRequest) -> Result<(), ClientError> {
        self.auth().register(data).await.map(|_| ())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<AuthResponse, ClientError> {
        self.auth().refresh(refresh_token).await
    }
}

use thiserror::Error;

use crate::http::BusinessCode;

/// 面向用户的通用失败提示
pub const MSG_REQUEST_FAILED: &str = "请求失败";
pub const MSG_SESSION_EXPIRED: &str = "登录已过期，请重新登录";
pub const MSG_FORBIDDEN: &str = "没有权限访问";
pub const MSG_NOT_FOUND: &str = "请求的资源不存在";
pub const MSG_SERVER_ERROR: &str = "服务器内部错误";
pub const MSG_NETWORK: &str = "网络连接失败，请检查网络";
pub const MSG_DECODE: &str = "响应解析失败";

/// 客户端统一错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 业务错误：HTTP 200 但信封 code 不是成功码
    #[error("业务错误 [{code}]: {}", .msg.as_deref().unwrap_or(MSG_REQUEST_FAILED))]
    Business {
        code: BusinessCode,
        msg: Option<String>,
    },

    /// 登录态失效（401 且刷新失败）
    #[error("登录已过期")]
    SessionExpired,

    /// 禁止访问（403）
    #[error("禁止访问")]
    Forbidden,

    /// 资源不存在（404）
    #[error("资源不存在")]
    NotFound,

    /// 服务端内部错误（500）
    #[error("服务器内部错误")]
    Server,

    /// 其它非成功 HTTP 状态
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// 网络请求错误（无响应）
    #[error("网络错误: {0}")]
    Network(String),

    /// 请求超时
    #[error("请求超时: {0}")]
    Timeout(String),

    /// JSON 解析错误
    #[error("JSON 解析错误: {0}")]
    Json(String),

    /// 会话持久化错误
    #[error("会话存储错误: {0}")]
    Storage(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 导航错误（非法地址 / 重定向过多）
    #[error("导航错误: {0}")]
    Navigation(String),

    /// 内部错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ClientError {
    /// 展示给用户的提示文案。
    ///
    /// 业务错误透传服务端 `msg`，其余按错误类别给出固定文案。
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Business { msg, .. } => msg
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(MSG_REQUEST_FAILED)
                .to_string(),
            ClientError::SessionExpired => MSG_SESSION_EXPIRED.to_string(),
            ClientError::Forbidden => MSG_FORBIDDEN.to_string(),
            ClientError::NotFound => MSG_NOT_FOUND.to_string(),
            ClientError::Server => MSG_SERVER_ERROR.to_string(),
            ClientError::Status { message, .. } => message.clone(),
            ClientError::Network(_) | ClientError::Timeout(_) => MSG_NETWORK.to_string(),
            ClientError::Json(_) => MSG_DECODE.to_string(),
            ClientError::Storage(_)
            | ClientError::Config(_)
            | ClientError::Navigation(_)
            | ClientError::Internal(_) => self.to_string(),
        }
    }

    /// 调用方未拿到任何响应（连接失败或超时）
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ClientError::Network(_) | ClientError::Timeout(_))
    }
}

// =============== Error conversions for common external errors ===============

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err.to_string())
        } else if err.is_decode() {
            ClientError::Json(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Json(err.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::Storage(err.to_string())
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quick_client() -> reqwest::Client {
        reqwest::Client::builder()
            .timeout(Duration::from_millis(150))
            .build()
            .expect("build reqwest client")
    }

    #[tokio::test]
    async fn silent_peer_maps_to_timeout() {
        // 监听但从不 accept：连接停在 backlog 中，请求永远等不到响应
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let err: ClientError = quick_client()
            .get(format!("http://{addr}/api/goods/spu/list"))
            .send()
            .await
            .expect_err("expected timeout")
            .into();
        assert!(matches!(err, ClientError::Timeout(_)), "got: {err:?}");
        assert!(err.is_connectivity());
        assert_eq!(err.user_message(), MSG_NETWORK);
        drop(listener);
    }

    #[tokio::test]
    async fn refused_connection_maps_to_network() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("local addr")
        };

        let err: ClientError = quick_client()
            .get(format!("http://{addr}/api/user/profile"))
            .send()
            .await
            .expect_err("expected connect error")
            .into();
        assert!(matches!(err, ClientError::Network(_)), "got: {err:?}");
        assert!(err.is_connectivity());
        assert_eq!(err.user_message(), MSG_NETWORK);
    }

    #[test]
    fn business_message_falls_back_when_blank() {
        let err = ClientError::Business {
            code: BusinessCode::Text("B0001".into()),
            msg: Some(String::new()),
        };
        assert_eq!(err.user_message(), MSG_REQUEST_FAILED);

        let err = ClientError::Business {
            code: BusinessCode::Text("B0001".into()),
            msg: Some("库存不足".into()),
        };
        assert_eq!(err.user_message(), "库存不足");
    }

    #[test]
    fn transport_errors_map_to_fixed_messages() {
        assert_eq!(ClientError::SessionExpired.user_message(), MSG_SESSION_EXPIRED);
        assert_eq!(ClientError::Forbidden.user_message(), MSG_FORBIDDEN);
        assert_eq!(ClientError::NotFound.user_message(), MSG_NOT_FOUND);
        assert_eq!(ClientError::Server.user_message(), MSG_SERVER_ERROR);
        assert_eq!(
            ClientError::Network("refused".into()).user_message(),
            MSG_NETWORK
        );
    }
}

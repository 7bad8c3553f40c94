/// 统一错误处理模块
pub mod error;

/// 配置模块
pub mod config;

/// 日志初始化
pub mod logging;

/// 用户提示通道
pub mod notify;

/// 会话存储与持久化
pub mod session;

/// 带鉴权的 HTTP 客户端
pub mod http;

/// 路由表与访问守卫
pub mod router;

/// 各业务域接口
pub mod features;

/// 应用上下文聚合
pub mod state;

// 导出常用类型供外部使用
pub use config::AppConfig;
pub use error::ClientError;
pub use http::{ApiRequest, HttpClient};
pub use router::{NavigationResult, Router};
pub use session::{Role, Session, SessionStore};
pub use state::AppState;

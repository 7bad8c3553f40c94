use std::sync::Arc;

use tracing::info;

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::features::auth::LoginRequest;
use crate::http::HttpClient;
use crate::notify::{LogNotifier, Notifier};
use crate::router::{NavigationResult, RouteTable, Router};
use crate::session::{FileSessionStorage, SessionStorage, SessionStore};

/// 聚合的客户端上下文：会话、HTTP 客户端与路由共享同一份会话状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: SessionStore,
    pub http: HttpClient,
    pub router: Arc<Router>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    /// 按配置构建：文件持久化 + 日志提示
    pub fn new(config: AppConfig) -> Result<Self, ClientError> {
        let storage: Arc<dyn SessionStorage> =
            Arc::new(FileSessionStorage::new(config.storage.dir_path()));
        Self::with_parts(config, storage, Arc::new(LogNotifier))
    }

    /// 指定持久化后端与提示通道（测试中使用内存实现）
    pub fn with_parts(
        config: AppConfig,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ClientError> {
        let session = SessionStore::restore(storage, config.storage.key.clone());
        let http = HttpClient::new(&config.api, session.clone(), notifier.clone())?;
        let router = Router::new(RouteTable::standard(), session.clone(), config.app.title.clone())
            .attach()?;

        info!(
            base_url = %http.base_url(),
            logged_in = session.is_logged_in(),
            "客户端上下文已就绪"
        );

        Ok(Self {
            config: Arc::new(config),
            session,
            http,
            router,
            notifier,
        })
    }

    /// 登录后进入 `redirect` 指定页面，缺省进入角色首页
    pub async fn login_and_enter(
        &self,
        credentials: &LoginRequest,
        redirect: Option<&str>,
    ) -> Result<NavigationResult, ClientError> {
        self.session.login(&self.http, credentials).await?;
        let target = match redirect {
            Some(r) if r.starts_with('/') && !r.starts_with("//") => r.to_string(),
            _ => self.session.snapshot().home_path().to_string(),
        };
        self.router.navigate(&target)
    }

    /// 退出登录，返回最终停留的页面
    pub fn logout(&self) -> Option<NavigationResult> {
        self.session.logout();
        self.router.current()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("http", &self.http)
            .field("router", &self.router)
            .finish()
    }
}

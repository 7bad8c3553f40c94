//! 站内导航：路由表匹配 + 基于会话的访问守卫。
//!
//! 每次导航按以下顺序处理，直到落在某个允许访问的页面：
//! 1. 静态重定向（`/`、`/customer`、`/admin`）
//! 2. 守卫裁决（公开 / 游客 / 需登录 + 角色）
//! 3. 角色首页不可达时清空会话并回到登录页
//!
//! 重定向次数超过 [`MAX_REDIRECTS`] 视为路由配置错误。

pub mod guard;
pub mod location;
pub mod routes;

use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::session::SessionStore;

pub use guard::{GuardDecision, evaluate};
pub use location::Location;
pub use routes::{MetaFlags, ResolvedRoute, RouteAccess, RouteMeta, RouteRecord, RouteTable};

/// 登录页路径
pub const LOGIN_PATH: &str = "/login";

/// 单次导航允许的最大重定向次数
pub const MAX_REDIRECTS: usize = 8;

/// 默认站点标题
pub const DEFAULT_APP_TITLE: &str = "拼团营销系统";

/// 导航能力，供会话存储与 HTTP 客户端在失效时跳转登录页
pub trait Navigator: Send + Sync {
    fn push(&self, target: &str);
}

/// 导航生命周期钩子（进度条、标题等），默认空实现
pub trait NavigationHooks: Send + Sync {
    fn before_each(&self, _to: &Location, _from: Option<&Location>) {}
    fn after_each(&self, _to: &Location) {}
    fn set_title(&self, _title: &str) {}
}

/// 仅写日志的钩子
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHooks;

impl NavigationHooks for LogHooks {
    fn before_each(&self, to: &Location, from: Option<&Location>) {
        debug!(to = %to, from = ?from.map(Location::full_path), "导航开始");
    }

    fn after_each(&self, to: &Location) {
        debug!(to = %to, "导航完成");
    }

    fn set_title(&self, title: &str) {
        debug!(title, "页面标题");
    }
}

/// `"<页面标题> - <站点标题>"`，页面无标题时仅站点标题
pub fn format_title(page_title: Option<&str>, app_title: &str) -> String {
    match page_title {
        Some(t) if !t.is_empty() => format!("{t} - {app_title}"),
        _ => app_title.to_string(),
    }
}

/// 一次导航的最终落点
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResult {
    pub location: Location,
    pub route_name: Option<&'static str>,
    pub params: Vec<(String, String)>,
    pub title: String,
    /// 发生过重定向时，最初请求的地址
    pub redirected_from: Option<String>,
}

impl NavigationResult {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

pub struct Router {
    table: RouteTable,
    session: SessionStore,
    hooks: Arc<dyn NavigationHooks>,
    app_title: String,
    current: RwLock<Option<NavigationResult>>,
}

impl Router {
    pub fn new(table: RouteTable, session: SessionStore, app_title: impl Into<String>) -> Self {
        Self {
            table,
            session,
            hooks: Arc::new(LogHooks),
            app_title: app_title.into(),
            current: RwLock::new(None),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn NavigationHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// 包装为共享句柄并注册为会话的导航器
    pub fn attach(self) -> Result<Arc<Self>, ClientError> {
        let router = Arc::new(self);
        let navigator: Arc<dyn Navigator> = router.clone();
        router.session.bind_navigator(Arc::downgrade(&navigator))?;
        Ok(router)
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn current(&self) -> Option<NavigationResult> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// 当前页面标题；尚未导航时为站点标题
    pub fn title(&self) -> String {
        self.current()
            .map(|c| c.title)
            .unwrap_or_else(|| self.app_title.clone())
    }

    /// 导航到 `target`，返回经过重定向与守卫后的最终落点
    pub fn navigate(&self, target: &str) -> Result<NavigationResult, ClientError> {
        let requested = Location::parse(target)?;
        let from = self.current().map(|c| c.location);
        self.hooks.before_each(&requested, from.as_ref());

        let result = self.resolve_with_guard(requested);
        match &result {
            Ok(done) => {
                self.hooks.set_title(&done.title);
                self.hooks.after_each(&done.location);
                self.set_current(done.clone());
            }
            Err(e) => warn!("导航失败: {}", e),
        }
        result
    }

    fn resolve_with_guard(&self, requested: Location) -> Result<NavigationResult, ClientError> {
        let original = requested.full_path();
        let mut location = requested;
        let mut hops = 0usize;

        loop {
            let resolved = self.table.resolve(&location.path);
            let next = match resolved.record.redirect {
                Some(to) => Location::new(to),
                None => {
                    let session = self.session.snapshot();
                    match evaluate(&location, resolved.record.meta.access, &session) {
                        GuardDecision::Allow => {
                            return Ok(NavigationResult {
                                title: format_title(resolved.record.meta.title, &self.app_title),
                                route_name: resolved.record.name,
                                params: resolved.params,
                                redirected_from: (hops > 0).then_some(original),
                                location,
                            });
                        }
                        GuardDecision::Redirect(next) => next,
                        GuardDecision::ForceLogout => {
                            warn!(path = %location.path, "角色首页不可达，会话状态异常，强制退出登录");
                            self.session.clear();
                            Location::new(LOGIN_PATH)
                        }
                    }
                }
            };

            hops += 1;
            if hops > MAX_REDIRECTS {
                return Err(ClientError::Navigation(format!(
                    "导航 {original} 重定向次数过多"
                )));
            }
            debug!(from = %location, to = %next, "路由重定向");
            location = next;
        }
    }

    fn set_current(&self, result: NavigationResult) {
        info!(path = %result.location, title = %result.title, "已进入页面");
        match self.current.write() {
            Ok(mut guard) => *guard = Some(result),
            Err(poisoned) => *poisoned.into_inner() = Some(result),
        }
    }
}

impl Navigator for Router {
    fn push(&self, target: &str) {
        if let Err(e) = self.navigate(target) {
            warn!("跳转 {} 失败: {}", target, e);
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("app_title", &self.app_title)
            .field("current", &self.current().map(|c| c.location.full_path()))
            .finish()
    }
}

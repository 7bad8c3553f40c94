use std::sync::{Arc, RwLock, Weak};

use once_cell::sync::OnceCell;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::features::auth::client::AuthGateway;
use crate::features::auth::models::{LoginRequest, RegisterRequest};
use crate::router::{LOGIN_PATH, Navigator};

use super::models::{Role, Session, UserInfo, UserInfoPatch};
use super::storage::SessionStorage;

/// 会话变更事件
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// 登录成功
    LoggedIn { user_id: String, role: Role },
    /// Token 刷新成功
    Refreshed,
    /// 会话被清空（主动退出或刷新失败）
    LoggedOut,
}

/// 会话存储：持有 Token 与用户资料，并负责持久化。
///
/// 句柄可廉价克隆，所有克隆共享同一份状态。
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    state: RwLock<Session>,
    storage: Arc<dyn SessionStorage>,
    storage_key: String,
    /// 串行化刷新请求，同一时刻最多一个刷新在途
    refresh_lock: Mutex<()>,
    navigator: OnceCell<Weak<dyn Navigator>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    /// 创建空会话（不读取持久化数据）
    pub fn new(storage: Arc<dyn SessionStorage>, storage_key: impl Into<String>) -> Self {
        Self::with_session(storage, storage_key.into(), Session::default())
    }

    /// 从持久化存储恢复会话；数据缺失、损坏或不一致时视为未登录
    pub fn restore(storage: Arc<dyn SessionStorage>, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let session = match storage.load(&storage_key) {
            Ok(Some(session)) if session.is_consistent() => {
                debug!(logged_in = session.is_logged_in(), "会话已从存储恢复");
                session
            }
            Ok(Some(_)) => {
                warn!("持久化会话的 Token、Refresh Token 与用户资料不一致，已丢弃");
                if let Err(e) = storage.remove(&storage_key) {
                    warn!("清理不一致会话失败: {}", e);
                }
                Session::default()
            }
            Ok(None) => Session::default(),
            Err(e) => {
                warn!("读取持久化会话失败（按未登录处理）: {}", e);
                Session::default()
            }
        };
        Self::with_session(storage, storage_key, session)
    }

    fn with_session(
        storage: Arc<dyn SessionStorage>,
        storage_key: String,
        session: Session,
    ) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(SessionInner {
                state: RwLock::new(session),
                storage,
                storage_key,
                refresh_lock: Mutex::new(()),
                navigator: OnceCell::new(),
                events,
            }),
        }
    }

    /// 绑定导航器，`logout` 时用于跳转登录页。只能绑定一次。
    pub fn bind_navigator(&self, navigator: Weak<dyn Navigator>) -> Result<(), ClientError> {
        self.inner
            .navigator
            .set(navigator)
            .map_err(|_| ClientError::Internal("导航器已经绑定".to_string()))
    }

    /// 请求跳转；未绑定导航器或导航器已释放时仅记录日志
    pub fn navigate(&self, target: &str) {
        match self.inner.navigator.get().and_then(Weak::upgrade) {
            Some(nav) => nav.push(target),
            None => debug!("未绑定导航器，忽略跳转: {}", target),
        }
    }

    /// 订阅会话事件
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    // =============== getters ===============

    /// 当前会话快照
    pub fn snapshot(&self) -> Session {
        self.read(|s| s.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.read(|s| s.token.clone())
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read(|s| s.refresh_token.clone())
    }

    pub fn user_info(&self) -> Option<UserInfo> {
        self.read(|s| s.user_info.clone())
    }

    pub fn is_logged_in(&self) -> bool {
        self.read(Session::is_logged_in)
    }

    pub fn role(&self) -> Option<Role> {
        self.read(Session::role)
    }

    pub fn user_id(&self) -> Option<String> {
        self.read(|s| s.user_id().map(str::to_string))
    }

    pub fn nickname(&self) -> String {
        self.read(|s| s.nickname().to_string())
    }

    pub fn avatar(&self) -> Option<String> {
        self.read(|s| s.avatar().map(str::to_string))
    }

    // =============== actions ===============

    /// 登录：成功时写入 Token 与资料；失败时不改动会话
    pub async fn login<A: AuthGateway>(
        &self,
        auth: &A,
        credentials: &LoginRequest,
    ) -> Result<UserInfo, ClientError> {
        let resp = auth.login(credentials).await?;
        let session = Session::from_auth(&resp);
        let info = UserInfo::from(&resp);
        self.replace(session);
        info!(user_id = %info.user_id, role = %info.role, "登录成功");
        let _ = self.inner.events.send(SessionEvent::LoggedIn {
            user_id: info.user_id.clone(),
            role: info.role,
        });
        Ok(info)
    }

    /// 注册：不改动会话
    pub async fn register<A: AuthGateway>(
        &self,
        auth: &A,
        data: &RegisterRequest,
    ) -> Result<(), ClientError> {
        auth.register(data).await?;
        info!(username = %data.username, "注册成功");
        Ok(())
    }

    /// 刷新 Token。无 Refresh Token 或刷新失败时退出登录并返回 false。
    pub async fn refresh_access_token<A: AuthGateway>(&self, auth: &A) -> bool {
        let _guard = self.inner.refresh_lock.lock().await;
        self.refresh_locked(auth).await
    }

    /// 在 401 重试路径上使用：`stale` 为发起请求时携带的 Token。
    ///
    /// 拿到刷新锁后若发现 Token 已被并发的刷新替换，直接复用新 Token，不再发起刷新。
    pub async fn refresh_if_stale<A: AuthGateway>(&self, auth: &A, stale: Option<&str>) -> bool {
        let _guard = self.inner.refresh_lock.lock().await;
        let already_replaced = match (stale, self.token()) {
            (Some(stale), Some(current)) => stale != current,
            // 匿名发出的请求，期间已有登录或刷新写入了 Token
            (None, Some(_)) => true,
            (_, None) => false,
        };
        if already_replaced {
            debug!("Token 已被并发刷新，跳过本次刷新");
            return true;
        }
        self.refresh_locked(auth).await
    }

    async fn refresh_locked<A: AuthGateway>(&self, auth: &A) -> bool {
        let Some(refresh_token) = self.refresh_token() else {
            debug!("没有 Refresh Token，无法刷新");
            self.logout();
            return false;
        };

        match auth.refresh(&refresh_token).await {
            Ok(resp) => {
                self.replace(Session::from_auth(&resp));
                info!("Token 刷新成功");
                let _ = self.inner.events.send(SessionEvent::Refreshed);
                true
            }
            Err(e) => {
                warn!("Token 刷新失败: {}", e);
                self.logout();
                false
            }
        }
    }

    /// 退出登录：清空会话并跳转登录页
    pub fn logout(&self) {
        self.clear();
        self.navigate(LOGIN_PATH);
    }

    /// 清空会话与持久化数据，不触发跳转
    pub fn clear(&self) {
        let was_logged_in = self.is_logged_in();
        self.replace(Session::default());
        if was_logged_in {
            info!("会话已清空");
        }
        let _ = self.inner.events.send(SessionEvent::LoggedOut);
    }

    /// 合并更新用户资料；未登录时忽略
    pub fn set_user_info(&self, patch: UserInfoPatch) {
        let updated = self.write(|s| {
            let Some(info) = s.user_info.as_mut() else {
                return None;
            };
            if let Some(v) = patch.username {
                info.username = v;
            }
            if let Some(v) = patch.nickname {
                info.nickname = Some(v);
            }
            if let Some(v) = patch.avatar {
                info.avatar = Some(v);
            }
            Some(s.clone())
        });
        match updated {
            Some(session) => self.persist(&session),
            None => debug!("未登录，忽略用户资料更新"),
        }
    }

    // =============== internals ===============

    fn replace(&self, session: Session) {
        self.write(|s| *s = session.clone());
        self.persist(&session);
    }

    fn persist(&self, session: &Session) {
        let key = &self.inner.storage_key;
        let result = if session.is_empty() {
            self.inner.storage.remove(key)
        } else {
            self.inner.storage.save(key, session)
        };
        if let Err(e) = result {
            warn!("会话持久化失败: {}", e);
        }
    }

    fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        match self.inner.state.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    fn write<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        match self.inner.state.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("storage_key", &self.inner.storage_key)
            .field("logged_in", &self.is_logged_in())
            .finish()
    }
}

pub mod models;
pub mod storage;
pub mod store;

/// 默认持久化键名
pub const DEFAULT_STORAGE_KEY: &str = "group-buy-user";

pub use models::{Role, Session, UserInfo, UserInfoPatch};
pub use storage::{FileSessionStorage, MemorySessionStorage, SessionStorage};
pub use store::{SessionEvent, SessionStore};

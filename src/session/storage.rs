use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use uuid::Uuid;

use crate::error::ClientError;

use super::models::Session;

/// 会话持久化后端，按键读写序列化后的会话
pub trait SessionStorage: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<Session>, ClientError>;
    fn save(&self, key: &str, session: &Session) -> Result<(), ClientError>;
    fn remove(&self, key: &str) -> Result<(), ClientError>;
}

fn validate_key(key: &str) -> Result<(), ClientError> {
    let ok = !key.is_empty()
        && key.len() <= 128
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == b'.')
        && !key.starts_with('.');
    if ok {
        Ok(())
    } else {
        Err(ClientError::Storage(format!("非法的存储键: {key:?}")))
    }
}

/// 基于本地文件的持久化：`<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf, ClientError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self, key: &str) -> Result<Option<Session>, ClientError> {
        let path = self.path_for(key)?;
        let raw = match std::fs::read_to_string(&path) {
            Ok(v) => v,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let session = serde_json::from_str::<Session>(&raw)?;
        Ok(Some(session))
    }

    fn save(&self, key: &str, session: &Session) -> Result<(), ClientError> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir)?;
        let body = serde_json::to_vec_pretty(session)?;
        // 先写临时文件再 rename，避免进程中断留下半截文件
        let tmp = self
            .dir
            .join(format!("{key}.{}.tmp", Uuid::new_v4().simple()));
        std::fs::write(&tmp, body)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 进程内持久化，保存序列化后的字符串（行为等同浏览器 localStorage）
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取原始字符串
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    /// 直接写入原始字符串（用于模拟损坏数据）
    pub fn put_raw(&self, key: &str, raw: impl Into<String>) {
        if let Ok(mut map) = self.entries.lock() {
            map.insert(key.to_string(), raw.into());
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self, key: &str) -> Result<Option<Session>, ClientError> {
        match self.raw(key) {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, session: &Session) -> Result<(), ClientError> {
        let raw = serde_json::to_string(session)?;
        let mut map = self
            .entries
            .lock()
            .map_err(|_| ClientError::Storage("存储锁已损坏".to_string()))?;
        map.insert(key.to_string(), raw);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ClientError> {
        let mut map = self
            .entries
            .lock()
            .map_err(|_| ClientError::Storage("存储锁已损坏".to_string()))?;
        map.remove(key);
        Ok(())
    }
}

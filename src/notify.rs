//! 面向用户的错误提示通道。
//!
//! HTTP 客户端在每条失败路径上都会且只会发出一条提示，由具体实现决定如何展示
//! （写日志、打印到终端、或在测试中收集）。

use std::sync::Mutex;

/// 用户提示接收端
pub trait Notifier: Send + Sync {
    /// 错误提示
    fn error(&self, message: &str);

    /// 成功提示，默认忽略
    fn success(&self, _message: &str) {}
}

/// 写入 tracing 日志的提示实现
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(target: "group_buy_client::notify", "{}", message);
    }

    fn success(&self, message: &str) {
        tracing::info!(target: "group_buy_client::notify", "{}", message);
    }
}

/// 在内存中收集提示，便于断言
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    errors: Mutex<Vec<String>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已收到的错误提示（按时间顺序）
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut v) = self.errors.lock() {
            v.clear();
        }
    }
}

impl Notifier for MemoryNotifier {
    fn error(&self, message: &str) {
        if let Ok(mut v) = self.errors.lock() {
            v.push(message.to_string());
        }
    }
}

use reqwest::Url;

use crate::error::ClientError;

const PARSE_BASE: &str = "http://localhost";

/// 导航目标：路径 + 有序查询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl Location {
    /// 解析站内地址，如 `/login?redirect=%2Fcustomer%2Fhome`
    pub fn parse(target: &str) -> Result<Self, ClientError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ClientError::Navigation("导航目标为空".to_string()));
        }
        if !target.starts_with('/') || target.starts_with("//") {
            return Err(ClientError::Navigation(format!(
                "导航目标必须以 / 开头: {target}"
            )));
        }

        let base = Url::parse(PARSE_BASE)
            .map_err(|e| ClientError::Internal(format!("解析基准地址失败: {e}")))?;
        let url = base
            .join(target)
            .map_err(|e| ClientError::Navigation(format!("无法解析导航目标 {target}: {e}")))?;

        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Ok(Self {
            path: normalize_path(url.path()),
            query,
        })
    }

    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(&path.into()),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 路径 + 编码后的查询串
    pub fn full_path(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let Ok(mut url) = Url::parse(PARSE_BASE) else {
            return self.path.clone();
        };
        url.query_pairs_mut()
            .extend_pairs(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        match url.query() {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// 去掉末尾多余的 `/`（根路径除外）
fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

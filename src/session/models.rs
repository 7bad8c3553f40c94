use serde::{Deserialize, Serialize};

use crate::features::auth::models::AuthResponse;

/// 未设置昵称时的展示名
pub const DEFAULT_NICKNAME: &str = "用户";

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// C 端用户
    User,
    /// 管理员
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// 角色首页
    pub fn home_path(self) -> &'static str {
        match self {
            Role::Admin => "/admin/dashboard",
            Role::User => "/customer/home",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(format!("未知角色: {other}")),
        }
    }
}

/// 登录用户资料
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub username: String,
    #[serde(default)]
    pub nickname: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub avatar: Option<String>,
}

impl From<&AuthResponse> for UserInfo {
    fn from(resp: &AuthResponse) -> Self {
        Self {
            user_id: resp.user_id.clone(),
            username: resp.username.clone(),
            nickname: resp.nickname.clone(),
            role: resp.role,
            avatar: resp.avatar.clone(),
        }
    }
}

/// 用户资料的局部更新，未给出的字段保持不变
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfoPatch {
    pub username: Option<String>,
    pub nickname: Option<String>,
    pub avatar: Option<String>,
}

/// 会话快照，亦是持久化的数据形态 `{token, refreshToken, userInfo}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub user_info: Option<UserInfo>,
}

impl Session {
    /// 用认证响应构造已登录会话
    pub fn from_auth(resp: &AuthResponse) -> Self {
        Self {
            token: Some(resp.access_token.clone()),
            refresh_token: Some(resp.refresh_token.clone()),
            user_info: Some(UserInfo::from(resp)),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.refresh_token.is_none() && self.user_info.is_none()
    }

    /// 登录态与用户资料必须同时存在或同时缺失；未登录时不得残留刷新 Token
    pub fn is_consistent(&self) -> bool {
        if self.token.is_none() && self.refresh_token.is_some() {
            return false;
        }
        self.token.is_some() == self.user_info.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user_info.as_ref().map(|u| u.role)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_info.as_ref().map(|u| u.user_id.as_str())
    }

    pub fn nickname(&self) -> &str {
        self.user_info
            .as_ref()
            .and_then(|u| u.nickname.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_NICKNAME)
    }

    pub fn avatar(&self) -> Option<&str> {
        self.user_info.as_ref().and_then(|u| u.avatar.as_deref())
    }

    /// 登录后应进入的首页
    pub fn home_path(&self) -> &'static str {
        match self.role() {
            Some(Role::Admin) => Role::Admin.home_path(),
            _ => Role::User.home_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_info() -> UserInfo {
        UserInfo {
            user_id: "u-1".into(),
            username: "root".into(),
            nickname: None,
            role: Role::Admin,
            avatar: None,
        }
    }

    #[test]
    fn session_serializes_with_persisted_key_names() {
        let session = Session {
            token: Some("t".into()),
            refresh_token: Some("r".into()),
            user_info: Some(admin_info()),
        };
        let json = serde_json::to_value(&session).expect("serialize");
        assert_eq!(json["token"], "t");
        assert_eq!(json["refreshToken"], "r");
        assert_eq!(json["userInfo"]["userId"], "u-1");
        assert_eq!(json["userInfo"]["role"], "ADMIN");
    }

    #[test]
    fn getters_fall_back_when_logged_out() {
        let session = Session::default();
        assert!(!session.is_logged_in());
        assert!(session.is_consistent());
        assert_eq!(session.role(), None);
        assert_eq!(session.nickname(), DEFAULT_NICKNAME);
        assert_eq!(session.home_path(), "/customer/home");
    }

    #[test]
    fn token_without_profile_is_inconsistent() {
        let session = Session {
            token: Some("t".into()),
            ..Session::default()
        };
        assert!(!session.is_consistent());
    }

    #[test]
    fn refresh_token_without_access_token_is_inconsistent() {
        let session = Session {
            refresh_token: Some("r".into()),
            ..Session::default()
        };
        assert!(!session.is_consistent());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!(" USER ".parse::<Role>(), Ok(Role::User));
        assert!("GUEST".parse::<Role>().is_err());
    }
}

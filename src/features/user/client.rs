use crate::error::ClientError;
use crate::features::page::PageQuery;
use crate::http::{ApiRequest, HttpClient};
use crate::session::UserInfoPatch;

use super::models::{UserOrder, UserProfile};

/// 用户中心
#[derive(Debug, Clone, Copy)]
pub struct UserApi<'a> {
    http: &'a HttpClient,
}

impl<'a> UserApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        self.http.send(ApiRequest::get("/user/profile")).await
    }

    /// 拉取资料并同步到本地会话（昵称、头像）
    pub async fn sync_profile(&self) -> Result<UserProfile, ClientError> {
        let profile = self.profile().await?;
        self.http.session().set_user_info(UserInfoPatch {
            username: Some(profile.username.clone()),
            nickname: profile.nickname.clone(),
            avatar: profile.avatar.clone(),
        });
        Ok(profile)
    }

    pub async fn orders(&self, page: PageQuery) -> Result<Vec<UserOrder>, ClientError> {
        let req = ApiRequest::get("/user/orders").query_from(&page)?;
        self.http.send(req).await
    }
}

impl HttpClient {
    pub fn user(&self) -> UserApi<'_> {
        UserApi::new(self)
    }
}

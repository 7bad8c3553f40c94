//! 管理后台接口。后台实体字段多且变动频繁，统一以 JSON 值透传。

use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;
use crate::http::{ApiRequest, HttpClient, encode_segment};

/// 状态变更请求体 `{status}`
#[derive(Debug, Serialize)]
struct StatusBody<S> {
    status: S,
}

#[derive(Debug, Clone, Copy)]
pub struct AdminApi<'a> {
    http: &'a HttpClient,
}

impl<'a> AdminApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    async fn get<Q: Serialize + ?Sized>(&self, path: &str, params: &Q) -> Result<Value, ClientError> {
        let req = ApiRequest::get(path).query_from(params)?;
        self.http.send(req).await
    }

    async fn fetch(&self, path: String) -> Result<Value, ClientError> {
        self.http.send(ApiRequest::get(path)).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: String, body: &B) -> Result<Value, ClientError> {
        let req = ApiRequest::post(path).json(body)?;
        self.http.send(req).await
    }

    async fn put<B: Serialize + ?Sized>(&self, path: String, body: &B) -> Result<Value, ClientError> {
        let req = ApiRequest::put(path).json(body)?;
        self.http.send(req).await
    }

    async fn post_empty(&self, path: String) -> Result<Value, ClientError> {
        self.http.send(ApiRequest::post(path)).await
    }

    // =============== 仪表盘 ===============

    pub async fn dashboard_stats(&self) -> Result<Value, ClientError> {
        self.fetch("/admin/dashboard/stats".to_string()).await
    }

    // =============== 活动 ===============

    pub async fn activities<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/activities", params).await
    }

    pub async fn activity(&self, activity_id: &str) -> Result<Value, ClientError> {
        self.fetch(format!("/admin/activities/{}", encode_segment(activity_id)))
            .await
    }

    pub async fn create_activity<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.post("/admin/activities".to_string(), data).await
    }

    pub async fn update_activity<B: Serialize + ?Sized>(
        &self,
        activity_id: &str,
        data: &B,
    ) -> Result<Value, ClientError> {
        self.put(format!("/admin/activities/{}", encode_segment(activity_id)), data)
            .await
    }

    pub async fn update_activity_status<S: Serialize>(
        &self,
        activity_id: &str,
        status: S,
    ) -> Result<Value, ClientError> {
        self.put(
            format!("/admin/activities/{}/status", encode_segment(activity_id)),
            &StatusBody { status },
        )
        .await
    }

    // =============== 折扣 ===============

    pub async fn discounts(&self) -> Result<Value, ClientError> {
        self.fetch("/admin/activities/discounts".to_string()).await
    }

    pub async fn discounts_page<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/activities/discounts/page", params).await
    }

    pub async fn create_discount<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.post("/admin/activities/discount".to_string(), data).await
    }

    // =============== SPU 选择器 ===============

    pub async fn spu_options(&self) -> Result<Value, ClientError> {
        self.fetch("/admin/activities/spu/options".to_string()).await
    }

    pub async fn spu_page<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/activities/spu/page", params).await
    }

    // =============== 商品 ===============

    pub async fn spu_list<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/goods/spu", params).await
    }

    /// SPU 详情，包含其下 SKU 列表
    pub async fn spu(&self, spu_id: &str) -> Result<Value, ClientError> {
        self.fetch(format!("/admin/goods/spu/{}", encode_segment(spu_id)))
            .await
    }

    pub async fn create_spu<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.post("/admin/goods/spu".to_string(), data).await
    }

    pub async fn update_spu<B: Serialize + ?Sized>(
        &self,
        spu_id: &str,
        data: &B,
    ) -> Result<Value, ClientError> {
        self.put(format!("/admin/goods/spu/{}", encode_segment(spu_id)), data)
            .await
    }

    pub async fn on_sale_spu(&self, spu_id: &str) -> Result<Value, ClientError> {
        self.post_empty(format!("/admin/goods/spu/{}/on-sale", encode_segment(spu_id)))
            .await
    }

    pub async fn off_sale_spu(&self, spu_id: &str) -> Result<Value, ClientError> {
        self.post_empty(format!("/admin/goods/spu/{}/off-sale", encode_segment(spu_id)))
            .await
    }

    pub async fn create_sku<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.post("/admin/goods/sku".to_string(), data).await
    }

    pub async fn update_sku<B: Serialize + ?Sized>(
        &self,
        sku_id: &str,
        data: &B,
    ) -> Result<Value, ClientError> {
        self.put(format!("/admin/goods/sku/{}", encode_segment(sku_id)), data)
            .await
    }

    pub async fn add_sku_stock(&self, sku_id: &str, quantity: i64) -> Result<Value, ClientError> {
        let req = ApiRequest::post(format!("/admin/goods/sku/{}/add-stock", encode_segment(sku_id)))
            .query("quantity", quantity);
        self.http.send(req).await
    }

    // =============== 订单 ===============

    pub async fn orders<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/orders", params).await
    }

    pub async fn order(&self, order_id: &str) -> Result<Value, ClientError> {
        self.fetch(format!("/admin/orders/{}", encode_segment(order_id)))
            .await
    }

    // =============== 用户 ===============

    pub async fn users<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/users", params).await
    }

    pub async fn user(&self, user_id: &str) -> Result<Value, ClientError> {
        self.fetch(format!("/admin/users/{}", encode_segment(user_id)))
            .await
    }

    pub async fn update_user_status<S: Serialize>(
        &self,
        user_id: &str,
        status: S,
    ) -> Result<Value, ClientError> {
        self.put(
            format!("/admin/users/{}/status", encode_segment(user_id)),
            &StatusBody { status },
        )
        .await
    }

    pub async fn reset_user_password(&self, user_id: &str) -> Result<Value, ClientError> {
        self.post_empty(format!("/admin/users/{}/reset-password", encode_segment(user_id)))
            .await
    }

    pub async fn create_admin<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.post("/admin/users/admin".to_string(), data).await
    }

    // =============== 人群标签 ===============

    pub async fn tags<Q: Serialize + ?Sized>(&self, params: &Q) -> Result<Value, ClientError> {
        self.get("/admin/tags", params).await
    }

    pub async fn tag(&self, tag_id: &str) -> Result<Value, ClientError> {
        self.fetch(format!("/admin/tags/{}", encode_segment(tag_id)))
            .await
    }

    pub async fn create_tag<B: Serialize + ?Sized>(&self, data: &B) -> Result<Value, ClientError> {
        self.post("/admin/tags".to_string(), data).await
    }

    pub async fn update_tag<B: Serialize + ?Sized>(
        &self,
        tag_id: &str,
        data: &B,
    ) -> Result<Value, ClientError> {
        self.put(format!("/admin/tags/{}", encode_segment(tag_id)), data)
            .await
    }

    /// 触发标签人群计算
    pub async fn calculate_tag(&self, tag_id: &str) -> Result<Value, ClientError> {
        self.post_empty(format!("/admin/tags/{}/calculate", encode_segment(tag_id)))
            .await
    }

    // =============== 系统配置 ===============

    pub async fn all_configs(&self) -> Result<Value, ClientError> {
        self.fetch("/admin/config/all".to_string()).await
    }

    pub async fn update_config(&self, key: &str, value: &str) -> Result<Value, ClientError> {
        let req = ApiRequest::post("/admin/config/update")
            .query("key", key)
            .query("value", value);
        self.http.send(req).await
    }
}

impl HttpClient {
    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi::new(self)
    }
}

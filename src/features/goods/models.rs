use serde::{Deserialize, Serialize};

/// 商品列表查询条件，未设置的字段不会出现在查询串中
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpuListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpuSummary {
    pub spu_id: String,
    pub spu_name: String,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub min_original_price: Option<f64>,
    #[serde(default)]
    pub min_group_price: Option<f64>,
    #[serde(default)]
    pub has_activity: Option<bool>,
    #[serde(default)]
    pub activity_id: Option<String>,
}

/// 价格试算的渠道参数
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTrialResponse {
    pub sku_id: String,
    pub original_price: f64,
    /// 拼团价
    pub discount_price: f64,
    #[serde(default)]
    pub discount_desc: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub activity_name: Option<String>,
    #[serde(default)]
    pub hit_activity: bool,
}

impl PriceTrialResponse {
    /// 减免金额，不会为负
    pub fn deduction(&self) -> f64 {
        (self.original_price - self.discount_price).max(0.0)
    }
}

/// 进行中的拼团队伍
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub order_id: String,
    #[serde(default)]
    pub spu_id: Option<String>,
    #[serde(default)]
    pub spu_name: Option<String>,
    #[serde(default)]
    pub current_count: u32,
    #[serde(default)]
    pub target_count: u32,
    #[serde(default)]
    pub remaining_seconds: Option<i64>,
    #[serde(default)]
    pub leader_user_id: Option<String>,
    #[serde(default)]
    pub leader_nickname: Option<String>,
    #[serde(default)]
    pub leader_avatar: Option<String>,
}

impl TeamSummary {
    pub fn missing_members(&self) -> u32 {
        self.target_count.saturating_sub(self.current_count)
    }
}

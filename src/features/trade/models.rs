use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::features::goods::PriceTrialResponse;

/// 生成外部交易单号（锁单幂等键）
pub fn new_out_trade_no() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// 锁单（参与拼团）请求；`order_id` 为空表示开新团
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LockOrderRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub activity_id: String,
    pub sku_id: String,
    pub out_trade_no: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// HTTP / MQ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_mq: Option<String>,
    pub original_price: f64,
    pub deduction_price: f64,
    pub pay_price: f64,
}

impl LockOrderRequest {
    /// 由试算结果构造锁单请求，价格全部取自试算
    pub fn from_trial(
        trial: &PriceTrialResponse,
        order_id: Option<String>,
    ) -> Result<Self, ClientError> {
        let activity_id = trial
            .activity_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ClientError::Internal(format!("商品 {} 未命中拼团活动", trial.sku_id)))?;

        Ok(Self {
            order_id,
            activity_id,
            sku_id: trial.sku_id.clone(),
            out_trade_no: new_out_trade_no(),
            source: None,
            channel: None,
            notify_type: None,
            notify_url: None,
            notify_mq: None,
            original_price: trial.original_price,
            deduction_price: trial.deduction(),
            pay_price: trial.discount_price,
        })
    }

    pub fn with_channel(mut self, source: impl Into<String>, channel: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self.channel = Some(channel.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOrderResponse {
    pub trade_order_id: String,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub activity_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub goods_id: Option<String>,
    #[serde(default)]
    pub goods_name: Option<String>,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub deduction_price: Option<f64>,
    #[serde(default)]
    pub pay_price: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub out_trade_no: Option<String>,
    #[serde(default)]
    pub pay_time: Option<String>,
    #[serde(default)]
    pub settlement_time: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    pub trade_order_id: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial(activity: Option<&str>) -> PriceTrialResponse {
        PriceTrialResponse {
            sku_id: "SKU1".into(),
            original_price: 99.0,
            discount_price: 79.0,
            discount_desc: None,
            activity_id: activity.map(str::to_string),
            activity_name: None,
            hit_activity: activity.is_some(),
        }
    }

    #[test]
    fn lock_request_takes_prices_from_trial() {
        let req = LockOrderRequest::from_trial(&trial(Some("ACT1")), None).unwrap();
        assert_eq!(req.activity_id, "ACT1");
        assert_eq!(req.pay_price, 79.0);
        assert_eq!(req.deduction_price, 20.0);
        assert_eq!(req.out_trade_no.len(), 32);

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["skuId"], "SKU1");
        assert!(body.get("orderId").is_none());
    }

    #[test]
    fn lock_request_requires_activity() {
        assert!(LockOrderRequest::from_trial(&trial(None), None).is_err());
    }

    #[test]
    fn out_trade_numbers_are_unique() {
        assert_ne!(new_out_trade_no(), new_out_trade_no());
    }
}

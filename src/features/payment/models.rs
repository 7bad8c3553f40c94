use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub out_trade_no: String,
    pub amount: f64,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentQueryResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub trade_no: Option<String>,
    #[serde(default)]
    pub out_trade_no: Option<String>,
    #[serde(default)]
    pub trade_status: Option<String>,
    #[serde(default)]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub buyer_pay_amount: Option<f64>,
    #[serde(default)]
    pub error_msg: Option<String>,
}

impl PaymentQueryResponse {
    /// 支付宝交易成功或已结束
    pub fn is_paid(&self) -> bool {
        matches!(
            self.trade_status.as_deref(),
            Some("TRADE_SUCCESS") | Some("TRADE_FINISHED")
        )
    }
}

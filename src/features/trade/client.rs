use serde_json::Value;

use crate::error::ClientError;
use crate::http::{ApiRequest, HttpClient, encode_segment};

use super::models::{LockOrderRequest, RefundRequest, TradeOrderResponse};

/// 拼团交易：锁单、查单、退单与进度
#[derive(Debug, Clone, Copy)]
pub struct TradeApi<'a> {
    http: &'a HttpClient,
}

impl<'a> TradeApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn lock_order(
        &self,
        request: &LockOrderRequest,
    ) -> Result<TradeOrderResponse, ClientError> {
        let req = ApiRequest::post("/trade/lock").json(request)?;
        self.http.send(req).await
    }

    pub async fn get_trade_order(
        &self,
        trade_order_id: &str,
    ) -> Result<TradeOrderResponse, ClientError> {
        let req = ApiRequest::get(format!("/trade/{}", encode_segment(trade_order_id)));
        self.http.send(req).await
    }

    pub async fn refund(&self, trade_order_id: &str, reason: &str) -> Result<(), ClientError> {
        let body = RefundRequest {
            trade_order_id: trade_order_id.to_string(),
            reason: reason.to_string(),
        };
        let req = ApiRequest::post(format!("/trade/refund/{}", encode_segment(trade_order_id)))
            .json(&body)?;
        self.http.send_unit(req).await
    }

    pub async fn order_progress(&self, order_id: &str) -> Result<Value, ClientError> {
        let req = ApiRequest::get(format!("/trade/order/{}/progress", encode_segment(order_id)));
        self.http.send(req).await
    }
}

impl HttpClient {
    pub fn trade(&self) -> TradeApi<'_> {
        TradeApi::new(self)
    }
}

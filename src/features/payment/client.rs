use crate::error::ClientError;
use crate::http::{ApiRequest, HttpClient};

use super::models::{CreatePaymentRequest, PaymentQueryResponse};

#[derive(Debug, Clone, Copy)]
pub struct PaymentApi<'a> {
    http: &'a HttpClient,
}

impl<'a> PaymentApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// 创建支付，返回支付页面内容（表单或跳转地址）
    pub async fn create(&self, request: &CreatePaymentRequest) -> Result<String, ClientError> {
        let req = ApiRequest::post("/payment/create").json(request)?;
        self.http.send(req).await
    }

    pub async fn query(&self, out_trade_no: &str) -> Result<PaymentQueryResponse, ClientError> {
        let req = ApiRequest::get("/payment/query").query("outTradeNo", out_trade_no);
        self.http.send(req).await
    }
}

impl HttpClient {
    pub fn payment(&self) -> PaymentApi<'_> {
        PaymentApi::new(self)
    }
}

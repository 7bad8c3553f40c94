use serde_json::Value;

use crate::error::ClientError;
use crate::http::{ApiRequest, HttpClient, encode_segment};

use super::models::{PriceTrialResponse, SpuListQuery, SpuSummary, TeamSummary, TrialQuery};

/// C 端商品浏览与试算
#[derive(Debug, Clone, Copy)]
pub struct GoodsApi<'a> {
    http: &'a HttpClient,
}

impl<'a> GoodsApi<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    pub async fn spu_list(&self, query: &SpuListQuery) -> Result<Vec<SpuSummary>, ClientError> {
        let req = ApiRequest::get("/goods/spu/list").query_from(query)?;
        self.http.send(req).await
    }

    /// SPU 详情（含 SKU 列表），结构随后台演进，保持原样
    pub async fn spu_detail(&self, spu_id: &str) -> Result<Value, ClientError> {
        let req = ApiRequest::get(format!("/goods/spu/{}", encode_segment(spu_id)));
        self.http.send(req).await
    }

    pub async fn trial_price(
        &self,
        sku_id: &str,
        query: &TrialQuery,
    ) -> Result<PriceTrialResponse, ClientError> {
        let req = ApiRequest::get(format!("/goods/{}/trial", encode_segment(sku_id)))
            .query_from(query)?;
        self.http.send(req).await
    }

    pub async fn teams(&self, spu_id: &str) -> Result<Vec<TeamSummary>, ClientError> {
        let req = ApiRequest::get(format!("/goods/{}/teams", encode_segment(spu_id)));
        self.http.send(req).await
    }
}

impl HttpClient {
    pub fn goods(&self) -> GoodsApi<'_> {
        GoodsApi::new(self)
    }
}

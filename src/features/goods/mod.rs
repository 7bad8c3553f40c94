pub mod client;
pub mod models;

pub use client::GoodsApi;
pub use models::{PriceTrialResponse, SpuListQuery, SpuSummary, TeamSummary, TrialQuery};

pub mod client;
pub mod models;

pub use client::TradeApi;
pub use models::{LockOrderRequest, RefundRequest, TradeOrderResponse, new_out_trade_no};

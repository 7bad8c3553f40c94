pub mod client;
pub mod models;

pub use client::PaymentApi;
pub use models::{CreatePaymentRequest, PaymentQueryResponse};

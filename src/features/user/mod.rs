pub mod client;
pub mod models;

pub use client::UserApi;
pub use models::{UserOrder, UserProfile};

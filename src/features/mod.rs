pub mod admin;
pub mod auth;
pub mod goods;
pub mod page;
pub mod payment;
pub mod trade;
pub mod user;

pub use page::PageQuery;

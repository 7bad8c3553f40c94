pub mod client;

pub use client::AdminApi;

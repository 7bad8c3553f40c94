pub mod client;
pub mod models;

pub use client::{AuthApi, AuthGateway};
pub use models::{AuthResponse, LoginRequest, RegisterRequest};

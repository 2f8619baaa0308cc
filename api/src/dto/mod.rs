//! Request and response data transfer objects

pub mod auth_dto;

pub use auth_dto::{
    AuthResponse, LoginRequest, LogoutAllResponse, LogoutRequest, LogoutResponse,
    RefreshTokenRequest, TokenPairResponse,
};

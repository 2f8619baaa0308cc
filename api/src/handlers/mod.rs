//! HTTP-level handlers shared across routes

pub mod error_handler;

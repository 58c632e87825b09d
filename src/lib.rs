pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod response;
pub mod util;

//! Data Transfer Objects (DTOs) for API requests and responses

pub mod common;
pub mod subscription;

pub use common::*;
pub use subscription::*;

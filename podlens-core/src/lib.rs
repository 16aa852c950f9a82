pub mod auth;
pub mod error;
pub mod workload;

pub use error::AppError;

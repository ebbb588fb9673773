pub mod data;
pub mod engine;
pub mod errors;
pub mod journal;
pub mod models;
pub mod utils;

pub use errors::AppError;

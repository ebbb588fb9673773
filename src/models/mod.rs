pub mod fill;
pub mod stats;
pub mod trade;

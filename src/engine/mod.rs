pub mod pairing;
pub mod pnl;
pub mod stats;

pub mod import;
pub mod storage;

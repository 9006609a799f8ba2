pub mod export;
pub mod records;

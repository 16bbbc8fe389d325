pub mod config;
pub mod error;
pub mod export;
pub mod records;
pub mod report;
pub mod scoring;
pub mod session;
pub mod store;

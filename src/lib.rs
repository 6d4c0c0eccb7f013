pub mod client;
pub mod config;
pub mod errors;
pub mod google;
pub mod handlers;
pub mod intake;
pub mod models;
pub mod sheets;
pub mod storage;
pub mod validate;

pub mod agent;
pub mod board;
pub mod collections;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod init;
pub mod logging;
pub mod persistence;
pub mod store;
pub mod util;

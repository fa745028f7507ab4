pub mod api;
pub mod config;
pub mod error;
pub mod hub;
pub mod observability;
pub mod rpc;
pub mod scheduler;
pub mod sources;
pub mod store;
pub mod types;
pub mod utils;

pub mod config;
pub mod constants;
pub mod provider;
pub mod rpc;

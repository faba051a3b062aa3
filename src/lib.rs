//! content-chain
//!
//! Sequential, connectivity-aware content loading:
//! - Ordered chains of content operations sharing one view model builder
//! - Connectivity failures park the chain until the network returns
//! - Fatal failures halt the chain with a partial view model

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use self::config::AppConfig;

//! Chain execution infrastructure

mod executor_impl;

pub use executor_impl::{ChainExecutorConfig, ChainExecutorImpl};

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod logging;
pub mod output;
pub mod pipeline;

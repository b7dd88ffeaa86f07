pub mod api;
pub mod backend;
pub mod config;
pub mod data_models;
pub mod gateway;
pub mod lexicon;
pub mod orchestrator;
pub mod rate_limiter;
pub mod resolver;

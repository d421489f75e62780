//! Core text engine: chunking, model routing, translation, detection

pub mod chunker;
pub mod client;
pub mod config;
pub mod detection;
pub mod errors;
pub mod languages;
pub mod model_selector;
pub mod models;
pub mod pipeline;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod mock;

pub mod config;
pub mod error;
pub mod model;
pub mod pdf;
pub mod pipeline;
pub mod visualizer;

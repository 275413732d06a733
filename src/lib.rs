pub mod config;
pub mod error;
pub mod export;
pub mod loader;
pub mod optimizer;
pub mod problem;
// cmd and reports belong to the binary (main.rs).

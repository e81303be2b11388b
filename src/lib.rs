pub mod assemble;
pub mod config;
pub mod frame;
pub mod loader;
pub mod merge;
pub mod progress;
pub mod regression;
pub mod schema;
pub mod transform;
pub mod window;

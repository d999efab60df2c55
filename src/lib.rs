pub mod types;
pub mod config;
pub mod data;
pub mod join;
pub mod format;
pub mod scale;
pub mod scene;
pub mod render;
pub mod svg;
pub mod control;
pub mod plot;
pub mod export;
pub mod server;

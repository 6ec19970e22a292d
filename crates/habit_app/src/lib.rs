pub mod app;
pub mod config;
pub mod demo;
pub mod display;
pub mod notion;

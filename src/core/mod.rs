pub mod components;
pub mod config;
pub mod settings;
pub mod system;

pub mod audio_models;
pub mod config;
pub mod config_value;
pub mod device;
pub mod error;
pub mod state;
pub mod surface;

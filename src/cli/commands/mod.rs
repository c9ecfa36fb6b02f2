pub mod clean;
pub mod config;
pub mod doctor;
pub mod export;
pub mod generate;
pub mod status;

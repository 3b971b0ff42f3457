//! Configuration, credentials and shared data types

pub mod config;
pub mod models;
pub mod secrets;

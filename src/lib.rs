pub mod catalog;
pub mod config;
pub mod remote;
pub mod remote_error;
pub mod services;

pub mod aggregate;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod dataset;
pub mod forecast;
pub mod report;
pub mod server;

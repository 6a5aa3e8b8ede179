// Library for tests to access modules

pub mod command;
pub mod config;
pub mod error;
pub mod models;
pub mod mount_point;
pub mod routes;
pub mod stats_repo;

pub use error::{Error, Result};

// Library for tests to access modules

pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod sampler;
pub mod sysinfo_repo;
pub mod version;

pub mod config;
pub mod logging;

pub mod fetcher;
pub mod job;
pub mod registry;
pub mod scheduler;
pub mod service;
pub mod storage;
pub mod url_model;

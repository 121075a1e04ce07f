pub mod baseline;
pub mod cache;
pub mod catalog;
pub mod cost;
pub mod gem5;
pub mod results;
pub mod stats;

pub mod plot;

pub mod config;
pub mod flags;
pub mod run_wrapper;

pub mod error;

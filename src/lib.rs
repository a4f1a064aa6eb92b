pub mod affinity;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod experiment;
pub mod metrics;
pub mod probe;
pub mod report;
pub mod runner;
pub mod template;
pub mod timing;

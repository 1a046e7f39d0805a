// src/lib.rs
// Library interface for footprint-scout
pub mod breach;
pub mod cli;
pub mod config;
pub mod domain;
pub mod identity;
pub mod output;
pub mod platforms;
pub mod progress;
pub mod report;
pub mod scanner;
pub mod search;
pub mod transport;

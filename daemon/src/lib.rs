//! Memory watchdog daemon library

pub mod collector;
pub mod config;
pub mod detector;
pub mod enumerator;
pub mod error;
pub mod executor;
pub mod monitor;
pub mod notifier;
pub mod tree;

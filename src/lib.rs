//! workclock library - business days and hours arithmetic
//!
//! This module exports internal components for integration testing.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod holidays;
pub mod metrics;
pub mod schedule;
pub mod server;
pub mod service;
pub mod timezone;

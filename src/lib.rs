//! Atlas - a terminal client for browsing databases through a data service.
//!
//! This library exposes the core modules for use by the binary and in
//! integration tests.

pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod gateway;
pub mod session;
pub mod tabular;
pub mod tui;

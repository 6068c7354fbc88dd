//! Integration tests for Atlas.

pub mod http_gateway_test;
pub mod session_test;

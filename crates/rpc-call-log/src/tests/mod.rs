//! Test modules for the call logging interceptor.

pub mod support;

mod config_tests;
mod sink_tests;

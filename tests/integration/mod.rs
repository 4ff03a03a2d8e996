//! Integration tests module
//!
//! This module organizes all integration tests for the sonocli application.

// Import individual test modules
pub mod config_test;
pub mod player_test;

//! Unit tests for cm360-deploy
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod deploy_service;

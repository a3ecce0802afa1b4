//! Integration tests for cm360-deploy
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! Every run uses `--dry-run` or fails before any cloud call, so no Google
//! Cloud SDK is needed.

//! Behavioral tests for the algorithms module.
//!
//! - `gae_tests`: advantage estimation, episode boundaries, normalization
//! - `sampler_tests`: stochastic action selection

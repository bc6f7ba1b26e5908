//! # Stencil Bench
//!
//! Benchmarking utilities for Stencil performance testing.

pub mod fixtures;

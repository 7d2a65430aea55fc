// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! A/B testing backend core.
//!
//! Variant assignment, impression/conversion recording, and per-variant
//! metrics aggregation behind in-memory stores.
//!
//! # Architecture
//!
//! - **domain**: experiment model, error taxonomy, repository contracts
//! - **application**: experiment engine, variant selectors, metrics rollup
//! - **infrastructure**: in-memory catalog and event store
//! - **presentation**: axum HTTP surface

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;

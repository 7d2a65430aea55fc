// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Error taxonomy for the experiment core.
//!
//! Each failure kind maps mechanically to a transport status code in the
//! presentation layer. All failures are synchronous and scoped to one
//! request; none terminates the process.

use thiserror::Error;

use crate::domain::experiment::TestId;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AbTestError {
    /// Referenced test id does not exist in the catalog.
    #[error("Test {0} not found")]
    TestNotFound(TestId),

    /// Test exists but is not active; raised only by paths that require
    /// an active test (experiment assignment).
    #[error("Test {0} is not active")]
    TestInactive(TestId),

    /// Variant distributions do not sum to 100 within tolerance 0.01.
    /// Raised at create/update time only. The sum is formatted with its
    /// decimal point intact ("90.0", not "90") so integral sums read the
    /// same as fractional ones on the wire.
    #[error("Total distribution must equal 100, got {sum:?}")]
    InvalidDistribution { sum: f64 },

    /// Create called with an id already present in the catalog.
    #[error("Test {0} already exists")]
    TestAlreadyExists(TestId),
}

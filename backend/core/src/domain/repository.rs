// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Storage contracts for the experiment core, one per aggregate:
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `TestCatalog` | `Test` | `InMemoryTestCatalog` |
//! | `EventStore` | `Impression` / `Conversion` | `InMemoryEventStore` |
//!
//! Interfaces are defined in the domain layer and implemented in
//! `crate::infrastructure::repositories`. In-memory implementations are
//! the only backends in current scope; data lives for the process
//! lifetime and vanishes on restart.

use async_trait::async_trait;

use crate::domain::error::AbTestError;
use crate::domain::events::{Conversion, Impression};
use crate::domain::experiment::{Test, TestId, VariantId};

/// Catalog of test definitions keyed by test id.
///
/// `save` is the only write primitive: an unconditional upsert. "Create"
/// versus "update" semantics are decided by the experiment engine through
/// existence pre-checks, not by distinct storage behavior.
#[async_trait]
pub trait TestCatalog: Send + Sync {
    /// Look up a test by id.
    async fn get(&self, test_id: &TestId) -> Result<Option<Test>, AbTestError>;

    /// Save a test (create or overwrite).
    async fn save(&self, test: Test) -> Result<(), AbTestError>;

    /// Snapshot of all stored tests. Iteration order is unspecified.
    async fn list_all(&self) -> Result<Vec<Test>, AbTestError>;

    /// Look up a test, failing with `TestNotFound` when absent.
    async fn get_or_fail(&self, test_id: &TestId) -> Result<Test, AbTestError> {
        self.get(test_id)
            .await?
            .ok_or_else(|| AbTestError::TestNotFound(test_id.clone()))
    }

    /// Look up a test that must be active, failing with `TestNotFound`
    /// or `TestInactive`.
    async fn get_active_or_fail(&self, test_id: &TestId) -> Result<Test, AbTestError> {
        let test = self.get_or_fail(test_id).await?;
        if !test.status.is_active() {
            return Err(AbTestError::TestInactive(test_id.clone()));
        }
        Ok(test)
    }
}

/// Append-only store of impression and conversion facts.
///
/// Appends never validate that the referenced test or variant exists;
/// that is the caller's responsibility. There is no deletion API.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append an impression with a fresh id and the current timestamp.
    async fn record_impression(
        &self,
        test_id: TestId,
        variant_id: VariantId,
    ) -> Result<Impression, AbTestError>;

    /// Append a conversion with a free-form event label.
    async fn record_conversion(
        &self,
        test_id: TestId,
        variant_id: VariantId,
        event: String,
    ) -> Result<Conversion, AbTestError>;

    /// Count impressions matching (test, variant). 0 when none match.
    async fn count_impressions(
        &self,
        test_id: &TestId,
        variant_id: &VariantId,
    ) -> Result<u64, AbTestError>;

    /// Count conversions matching (test, variant). 0 when none match.
    async fn count_conversions(
        &self,
        test_id: &TestId,
        variant_id: &VariantId,
    ) -> Result<u64, AbTestError>;
}

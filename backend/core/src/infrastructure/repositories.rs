// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! In-memory implementations of the domain repository contracts.
//!
//! State lives for the process lifetime only. Locks guard whole tables;
//! critical sections are short (a map insert or a vector scan), so
//! contention at this scale is not a concern.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::domain::error::AbTestError;
use crate::domain::events::{Conversion, Impression};
use crate::domain::experiment::{Test, TestId, VariantId};
use crate::domain::repository::{EventStore, TestCatalog};

/// Test definitions keyed by id. Writers swap whole `Test` values under
/// the lock, so readers never observe a partially written definition.
#[derive(Clone, Default)]
pub struct InMemoryTestCatalog {
    tests: Arc<RwLock<HashMap<TestId, Test>>>,
}

impl InMemoryTestCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TestCatalog for InMemoryTestCatalog {
    async fn get(&self, test_id: &TestId) -> Result<Option<Test>, AbTestError> {
        Ok(self.tests.read().get(test_id).cloned())
    }

    async fn save(&self, test: Test) -> Result<(), AbTestError> {
        self.tests.write().insert(test.test_id.clone(), test);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Test>, AbTestError> {
        Ok(self.tests.read().values().cloned().collect())
    }
}

/// Append-only impression and conversion tables.
///
/// Counting scans the whole table; at in-process scale that is fine and
/// keeps appends trivially safe under concurrent writers.
#[derive(Clone, Default)]
pub struct InMemoryEventStore {
    impressions: Arc<Mutex<Vec<Impression>>>,
    conversions: Arc<Mutex<Vec<Conversion>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn record_impression(
        &self,
        test_id: TestId,
        variant_id: VariantId,
    ) -> Result<Impression, AbTestError> {
        let impression = Impression::record(test_id, variant_id);
        self.impressions.lock().push(impression.clone());
        Ok(impression)
    }

    async fn record_conversion(
        &self,
        test_id: TestId,
        variant_id: VariantId,
        event: String,
    ) -> Result<Conversion, AbTestError> {
        let conversion = Conversion::record(test_id, variant_id, event);
        self.conversions.lock().push(conversion.clone());
        Ok(conversion)
    }

    async fn count_impressions(
        &self,
        test_id: &TestId,
        variant_id: &VariantId,
    ) -> Result<u64, AbTestError> {
        let count = self
            .impressions
            .lock()
            .iter()
            .filter(|i| i.matches(test_id, variant_id))
            .count();
        Ok(count as u64)
    }

    async fn count_conversions(
        &self,
        test_id: &TestId,
        variant_id: &VariantId,
    ) -> Result<u64, AbTestError> {
        let count = self
            .conversions
            .lock()
            .iter()
            .filter(|c| c.matches(test_id, variant_id))
            .count();
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::TestStatus;

    #[tokio::test]
    async fn save_is_an_unconditional_upsert() {
        let catalog = InMemoryTestCatalog::new();
        let id = TestId::new("t1");

        catalog
            .save(Test::new(id.clone(), "First", vec![], TestStatus::Active))
            .await
            .unwrap();
        catalog
            .save(Test::new(id.clone(), "Second", vec![], TestStatus::Inactive))
            .await
            .unwrap();

        let stored = catalog.get(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Second");
        assert_eq!(stored.status, TestStatus::Inactive);
        assert_eq!(catalog.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_test_reads_as_none() {
        let catalog = InMemoryTestCatalog::new();
        assert!(catalog.get(&TestId::new("missing")).await.unwrap().is_none());
        assert!(catalog.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn counts_are_scoped_to_test_and_variant() {
        let store = InMemoryEventStore::new();
        let t1 = TestId::new("t1");
        let t2 = TestId::new("t2");
        let a = VariantId::new("A");
        let b = VariantId::new("B");

        store.record_impression(t1.clone(), a.clone()).await.unwrap();
        store.record_impression(t1.clone(), a.clone()).await.unwrap();
        store.record_impression(t1.clone(), b.clone()).await.unwrap();
        store.record_impression(t2.clone(), a.clone()).await.unwrap();
        store
            .record_conversion(t1.clone(), a.clone(), "purchase".into())
            .await
            .unwrap();

        assert_eq!(store.count_impressions(&t1, &a).await.unwrap(), 2);
        assert_eq!(store.count_impressions(&t1, &b).await.unwrap(), 1);
        assert_eq!(store.count_impressions(&t2, &a).await.unwrap(), 1);
        assert_eq!(store.count_impressions(&t2, &b).await.unwrap(), 0);
        assert_eq!(store.count_conversions(&t1, &a).await.unwrap(), 1);
        assert_eq!(store.count_conversions(&t1, &b).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_appends_lose_no_records() {
        let store = Arc::new(InMemoryEventStore::new());
        let test_id = TestId::new("t1");
        let variant_id = VariantId::new("A");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let test_id = test_id.clone();
            let variant_id = variant_id.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    store
                        .record_impression(test_id.clone(), variant_id.clone())
                        .await
                        .unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            store.count_impressions(&test_id, &variant_id).await.unwrap(),
            800
        );
    }
}

// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Append-only fact records.
//!
//! Impressions and conversions reference their test and variant by id
//! only; no referential integrity is enforced against later catalog
//! updates, so an event may outlive the variant it points at.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::experiment::{TestId, VariantId};

/// A record that a variant was shown to a visitor. Never mutated or
/// deleted once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impression {
    pub id: Uuid,
    pub test_id: TestId,
    pub variant_id: VariantId,
    pub timestamp: DateTime<Utc>,
}

impl Impression {
    pub fn record(test_id: TestId, variant_id: VariantId) -> Self {
        Self {
            id: Uuid::new_v4(),
            test_id,
            variant_id,
            timestamp: Utc::now(),
        }
    }

    pub fn matches(&self, test_id: &TestId, variant_id: &VariantId) -> bool {
        &self.test_id == test_id && &self.variant_id == variant_id
    }
}

/// A record that a visitor performed a tracked event for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub id: Uuid,
    pub test_id: TestId,
    pub variant_id: VariantId,
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

impl Conversion {
    pub fn record(test_id: TestId, variant_id: VariantId, event: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            test_id,
            variant_id,
            event: event.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn matches(&self, test_id: &TestId, variant_id: &VariantId) -> bool {
        &self.test_id == test_id && &self.variant_id == variant_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impressions_get_unique_ids() {
        let a = Impression::record(TestId::new("t1"), VariantId::new("A"));
        let b = Impression::record(TestId::new("t1"), VariantId::new("A"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn matches_compares_both_ids() {
        let conv = Conversion::record(TestId::new("t1"), VariantId::new("A"), "purchase");
        assert!(conv.matches(&TestId::new("t1"), &VariantId::new("A")));
        assert!(!conv.matches(&TestId::new("t1"), &VariantId::new("B")));
        assert!(!conv.matches(&TestId::new("t2"), &VariantId::new("A")));
    }
}

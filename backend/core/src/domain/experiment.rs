// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};
use std::fmt;

/// Caller-chosen identifier of a test. Unique within the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TestId(pub String);

impl TestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a variant, unique within its parent test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantId(pub String);

impl VariantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Content block rendered for a variant. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub content_url: String,
}

/// One arm of a test: a traffic share in percentage points plus the
/// sections shown to visitors assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub variant_id: VariantId,
    pub distribution: f64,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Active,
    Inactive,
}

impl TestStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, TestStatus::Active)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TestStatus::Active => f.write_str("active"),
            TestStatus::Inactive => f.write_str("inactive"),
        }
    }
}

/// A named experiment with weighted variants and an activity status.
///
/// The catalog only ever stores tests whose variant distributions sum to
/// 100 (tolerance 0.01); that invariant is enforced by the experiment
/// engine's create/update paths, not re-checked on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Test {
    pub test_id: TestId,
    pub name: String,
    pub variants: Vec<Variant>,
    pub status: TestStatus,
}

impl Test {
    pub fn new(
        test_id: TestId,
        name: impl Into<String>,
        variants: Vec<Variant>,
        status: TestStatus,
    ) -> Self {
        Self {
            test_id,
            name: name.into(),
            variants,
            status,
        }
    }

    pub fn variant_count(&self) -> usize {
        self.variants.len()
    }

    /// Sum of the declared traffic shares across all variants.
    pub fn distribution_sum(&self) -> f64 {
        self.variants.iter().map(|v| v.distribution).sum()
    }
}

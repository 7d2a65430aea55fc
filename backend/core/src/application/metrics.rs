// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Read-only metrics rollup.
//!
//! Joins the catalog's current variant list with event-store counts.
//! Events recorded under variant ids no longer on the test are not
//! surfaced here.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::domain::error::AbTestError;
use crate::domain::experiment::{TestId, VariantId};
use crate::domain::repository::{EventStore, TestCatalog};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMetrics {
    pub variant_id: VariantId,
    pub impressions: u64,
    pub conversions: u64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestMetrics {
    pub test_id: TestId,
    pub variants: Vec<VariantMetrics>,
}

pub struct MetricsService {
    catalog: Arc<dyn TestCatalog>,
    events: Arc<dyn EventStore>,
}

impl MetricsService {
    pub fn new(catalog: Arc<dyn TestCatalog>, events: Arc<dyn EventStore>) -> Self {
        Self { catalog, events }
    }

    /// Per-variant impressions, conversions, and conversion rate for a
    /// test, in the test's variant list order.
    ///
    /// `conversion_rate` is conversions / impressions rounded to three
    /// decimals, or exactly 0.0 when there are no impressions.
    pub async fn get_test_metrics(&self, test_id: &TestId) -> Result<TestMetrics, AbTestError> {
        let test = self.catalog.get_or_fail(test_id).await?;

        let mut variants = Vec::with_capacity(test.variants.len());
        for variant in &test.variants {
            let impressions = self
                .events
                .count_impressions(test_id, &variant.variant_id)
                .await?;
            let conversions = self
                .events
                .count_conversions(test_id, &variant.variant_id)
                .await?;
            let conversion_rate = if impressions > 0 {
                round3(conversions as f64 / impressions as f64)
            } else {
                0.0
            };

            variants.push(VariantMetrics {
                variant_id: variant.variant_id.clone(),
                impressions,
                conversions,
                conversion_rate,
            });
        }

        Ok(TestMetrics {
            test_id: test_id.clone(),
            variants,
        })
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

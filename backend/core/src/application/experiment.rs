// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Experiment engine: the read-and-assign workflow.
//!
//! Orchestrates catalog lookup, variant selection, and impression
//! recording for callers that want to render an experiment, plus the
//! create/update admin paths that guard the distribution invariant.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::selector::VariantSelector;
use crate::domain::error::AbTestError;
use crate::domain::experiment::{Section, Test, TestId, TestStatus, Variant, VariantId};
use crate::domain::repository::{EventStore, TestCatalog};

/// Allowed deviation of a variant list's distribution sum from 100,
/// absorbing floating-point noise in caller-supplied weights.
const DISTRIBUTION_TOLERANCE: f64 = 0.01;

/// Outcome of an experiment assignment: the chosen variant and the
/// content sections to render for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperimentAssignment {
    pub variant_id: VariantId,
    pub sections: Vec<Section>,
}

pub struct ExperimentService {
    catalog: Arc<dyn TestCatalog>,
    events: Arc<dyn EventStore>,
    selector: Arc<dyn VariantSelector>,
}

impl ExperimentService {
    pub fn new(
        catalog: Arc<dyn TestCatalog>,
        events: Arc<dyn EventStore>,
        selector: Arc<dyn VariantSelector>,
    ) -> Self {
        Self {
            catalog,
            events,
            selector,
        }
    }

    fn validate_distribution(variants: &[Variant]) -> Result<(), AbTestError> {
        let sum: f64 = variants.iter().map(|v| v.distribution).sum();
        if (sum - 100.0).abs() > DISTRIBUTION_TOLERANCE {
            return Err(AbTestError::InvalidDistribution { sum });
        }
        Ok(())
    }

    /// Create a new test with status `Active`.
    ///
    /// Fails with `InvalidDistribution` when the variant shares do not
    /// sum to 100, or `TestAlreadyExists` when the id is taken.
    pub async fn create_test(
        &self,
        test_id: TestId,
        name: String,
        variants: Vec<Variant>,
    ) -> Result<&'static str, AbTestError> {
        Self::validate_distribution(&variants)?;

        if self.catalog.get(&test_id).await?.is_some() {
            return Err(AbTestError::TestAlreadyExists(test_id));
        }

        self.catalog
            .save(Test::new(test_id, name, variants, TestStatus::Active))
            .await?;
        Ok("Test created")
    }

    /// Replace an existing test's name and variants, preserving its
    /// current status.
    ///
    /// Variants may be shrunk or renamed freely; events recorded under
    /// an old variant id stay in the store but drop out of metrics.
    pub async fn update_test(
        &self,
        test_id: TestId,
        name: String,
        variants: Vec<Variant>,
    ) -> Result<&'static str, AbTestError> {
        Self::validate_distribution(&variants)?;

        let existing = self.catalog.get_or_fail(&test_id).await?;
        self.catalog
            .save(Test::new(test_id, name, variants, existing.status))
            .await?;
        Ok("Test updated")
    }

    /// Assign a variant for one render of the test and record the
    /// impression.
    ///
    /// Every call appends one impression, even when the deterministic
    /// strategy picks the same variant for a repeat visitor; only the
    /// choice is stable, not the impression count. Nothing is recorded
    /// when the lookup fails.
    pub async fn get_experiment(
        &self,
        test_id: &TestId,
        visitor_id: Option<&str>,
    ) -> Result<ExperimentAssignment, AbTestError> {
        let test = self.catalog.get_active_or_fail(test_id).await?;

        let chosen = self
            .selector
            .select(&test.variants, test_id, visitor_id)?
            .clone();

        self.events
            .record_impression(test_id.clone(), chosen.variant_id.clone())
            .await?;

        Ok(ExperimentAssignment {
            variant_id: chosen.variant_id,
            sections: chosen.sections,
        })
    }

    /// Record a conversion event against (test, variant).
    ///
    /// Only the test's existence is checked. The variant id is taken as
    /// given: conversions against an id the test never had, or one
    /// removed by a later update, are stored but become unreachable
    /// through metrics.
    pub async fn register_conversion(
        &self,
        test_id: &TestId,
        variant_id: VariantId,
        event: String,
    ) -> Result<(), AbTestError> {
        self.catalog.get_or_fail(test_id).await?;

        self.events
            .record_conversion(test_id.clone(), variant_id, event)
            .await?;
        Ok(())
    }
}

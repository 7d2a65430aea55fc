// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Variant selection strategies.
//!
//! Two interchangeable policies map a weighted variant list to exactly one
//! variant. Both walk the list in order accumulating distributions and
//! return the first variant whose cumulative share covers a point in
//! [0, 100); they differ only in how that point is produced:
//!
//! - [`RandomSelector`] draws a fresh uniform point per call, so repeat
//!   visitors may be reassigned on every view.
//! - [`DeterministicSelector`] derives the point from a stable digest of
//!   `testId:visitorId`, so a visitor sees the same variant across
//!   repeat visits.
//!
//! The deterministic strategy is the one that gives real test
//! consistency; the random one is kept as an explicit configuration for
//! callers that cannot supply a visitor identity.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rand::Rng;
use sha2::{Digest, Sha256};

use crate::domain::error::AbTestError;
use crate::domain::experiment::{TestId, Variant};

/// Maps (variant list, selection context) to exactly one variant.
pub trait VariantSelector: Send + Sync {
    /// Choose a variant. `visitor_id` is only consulted by strategies
    /// that need a stable identity key.
    fn select<'a>(
        &self,
        variants: &'a [Variant],
        test_id: &TestId,
        visitor_id: Option<&str>,
    ) -> Result<&'a Variant, AbTestError>;
}

/// Cumulative-sum walk shared by both strategies.
///
/// `point` must be in [0, 100). The last variant is the fallback when
/// floating-point rounding leaves the point past every cumulative share.
fn pick_by_cumulative(variants: &[Variant], point: f64) -> Result<&Variant, AbTestError> {
    let Some(last) = variants.last() else {
        // Empty list means a zero distribution sum; save-time validation
        // should have rejected it, but never index out of bounds here.
        return Err(AbTestError::InvalidDistribution { sum: 0.0 });
    };

    let mut cumulative = 0.0;
    for variant in variants {
        cumulative += variant.distribution;
        if point <= cumulative {
            return Ok(variant);
        }
    }

    Ok(last)
}

/// Uniform random assignment. Not reproducible across calls.
#[derive(Debug, Clone, Default)]
pub struct RandomSelector;

impl VariantSelector for RandomSelector {
    fn select<'a>(
        &self,
        variants: &'a [Variant],
        _test_id: &TestId,
        _visitor_id: Option<&str>,
    ) -> Result<&'a Variant, AbTestError> {
        let point = rand::rng().random::<f64>() * 100.0;
        pick_by_cumulative(variants, point)
    }
}

/// Visitor-stable assignment via a SHA-256 digest of `testId:visitorId`.
///
/// The first 16 digest bytes are reduced modulo 10000 into a point in
/// [0, 100) with two decimal places of resolution. The same (test,
/// visitor) pair always lands on the same point, so repeat visits select
/// the same variant as long as the variant list is unchanged.
#[derive(Debug, Clone, Default)]
pub struct DeterministicSelector;

impl DeterministicSelector {
    fn bucket(test_id: &TestId, visitor_id: &str) -> f64 {
        let digest = Sha256::digest(format!("{}:{}", test_id, visitor_id));
        let mut prefix = [0u8; 16];
        prefix.copy_from_slice(&digest[..16]);
        let hash = u128::from_be_bytes(prefix);
        (hash % 10_000) as f64 / 100.0
    }
}

impl VariantSelector for DeterministicSelector {
    fn select<'a>(
        &self,
        variants: &'a [Variant],
        test_id: &TestId,
        visitor_id: Option<&str>,
    ) -> Result<&'a Variant, AbTestError> {
        let point = match visitor_id {
            Some(visitor_id) => Self::bucket(test_id, visitor_id),
            // Without an identity key there is nothing to be stable
            // against; degrade to a random draw.
            None => rand::rng().random::<f64>() * 100.0,
        };
        pick_by_cumulative(variants, point)
    }
}

/// Selection policy chosen at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionStrategy {
    Random,
    #[default]
    Deterministic,
}

impl SelectionStrategy {
    /// Construct the selector implementing this strategy.
    pub fn build(self) -> Arc<dyn VariantSelector> {
        match self {
            SelectionStrategy::Random => Arc::new(RandomSelector),
            SelectionStrategy::Deterministic => Arc::new(DeterministicSelector),
        }
    }
}

impl FromStr for SelectionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(SelectionStrategy::Random),
            "deterministic" => Ok(SelectionStrategy::Deterministic),
            other => Err(format!(
                "Unknown selection strategy '{}'. Supported: random, deterministic",
                other
            )),
        }
    }
}

impl fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionStrategy::Random => f.write_str("random"),
            SelectionStrategy::Deterministic => f.write_str("deterministic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::experiment::VariantId;
    use std::collections::HashMap;

    fn variants(shares: &[(&str, f64)]) -> Vec<Variant> {
        shares
            .iter()
            .map(|(id, distribution)| Variant {
                variant_id: VariantId::new(*id),
                distribution: *distribution,
                sections: vec![],
            })
            .collect()
    }

    #[test]
    fn cumulative_walk_respects_boundaries() {
        let vs = variants(&[("A", 60.0), ("B", 40.0)]);

        assert_eq!(pick_by_cumulative(&vs, 0.0).unwrap().variant_id.as_str(), "A");
        assert_eq!(pick_by_cumulative(&vs, 59.9).unwrap().variant_id.as_str(), "A");
        assert_eq!(pick_by_cumulative(&vs, 60.0).unwrap().variant_id.as_str(), "A");
        assert_eq!(pick_by_cumulative(&vs, 60.1).unwrap().variant_id.as_str(), "B");
        assert_eq!(pick_by_cumulative(&vs, 99.99).unwrap().variant_id.as_str(), "B");
    }

    #[test]
    fn cumulative_walk_falls_back_to_last_variant() {
        // Rounding can leave the point past every cumulative share.
        let vs = variants(&[("A", 33.33), ("B", 33.33), ("C", 33.33)]);
        assert_eq!(
            pick_by_cumulative(&vs, 99.999).unwrap().variant_id.as_str(),
            "C"
        );
    }

    #[test]
    fn empty_variant_list_is_rejected() {
        let err = pick_by_cumulative(&[], 50.0).unwrap_err();
        assert!(matches!(err, AbTestError::InvalidDistribution { .. }));

        let err = RandomSelector
            .select(&[], &TestId::new("t1"), None)
            .unwrap_err();
        assert!(matches!(err, AbTestError::InvalidDistribution { .. }));
    }

    #[test]
    fn deterministic_selection_is_stable_per_visitor() {
        let vs = variants(&[("A", 50.0), ("B", 50.0)]);
        let selector = DeterministicSelector;
        let test_id = TestId::new("t1");

        for visitor in ["v1", "v2", "visitor-with-long-id", ""] {
            let first = selector
                .select(&vs, &test_id, Some(visitor))
                .unwrap()
                .variant_id
                .clone();
            for _ in 0..50 {
                let again = selector.select(&vs, &test_id, Some(visitor)).unwrap();
                assert_eq!(again.variant_id, first);
            }
        }
    }

    #[test]
    fn deterministic_selection_depends_on_test_id() {
        // The digest covers testId:visitorId, so the same visitor may
        // land on different arms of different tests. With 64 tests the
        // odds of never diverging on a 50/50 split are negligible.
        let vs = variants(&[("A", 50.0), ("B", 50.0)]);
        let selector = DeterministicSelector;

        let picks: Vec<VariantId> = (0..64)
            .map(|i| {
                selector
                    .select(&vs, &TestId::new(format!("t{}", i)), Some("v1"))
                    .unwrap()
                    .variant_id
                    .clone()
            })
            .collect();
        assert!(picks.iter().any(|id| id != &picks[0]));
    }

    #[test]
    fn random_selection_covers_declared_shares() {
        let vs = variants(&[("A", 60.0), ("B", 30.0), ("C", 10.0)]);
        let selector = RandomSelector;
        let test_id = TestId::new("t1");

        let mut observed: HashMap<String, u32> = HashMap::new();
        let samples = 10_000;
        for _ in 0..samples {
            let chosen = selector.select(&vs, &test_id, None).unwrap();
            *observed.entry(chosen.variant_id.as_str().to_string()).or_default() += 1;
        }

        for variant in &vs {
            let hits = observed.get(variant.variant_id.as_str()).copied().unwrap_or(0);
            let share = 100.0 * f64::from(hits) / f64::from(samples);
            assert!(
                (share - variant.distribution).abs() < 2.0,
                "variant {} observed share {share:.2}% vs declared {}%",
                variant.variant_id,
                variant.distribution
            );
        }
    }

    #[test]
    fn deterministic_selection_covers_declared_shares_across_visitors() {
        let vs = variants(&[("A", 70.0), ("B", 30.0)]);
        let selector = DeterministicSelector;
        let test_id = TestId::new("t1");

        let mut observed: HashMap<String, u32> = HashMap::new();
        let samples = 10_000;
        for i in 0..samples {
            let chosen = selector
                .select(&vs, &test_id, Some(&format!("visitor-{}", i)))
                .unwrap();
            *observed.entry(chosen.variant_id.as_str().to_string()).or_default() += 1;
        }

        for variant in &vs {
            let hits = observed.get(variant.variant_id.as_str()).copied().unwrap_or(0);
            let share = 100.0 * f64::from(hits) / f64::from(samples);
            assert!(
                (share - variant.distribution).abs() < 2.0,
                "variant {} observed share {share:.2}% vs declared {}%",
                variant.variant_id,
                variant.distribution
            );
        }
    }

    #[test]
    fn strategy_parses_from_config_strings() {
        assert_eq!(
            "random".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::Random
        );
        assert_eq!(
            "deterministic".parse::<SelectionStrategy>().unwrap(),
            SelectionStrategy::Deterministic
        );
        assert!("coin-flip".parse::<SelectionStrategy>().is_err());
    }
}

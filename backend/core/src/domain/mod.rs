// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod experiment;
pub mod events;
pub mod error;
pub mod repository;

pub use error::AbTestError;
pub use experiment::{Section, Test, TestId, TestStatus, Variant, VariantId};

//! Brew recipe reconciliation.
//!
//! Computes which brew recipes must be created, updated or deleted so that a
//! product's stored recipes match a desired list. The computation is pure: the
//! whole plan is built (and validated) before anything is written.

use std::collections::{HashMap, HashSet};

use common::{CoffeeBrewId, ProductId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ValidationError;
use crate::product::{Money, ProductCoffeeBrew};

/// Desired state of one brew recipe.
///
/// `id: None` asks for a new recipe; `Some(id)` refers to an existing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoffeeBrewParams {
    #[serde(default)]
    pub id: Option<CoffeeBrewId>,
    pub name: String,
    pub bean_quantity_grams: u32,
    pub amount: Money,
}

impl CoffeeBrewParams {
    pub fn new(name: impl Into<String>, bean_quantity_grams: u32, amount: Money) -> Self {
        Self {
            id: None,
            name: name.into(),
            bean_quantity_grams,
            amount,
        }
    }

    pub fn existing(
        id: CoffeeBrewId,
        name: impl Into<String>,
        bean_quantity_grams: u32,
        amount: Money,
    ) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name, bean_quantity_grams, amount)
        }
    }

    /// Field-by-field comparison of the comparable fields.
    fn differs_from(&self, brew: &ProductCoffeeBrew) -> bool {
        self.name != brew.name()
            || self.bean_quantity_grams != brew.bean_quantity_grams()
            || self.amount != brew.amount()
    }
}

/// Errors that abort a reconciliation before any write happens.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A new or updated recipe has invalid fields.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The desired list names a recipe this product does not own.
    #[error("coffee brew not found: {0}")]
    UnknownBrew(CoffeeBrewId),

    /// The desired list names the same recipe more than once.
    #[error("coffee brew listed more than once: {0}")]
    DuplicateBrew(CoffeeBrewId),
}

/// The writes needed to bring stored recipes in line with a desired list.
///
/// The three sets are disjoint. Apply them in field order: creates, then
/// updates, then deletes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrewPlan {
    pub creates: Vec<ProductCoffeeBrew>,
    pub updates: Vec<ProductCoffeeBrew>,
    pub deletes: Vec<CoffeeBrewId>,
}

impl BrewPlan {
    pub fn is_empty(&self) -> bool {
        self.creates.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    /// Number of repository writes the plan needs.
    pub fn write_count(&self) -> usize {
        self.creates.len() + self.updates.len() + self.deletes.len()
    }

    /// Returns the collection that results from applying the plan to `current`.
    ///
    /// Surviving recipes keep their order; new ones are appended.
    pub fn apply(&self, current: &[ProductCoffeeBrew]) -> Vec<ProductCoffeeBrew> {
        let deleted: HashSet<CoffeeBrewId> = self.deletes.iter().copied().collect();
        let updated: HashMap<CoffeeBrewId, &ProductCoffeeBrew> =
            self.updates.iter().map(|brew| (brew.id(), brew)).collect();

        current
            .iter()
            .filter(|brew| !deleted.contains(&brew.id()))
            .map(|brew| {
                updated
                    .get(&brew.id())
                    .map_or_else(|| brew.clone(), |&replacement| replacement.clone())
            })
            .chain(self.creates.iter().cloned())
            .collect()
    }
}

/// Diffs `current` against `desired` for the product `product_id`.
///
/// - entries without an id become creates (validated on construction);
/// - entries whose id matches a current recipe with at least one differing
///   field become updates; identical ones are skipped;
/// - current recipes whose id is not listed become deletes.
pub fn reconcile(
    product_id: ProductId,
    current: &[ProductCoffeeBrew],
    desired: &[CoffeeBrewParams],
) -> Result<BrewPlan, ReconcileError> {
    let by_id: HashMap<CoffeeBrewId, &ProductCoffeeBrew> =
        current.iter().map(|brew| (brew.id(), brew)).collect();
    let mut listed: HashSet<CoffeeBrewId> = HashSet::with_capacity(desired.len());
    let mut plan = BrewPlan::default();

    for params in desired {
        let Some(id) = params.id else {
            plan.creates.push(ProductCoffeeBrew::new(
                product_id,
                params.name.clone(),
                params.bean_quantity_grams,
                params.amount,
            )?);
            continue;
        };

        // An id not stored for this product is rejected here, before any write.
        let existing = by_id
            .get(&id)
            .copied()
            .ok_or(ReconcileError::UnknownBrew(id))?;
        if !listed.insert(id) {
            return Err(ReconcileError::DuplicateBrew(id));
        }

        if params.differs_from(existing) {
            let mut brew = existing.clone();
            brew.set_name(params.name.clone())?;
            brew.set_bean_quantity_grams(params.bean_quantity_grams)?;
            brew.set_amount(params.amount)?;
            plan.updates.push(brew);
        }
    }

    plan.deletes = current
        .iter()
        .map(ProductCoffeeBrew::id)
        .filter(|id| !listed.contains(id))
        .collect();

    Ok(plan)
}

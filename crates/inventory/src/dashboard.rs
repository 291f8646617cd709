//! Read-side summaries over the item list.

use serde::Serialize;

use crate::category::{Category, CATEGORIES};
use crate::item::{Condition, Item};

/// Items with fewer than this many available count as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total: u64,
    pub in_use: u64,
    pub low_stock: usize,
    pub needs_repair: usize,
}

impl InventoryStats {
    pub fn compute(items: &[Item], low_stock_threshold: i64) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.total += u64::from(item.quantity);
            acc.in_use += u64::from(item.in_use);
            if item.available() < low_stock_threshold {
                acc.low_stock += 1;
            }
            if item.condition == Condition::NeedsRepair {
                acc.needs_repair += 1;
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub total: u64,
    pub in_use: u64,
}

/// Per-category totals over the fixed catalog, in catalog order.
pub fn category_summaries(items: &[Item]) -> Vec<CategorySummary> {
    CATEGORIES
        .iter()
        .map(|cat| {
            let (total, in_use) = items
                .iter()
                .filter(|i| i.category == cat.id)
                .fold((0u64, 0u64), |(t, u), i| {
                    (t + u64::from(i.quantity), u + u64::from(i.in_use))
                });
            CategorySummary {
                category: *cat,
                total,
                in_use,
            }
        })
        .collect()
}

/// Item list filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub condition: Option<Condition>,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        let matches_search = match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                item.name.to_lowercase().contains(&term.to_lowercase())
            }
            _ => true,
        };
        let matches_category = self.category.as_deref().is_none_or(|c| item.category == c);
        let matches_condition = self.condition.is_none_or(|c| item.condition == c);
        matches_search && matches_category && matches_condition
    }

    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|i| self.matches(i)).collect()
    }
}

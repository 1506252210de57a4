//! Gallery ordering for filtered herbs.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::models::Herb;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HerbSortKey {
    #[default]
    Name,
    Category,
    Nature,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn reversed(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

/// Current sort selection of the gallery.
///
/// Names order by their pinyin romanization when the record carries one, so
/// Chinese names sort alphabetically by reading. Records without pinyin fall
/// back to the name itself, which orders by code point and after any
/// romanized key. Category and nature always compare by code point.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HerbSort {
    pub key: HerbSortKey,
    pub order: SortOrder,
}

impl HerbSort {
    /// Selecting the active key flips the order; a new key starts ascending.
    pub fn toggle(self, key: HerbSortKey) -> Self {
        if self.key == key {
            Self {
                key,
                order: self.order.reversed(),
            }
        } else {
            Self {
                key,
                order: SortOrder::Asc,
            }
        }
    }

    fn compare(&self, a: &Herb, b: &Herb) -> Ordering {
        let ordering = match self.key {
            HerbSortKey::Name => name_key(a)
                .cmp(&name_key(b))
                .then_with(|| a.name.cmp(&b.name)),
            HerbSortKey::Category => a.category.cmp(&b.category),
            HerbSortKey::Nature => a.nature.cmp(&b.nature),
        };
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

fn name_key(herb: &Herb) -> String {
    let pinyin = herb.pinyin.trim();
    if pinyin.is_empty() {
        herb.name.clone()
    } else {
        pinyin.to_lowercase()
    }
}

/// Stable sort of `herbs` in place.
pub fn sort_herbs(herbs: &mut [Herb], sort: HerbSort) {
    herbs.sort_by(|a, b| sort.compare(a, b));
}

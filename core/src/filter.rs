//! Catalog query filters and pagination.

use crate::event::{AgeRange, Event, EventCategory};
use crate::money::Money;
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Inclusive price bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    /// Lower bound
    pub min: Money,
    /// Upper bound
    pub max: Money,
}

/// Inclusive date bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest date
    pub start: DateTime<Utc>,
    /// Latest date
    pub end: DateTime<Utc>,
}

/// Catalog query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventFilter {
    /// Match any of these categories; empty means all
    pub categories: Vec<EventCategory>,
    /// Keep events whose age range overlaps this one
    pub age_range: Option<AgeRange>,
    /// Keep events priced within this range
    pub price_range: Option<PriceRange>,
    /// Keep events dated within this range
    pub date_range: Option<DateRange>,
    /// Case-insensitive text search
    pub search_query: Option<String>,
    /// Page size
    pub limit: u32,
    /// Items to skip
    pub offset: u32,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            age_range: None,
            price_range: None,
            date_range: None,
            search_query: None,
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl EventFilter {
    /// Validate bounds and page size.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::in_range("limit", self.limit, 1, MAX_LIMIT)?;
        if let Some(age_range) = &self.age_range {
            age_range.validate()?;
        }
        if let Some(price_range) = &self.price_range {
            if price_range.min > price_range.max {
                return Err(ValidationError::InvertedRange { field: "price" });
            }
        }
        if let Some(date_range) = &self.date_range {
            if date_range.start > date_range.end {
                return Err(ValidationError::InvertedRange { field: "date" });
            }
        }
        if let Some(query) = &self.search_query {
            validation::max_text("searchQuery", query, 100)?;
        }
        Ok(())
    }

    /// Whether `event` passes every filter.
    #[must_use]
    pub fn matches(&self, event: &Event) -> bool {
        let details = &event.details;
        if !self.categories.is_empty() && !self.categories.contains(&details.category) {
            return false;
        }
        if let Some(age_range) = &self.age_range {
            if !details.age_range.overlaps(age_range) {
                return false;
            }
        }
        if let Some(price_range) = &self.price_range {
            if details.price_cents < price_range.min || details.price_cents > price_range.max {
                return false;
            }
        }
        if let Some(date_range) = &self.date_range {
            if details.date < date_range.start || details.date > date_range.end {
                return false;
            }
        }
        match self.search_query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => details.matches_query(&query.to_lowercase()),
            _ => true,
        }
    }
}

/// One page of results.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Matching items across all pages
    pub total: usize,
    /// Page size
    pub limit: u32,
    /// Items skipped
    pub offset: u32,
    /// Whether another page follows
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Cut one page out of an already sorted result set.
    #[must_use]
    pub fn paginate(items: Vec<T>, limit: u32, offset: u32) -> Self {
        let total = items.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        let size = usize::try_from(limit).unwrap_or(usize::MAX);
        let items: Vec<T> = items.into_iter().skip(start).take(size).collect();
        Self {
            items,
            total,
            limit,
            offset,
            has_more: start.saturating_add(size) < total,
        }
    }

    /// Transform the items, keeping the page metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
            has_more: self.has_more,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_reports_has_more() {
        let page = Page::paginate((0..45).collect::<Vec<_>>(), 20, 20);
        assert_eq!(page.items, (20..40).collect::<Vec<_>>());
        assert_eq!(page.total, 45);
        assert!(page.has_more);

        let last = Page::paginate((0..45).collect::<Vec<_>>(), 20, 40);
        assert_eq!(last.items.len(), 5);
        assert!(!last.has_more);
    }

    #[test]
    fn offset_past_the_end_is_empty() {
        let page = Page::paginate(vec![1, 2, 3], 20, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert!(!page.has_more);
    }

    #[test]
    fn filter_validation() {
        assert!(EventFilter::default().validate().is_ok());
        let too_big = EventFilter {
            limit: 101,
            ..EventFilter::default()
        };
        assert!(too_big.validate().is_err());
        let inverted = EventFilter {
            price_range: Some(PriceRange {
                min: Money::from_cents(500),
                max: Money::from_cents(100),
            }),
            ..EventFilter::default()
        };
        assert_eq!(
            inverted.validate(),
            Err(ValidationError::InvertedRange { field: "price" })
        );
    }
}

//! Catalog events.
//!
//! An [`Event`] is catalog metadata only. Its remaining spots are owned by the
//! reservation ledger and joined in at read time through [`EventView`].

use crate::ids::{EventId, UserId};
use crate::money::Money;
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest age (inclusive) an event can target.
pub const MAX_CHILD_AGE: u8 = 18;

/// Kind of activity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    /// Outdoor activity
    Outdoor,
    /// Indoor activity
    Indoor,
    /// Educational session
    Educational,
    /// Sports
    Sports,
    /// Arts and crafts
    Arts,
    /// Music
    Music,
    /// Party
    Party,
    /// Hands-on workshop
    Workshop,
    /// Playdate
    Playdate,
}

/// Inclusive age range in years.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeRange {
    /// Minimum age
    pub min: u8,
    /// Maximum age
    pub max: u8,
}

impl AgeRange {
    /// Build a validated age range.
    ///
    /// # Errors
    ///
    /// Returns an error when a bound exceeds [`MAX_CHILD_AGE`] or `min > max`.
    pub fn new(min: u8, max: u8) -> Result<Self, ValidationError> {
        let range = Self { min, max };
        range.validate()?;
        Ok(range)
    }

    /// Check bounds and ordering.
    ///
    /// # Errors
    ///
    /// Returns an error when a bound exceeds [`MAX_CHILD_AGE`] or `min > max`.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::in_range("ageRange.min", self.min, 0, MAX_CHILD_AGE)?;
        validation::in_range("ageRange.max", self.max, 0, MAX_CHILD_AGE)?;
        if self.min > self.max {
            return Err(ValidationError::InvertedRange { field: "age" });
        }
        Ok(())
    }

    /// Whether two ranges share at least one age.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.min <= other.max && self.max >= other.min
    }
}

/// Host-supplied event details.
///
/// This is both the create payload and the editable part of a stored
/// [`Event`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Cover image
    pub image_url: String,
    /// Day of the event
    pub date: DateTime<Utc>,
    /// Start time, `HH:MM` (24h)
    pub time: String,
    /// Venue name
    pub location: String,
    /// Street address
    pub address: String,
    /// Price per child
    pub price_cents: Money,
    /// Target ages
    pub age_range: AgeRange,
    /// Category
    pub category: EventCategory,
    /// Host display name
    pub host_name: String,
    /// Host avatar
    pub host_image: String,
    /// Total number of spots
    pub capacity: u32,
    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Accessibility notes
    #[serde(default)]
    pub accessibility_features: Vec<String>,
    /// Venue latitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Venue longitude
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl NewEvent {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required_text("title", &self.title, 100)?;
        validation::required_text("description", &self.description, 1000)?;
        validation::url("imageUrl", &self.image_url)?;
        validate_time(&self.time)?;
        validation::required_text("location", &self.location, 100)?;
        validation::required_text("address", &self.address, 200)?;
        self.age_range.validate()?;
        validation::required_text("hostName", &self.host_name, 50)?;
        validation::url("hostImage", &self.host_image)?;
        validation::in_range("capacity", self.capacity, 1, u32::MAX)?;
        validation::text_list("tags", &self.tags, Some(10), 30)?;
        validation::text_list("accessibilityFeatures", &self.accessibility_features, None, 50)?;
        if let Some(latitude) = self.latitude {
            validation::in_range("latitude", latitude, -90.0, 90.0)?;
        }
        if let Some(longitude) = self.longitude {
            validation::in_range("longitude", longitude, -180.0, 180.0)?;
        }
        Ok(())
    }

    /// Case-insensitive search over title, description, location and tags.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.location.to_lowercase().contains(needle)
            || self.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
    }
}

/// `HH:MM`, hours 0-23 with optional leading zero, minutes 00-59.
fn validate_time(time: &str) -> Result<(), ValidationError> {
    let invalid = ValidationError::InvalidFormat {
        field: "time",
        expected: "HH:MM",
    };
    let Some((hours, minutes)) = time.split_once(':') else {
        return Err(invalid);
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid);
    }
    match (hours.parse::<u8>(), minutes.parse::<u8>()) {
        (Ok(h), Ok(m)) if h < 24 && m < 60 => Ok(()),
        _ => Err(invalid),
    }
}

/// A catalog event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event ID
    pub id: EventId,
    /// Host-supplied details
    #[serde(flatten)]
    pub details: NewEvent,
    /// User who created the event
    pub created_by: UserId,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a new event record.
    #[must_use]
    pub fn new(details: NewEvent, created_by: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: EventId::new(),
            details,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Capacity fixed at creation.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.details.capacity
    }
}

/// Partial update of an event's details.
///
/// Every field is optional; `capacity` may only be repeated with its current
/// value because capacity is immutable once the inventory exists.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub price_cents: Option<Money>,
    pub age_range: Option<AgeRange>,
    pub category: Option<EventCategory>,
    pub host_name: Option<String>,
    pub host_image: Option<String>,
    pub capacity: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub accessibility_features: Option<Vec<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl EventPatch {
    /// Apply the patch to `event`, validating the result.
    ///
    /// The event is left untouched when the patch is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Immutable`] when the patch changes the
    /// capacity, or the first validation error of the patched details.
    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if self.capacity.is_some_and(|capacity| capacity != event.details.capacity) {
            return Err(ValidationError::Immutable { field: "capacity" });
        }

        let mut details = event.details.clone();
        set(&mut details.title, self.title);
        set(&mut details.description, self.description);
        set(&mut details.image_url, self.image_url);
        set(&mut details.date, self.date);
        set(&mut details.time, self.time);
        set(&mut details.location, self.location);
        set(&mut details.address, self.address);
        set(&mut details.price_cents, self.price_cents);
        set(&mut details.age_range, self.age_range);
        set(&mut details.category, self.category);
        set(&mut details.host_name, self.host_name);
        set(&mut details.host_image, self.host_image);
        set(&mut details.tags, self.tags);
        set(&mut details.accessibility_features, self.accessibility_features);
        if self.latitude.is_some() {
            details.latitude = self.latitude;
        }
        if self.longitude.is_some() {
            details.longitude = self.longitude;
        }
        details.validate()?;

        event.details = details;
        event.updated_at = now;
        Ok(())
    }
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// An event as shown to a caller: catalog data plus live availability.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView {
    /// Catalog record
    #[serde(flatten)]
    pub event: Event,
    /// Spots left according to the reservation ledger
    pub spots_left: u32,
    /// Whether the viewer has favorited the event
    pub is_favorite: bool,
}

//! Child profiles owned by a parent account.

use crate::event::MAX_CHILD_AGE;
use crate::ids::{ChildId, UserId};
use crate::validation::{self, ValidationError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Parent-supplied child details.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChild {
    /// First name
    pub name: String,
    /// Age in years
    pub age: u8,
    /// Interests
    #[serde(default)]
    pub interests: Vec<String>,
    /// Allergies
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Special needs
    #[serde(default)]
    pub special_needs: Vec<String>,
    /// Avatar color, `#RRGGBB`
    pub avatar_color: String,
}

impl NewChild {
    /// Validate every field.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::required_text("name", &self.name, 50)?;
        validation::in_range("age", self.age, 0, MAX_CHILD_AGE)?;
        validation::text_list("interests", &self.interests, Some(10), 30)?;
        validation::text_list("allergies", &self.allergies, None, 50)?;
        validation::text_list("specialNeeds", &self.special_needs, None, 100)?;
        validate_color(&self.avatar_color)
    }
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    match color.strip_prefix('#') {
        Some(hex) if hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()) => Ok(()),
        _ => Err(ValidationError::InvalidFormat {
            field: "avatarColor",
            expected: "#RRGGBB",
        }),
    }
}

/// A stored child profile.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    /// Child ID
    pub id: ChildId,
    /// Parent-supplied details
    #[serde(flatten)]
    pub details: NewChild,
    /// Owning parent
    pub parent_id: UserId,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Child {
    /// Create a child profile for `parent_id`.
    #[must_use]
    pub fn new(details: NewChild, parent_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: ChildId::new(),
            details,
            parent_id,
            created_at: now,
        }
    }
}

/// Partial update of a child profile.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct ChildPatch {
    pub name: Option<String>,
    pub age: Option<u8>,
    pub interests: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub special_needs: Option<Vec<String>>,
    pub avatar_color: Option<String>,
}

impl ChildPatch {
    /// Apply the patch, leaving `child` untouched if the result is invalid.
    ///
    /// # Errors
    ///
    /// Returns the first validation error of the patched details.
    pub fn apply(self, child: &mut Child) -> Result<(), ValidationError> {
        let mut details = child.details.clone();
        if let Some(name) = self.name {
            details.name = name;
        }
        if let Some(age) = self.age {
            details.age = age;
        }
        if let Some(interests) = self.interests {
            details.interests = interests;
        }
        if let Some(allergies) = self.allergies {
            details.allergies = allergies;
        }
        if let Some(special_needs) = self.special_needs {
            details.special_needs = special_needs;
        }
        if let Some(avatar_color) = self.avatar_color {
            details.avatar_color = avatar_color;
        }
        details.validate()?;
        child.details = details;
        Ok(())
    }
}

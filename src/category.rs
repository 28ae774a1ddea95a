//! Defines the [`Category`] entity. Every article belongs to exactly one
//! category.

use crate::store::Id;
use chrono::{DateTime, Utc};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: Id,

    /// Unique across all categories.
    pub name: String,

    pub slug: String,

    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

/// A validated category that hasn't been stored yet. See
/// [`crate::forms::CategoryForm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

impl Category {
    /// Builds a stored category from its id and the data it was created with.
    pub fn from_new(id: Id, new: NewCategory, now: DateTime<Utc>) -> Category {
        Category {
            id,
            name: new.name,
            slug: new.slug,
            created_time: now,
            updated_time: now,
        }
    }
}

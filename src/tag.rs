//! Defines the [`Tag`] type, which represents an [`crate::article::Article`]
//! tag.

use crate::store::Id;
use chrono::{DateTime, Utc};
use std::hash::{Hash, Hasher};

/// Represents an [`crate::article::Article`] tag. Tags are usually created
/// lazily by [`crate::tag_input::parse_tags`] when an article is saved, so
/// `name` and `slug` are both the lowercased text the author typed.
#[derive(Clone, Debug)]
pub struct Tag {
    pub id: Id,

    /// The tag's name. This is stored lowercased so e.g., `macOS` and `MacOS`
    /// resolve to the same tag. Unique across all tags.
    pub name: String,

    /// The path segment for the tag's listing pages.
    pub slug: String,

    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl Hash for Tag {
    /// Implements [`Hash`] for [`Tag`] by delegating directly to the `name`
    /// field.
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl PartialEq for Tag {
    /// Implements [`PartialEq`] and [`Eq`] for [`Tag`] by delegating directly
    /// to the `name` field.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Tag {}

/// A tag that hasn't been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTag {
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn from_new(id: Id, new: NewTag, now: DateTime<Utc>) -> Tag {
        Tag {
            id,
            name: new.name,
            slug: new.slug,
            created_time: now,
            updated_time: now,
        }
    }
}

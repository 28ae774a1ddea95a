//! Defines [`Status`], the tri-state visibility flag shared by articles and
//! pages, and the [`Visible`] predicate that every external read path applies.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// The publication status of an [`crate::article::Article`] or a
/// [`crate::page::Page`]. Only [`Status::Published`] items are visible to
/// readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    Published,
    Draft,
    Hidden,
}

impl Default for Status {
    /// New content starts out as a draft.
    fn default() -> Self {
        Status::Draft
    }
}

impl Status {
    /// The stored integer code for the status.
    pub fn code(self) -> i32 {
        match self {
            Status::Published => 0,
            Status::Draft => 1,
            Status::Hidden => 2,
        }
    }

    pub fn from_code(code: i32) -> Option<Status> {
        match code {
            0 => Some(Status::Published),
            1 => Some(Status::Draft),
            2 => Some(Status::Hidden),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Published => "Published",
            Status::Draft => "Draft",
            Status::Hidden => "Hidden",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Status {
    type Err = UnknownStatus;

    /// Parses a status from its label (case-insensitive, `publish` is
    /// accepted as an alias) or from its integer code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i32>() {
            return Status::from_code(code).ok_or_else(|| UnknownStatus(s.to_owned()));
        }
        match trimmed.to_lowercase().as_str() {
            "published" | "publish" => Ok(Status::Published),
            "draft" => Ok(Status::Draft),
            "hidden" => Ok(Status::Hidden),
            _ => Err(UnknownStatus(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D>(deserializer: D) -> Result<Status, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse::<Status>()
            .map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

impl Serialize for Status {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

/// Returned when a string doesn't name a [`Status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "unknown status `{}` (expected Published, Draft or Hidden)",
            self.0
        )
    }
}

impl std::error::Error for UnknownStatus {}

/// Anything that carries a [`Status`]. The provided [`Visible::is_published`]
/// is the single visibility predicate used by listings, detail lookups and
/// the feed.
pub trait Visible {
    fn status(&self) -> Status;

    fn is_published(&self) -> bool {
        self.status() == Status::Published
    }
}

impl<T: Visible + ?Sized> Visible for &T {
    fn status(&self) -> Status {
        (**self).status()
    }
}

/// Keeps only the published items of `items`, preserving order.
pub fn published<I>(items: I) -> impl Iterator<Item = I::Item>
where
    I: IntoIterator,
    I::Item: Visible,
{
    items.into_iter().filter(|item| item.is_published())
}

#[cfg(test)]
mod test {
    use super::*;

    struct Item(Status);

    impl Visible for Item {
        fn status(&self) -> Status {
            self.0
        }
    }

    #[test]
    fn test_only_published_is_visible() {
        assert!(Item(Status::Published).is_published());
        assert!(!Item(Status::Draft).is_published());
        assert!(!Item(Status::Hidden).is_published());
    }

    #[test]
    fn test_published_filters_and_keeps_order() {
        let items = vec![
            Item(Status::Hidden),
            Item(Status::Published),
            Item(Status::Draft),
            Item(Status::Published),
        ];
        assert_eq!(2, published(&items).count());
        assert!(published(items.iter()).all(|i| i.is_published()));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(Ok(Status::Published), "Publish".parse::<Status>());
        assert_eq!(Ok(Status::Published), "published".parse::<Status>());
        assert_eq!(Ok(Status::Hidden), " HIDDEN ".parse::<Status>());
        assert_eq!(Ok(Status::Draft), "1".parse::<Status>());
        assert!("7".parse::<Status>().is_err());
        assert!("archived".parse::<Status>().is_err());
    }

    #[test]
    fn test_codes_round_trip() {
        for status in [Status::Published, Status::Draft, Status::Hidden] {
            assert_eq!(Some(status), Status::from_code(status.code()));
        }
        assert_eq!(Status::Draft, Status::default());
    }
}

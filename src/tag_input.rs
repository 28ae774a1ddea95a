//! The admin tag field: [`parse_tags`] turns the comma-separated text an author
//! types into stored [`Tag`]s, and [`format_tags`] turns tags back into that
//! text for editing. The two are independent of each other.

use crate::store::{Error, Result, TagStore};
use crate::tag::{NewTag, Tag};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Splits `raw` on commas, trims each segment, drops empty ones and
/// lowercases the rest. Segments that differ only in case collapse into one.
pub fn normalize(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Resolves every normalized segment of `raw` to a [`Tag`], reusing existing
/// tags and creating missing ones with `name = slug = segment`. Returns the
/// tags sorted by name. Empty or blank input yields no tags.
pub fn parse_tags<S: TagStore + ?Sized>(
    raw: &str,
    store: &S,
    now: DateTime<Utc>,
) -> Result<Vec<Tag>> {
    normalize(raw)
        .into_iter()
        .map(|name| get_or_create(store, name, now))
        .collect()
}

/// Looks a tag up by name and creates it if it's missing. If another writer
/// creates the same tag between the lookup and the insert, the store reports
/// a conflict and the winner's row is fetched instead.
fn get_or_create<S: TagStore + ?Sized>(
    store: &S,
    name: String,
    now: DateTime<Utc>,
) -> Result<Tag> {
    if let Some(tag) = store.tag_by_name(&name)? {
        return Ok(tag);
    }
    let new = NewTag {
        slug: name.clone(),
        name,
    };
    match store.create_tag(new, now) {
        Ok(tag) => {
            tracing::debug!(tag = %tag.name, "created tag");
            Ok(tag)
        }
        Err(Error::Conflict { entity, name }) => {
            tracing::debug!(tag = %name, "tag created concurrently, reusing it");
            store
                .tag_by_name(&name)?
                .ok_or(Error::Conflict { entity, name })
        }
        Err(err) => Err(err),
    }
}

/// Joins tag names with `", "`, the text shown in the admin tag field.
pub fn format_tags<'a, I>(tags: I) -> String
where
    I: IntoIterator<Item = &'a Tag>,
{
    tags.into_iter()
        .map(|tag| tag.name.as_str())
        .collect::<Vec<&str>>()
        .join(", ")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::Id;
    use chrono::TimeZone;
    use std::cell::Cell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2019, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_case_variants_collapse() -> Result<()> {
        let store = MemoryStore::new();
        let tags = parse_tags("Python, python, PYTHON", &store, now())?;
        assert_eq!(1, tags.len());
        assert_eq!("python", tags[0].name);
        assert_eq!("python", tags[0].slug);
        assert_eq!(1, store.tags()?.len());
        Ok(())
    }

    #[test]
    fn test_empty_input() -> Result<()> {
        let store = MemoryStore::new();
        assert!(parse_tags("", &store, now())?.is_empty());
        assert!(parse_tags(" , ,  ", &store, now())?.is_empty());
        assert!(store.tags()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_existing_tags_reused() -> Result<()> {
        let store = MemoryStore::new();
        let first = parse_tags("rust, web", &store, now())?;
        let second = parse_tags(" Web ,Rust,cli", &store, now())?;
        assert_eq!(3, store.tags()?.len());
        let names: Vec<&str> = second.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(vec!["cli", "rust", "web"], names);
        let first_ids: Vec<Id> = first.iter().map(|t| t.id).collect();
        assert!(second
            .iter()
            .filter(|t| t.name != "cli")
            .all(|t| first_ids.contains(&t.id)));
        Ok(())
    }

    /// Hides an existing tag from the first lookup, as if it was inserted by
    /// another request right after that lookup ran.
    struct Racy {
        inner: MemoryStore,
        hidden: Cell<bool>,
    }

    impl TagStore for Racy {
        fn create_tag(&self, new: NewTag, now: DateTime<Utc>) -> Result<Tag> {
            self.inner.create_tag(new, now)
        }

        fn tag(&self, id: Id) -> Result<Option<Tag>> {
            self.inner.tag(id)
        }

        fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
            if self.hidden.replace(false) {
                return Ok(None);
            }
            self.inner.tag_by_name(name)
        }

        fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
            self.inner.tag_by_slug(slug)
        }

        fn tags(&self) -> Result<Vec<Tag>> {
            self.inner.tags()
        }
    }

    #[test]
    fn test_conflict_resolves_to_existing_tag() -> Result<()> {
        let store = Racy {
            inner: MemoryStore::new(),
            hidden: Cell::new(false),
        };
        let existing = parse_tags("python", &store, now())?.remove(0);

        store.hidden.set(true);
        let tags = parse_tags("Python", &store, now())?;
        assert_eq!(1, tags.len());
        assert_eq!(existing.id, tags[0].id);
        assert_eq!(1, store.tags()?.len());
        Ok(())
    }

    #[test]
    fn test_format_tags() -> Result<()> {
        let store = MemoryStore::new();
        let tags = parse_tags("web, Rust", &store, now())?;
        assert_eq!("rust, web", format_tags(&tags));
        assert_eq!("", format_tags(Vec::<Tag>::new().iter()));
        Ok(())
    }
}

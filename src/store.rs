//! The repository interface. One trait per entity, each with the queries the
//! blog needs (by id, by slug, by status, by category, by tag). Queries
//! return owned values in each entity's default order:
//!
//! * categories and tags: name ascending
//! * articles: `published_time` descending, then id descending
//! * pages: rank descending, then `created_time` descending, then id
//!   descending
//!
//! [`crate::memory::MemoryStore`] is the bundled implementation; anything
//! else that implements [`Store`] can be swapped in.

use crate::article::{Article, NewArticle};
use crate::category::{Category, NewCategory};
use crate::page::{NewPage, Page};
use crate::status::Status;
use crate::tag::{NewTag, Tag};
use chrono::{DateTime, Utc};
use std::fmt;

/// Row identifier. Ids are assigned by the store on insert.
pub type Id = u64;

pub trait CategoryStore {
    /// Stores a new category. Returns [`Error::Conflict`] if a category with
    /// the same name already exists, or [`Error::SlugConflict`] if one has the
    /// same slug.
    fn create_category(&self, new: NewCategory, now: DateTime<Utc>) -> Result<Category>;

    /// Replaces a stored category. Returns [`Error::Conflict`] or
    /// [`Error::SlugConflict`] if the new name or slug belongs to another
    /// category.
    fn update_category(&self, category: &Category) -> Result<()>;

    fn category(&self, id: Id) -> Result<Option<Category>>;

    fn category_by_name(&self, name: &str) -> Result<Option<Category>>;

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    fn categories(&self) -> Result<Vec<Category>>;
}

pub trait TagStore {
    /// Stores a new tag. Returns [`Error::Conflict`] if a tag with the same
    /// name already exists.
    fn create_tag(&self, new: NewTag, now: DateTime<Utc>) -> Result<Tag>;

    fn tag(&self, id: Id) -> Result<Option<Tag>>;

    fn tag_by_name(&self, name: &str) -> Result<Option<Tag>>;

    fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>>;

    fn tags(&self) -> Result<Vec<Tag>>;
}

pub trait ArticleStore {
    /// Stores a new article. Returns [`Error::Missing`] if its category or
    /// one of its tags doesn't exist.
    fn insert_article(&self, new: NewArticle) -> Result<Article>;

    /// Replaces a stored article, with the same checks as
    /// [`ArticleStore::insert_article`].
    fn update_article(&self, article: &Article) -> Result<()>;

    fn delete_article(&self, id: Id) -> Result<()>;

    fn article(&self, id: Id) -> Result<Option<Article>>;

    fn articles_by_slug(&self, slug: &str) -> Result<Vec<Article>>;

    fn articles_by_status(&self, status: Status) -> Result<Vec<Article>>;

    fn articles_by_category(&self, category: Id, status: Status) -> Result<Vec<Article>>;

    fn articles_by_tag(&self, tag: Id, status: Status) -> Result<Vec<Article>>;
}

pub trait PageStore {
    fn insert_page(&self, new: NewPage) -> Result<Page>;

    fn update_page(&self, page: &Page) -> Result<()>;

    fn delete_page(&self, id: Id) -> Result<()>;

    fn page(&self, id: Id) -> Result<Option<Page>>;

    fn pages_by_slug(&self, slug: &str) -> Result<Vec<Page>>;

    fn pages_by_status(&self, status: Status) -> Result<Vec<Page>>;
}

/// A complete store: every entity repository at once.
pub trait Store: CategoryStore + TagStore + ArticleStore + PageStore {}

impl<T> Store for T where T: CategoryStore + TagStore + ArticleStore + PageStore {}

/// The result of a store operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when a unique name is already taken.
    Conflict { entity: &'static str, name: String },

    /// Returned when a unique slug is already taken.
    SlugConflict { entity: &'static str, slug: String },

    /// Returned when a referenced row doesn't exist.
    Missing { entity: &'static str, id: Id },

    /// Returned when the store's lock was poisoned by a panicking writer.
    Poisoned,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Conflict { entity, name } => {
                write!(f, "{} with name `{}` already exists", entity, name)
            }
            Error::SlugConflict { entity, slug } => {
                write!(f, "{} with slug `{}` already exists", entity, slug)
            }
            Error::Missing { entity, id } => write!(f, "no {} with id {}", entity, id),
            Error::Poisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl std::error::Error for Error {}

//! Admin input and its validation. A form is what an author submits; cleaning
//! it checks lengths and slugs and derives a slug from the name or title when
//! none was given. Nothing is written until a form is clean.

use crate::page::DEFAULT_RANK;
use crate::status::Status;
use crate::store::Id;
use chrono::{DateTime, Utc};
use std::fmt;

pub const NAME_MAX_LENGTH: usize = 40;
pub const TITLE_MAX_LENGTH: usize = 100;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryForm {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagForm {
    pub name: String,
    pub slug: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleForm {
    pub category: Id,
    pub title: String,
    pub slug: Option<String>,
    /// Raw Markdown.
    pub content: String,
    /// Comma-separated tag names, see [`crate::tag_input::parse_tags`].
    pub tags: String,
    pub status: Status,
    /// Defaults to the time of the save that creates the article.
    pub published_time: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageForm {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub rank: i32,
    pub status: Status,
}

impl Default for PageForm {
    fn default() -> Self {
        PageForm {
            title: String::new(),
            slug: None,
            content: String::new(),
            rank: DEFAULT_RANK,
            status: Status::default(),
        }
    }
}

/// A cleaned name or title with its slug.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Named {
    pub name: String,
    pub slug: String,
}

impl CategoryForm {
    pub fn clean(&self) -> Result<Named> {
        clean_named("name", &self.name, self.slug.as_deref(), NAME_MAX_LENGTH)
    }
}

impl TagForm {
    /// Tag names are stored lowercased, like the ones the tag parser creates.
    pub fn clean(&self) -> Result<Named> {
        clean_named(
            "name",
            &self.name.to_lowercase(),
            self.slug.as_deref(),
            NAME_MAX_LENGTH,
        )
    }
}

impl ArticleForm {
    pub fn clean(&self) -> Result<Named> {
        require("content", &self.content)?;
        clean_named("title", &self.title, self.slug.as_deref(), TITLE_MAX_LENGTH)
    }
}

impl PageForm {
    pub fn clean(&self) -> Result<Named> {
        require("content", &self.content)?;
        clean_named("title", &self.title, self.slug.as_deref(), TITLE_MAX_LENGTH)
    }
}

fn require(field: &'static str, value: &str) -> Result<()> {
    match value.trim().is_empty() {
        true => Err(ValidationError::new(field, "This field is required.")),
        false => Ok(()),
    }
}

fn clean_named(
    field: &'static str,
    name: &str,
    slug: Option<&str>,
    max_length: usize,
) -> Result<Named> {
    let name = name.trim();
    require(field, name)?;
    check_length(field, name, max_length)?;
    let slug = match slug.map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => validate_slug(slug)?,
        None => {
            let derived = slug::slugify(name);
            if derived.is_empty() {
                return Err(ValidationError::new(
                    "slug",
                    "Could not derive a slug; please enter one.",
                ));
            }
            derived
        }
    };
    check_length("slug", &slug, max_length)?;
    Ok(Named {
        name: name.to_owned(),
        slug,
    })
}

fn check_length(field: &'static str, value: &str, max_length: usize) -> Result<()> {
    let length = value.chars().count();
    match length > max_length {
        true => Err(ValidationError::new(
            field,
            format!(
                "Ensure this value has at most {} characters (it has {}).",
                max_length, length
            ),
        )),
        false => Ok(()),
    }
}

/// Accepts letters, numbers, underscores and hyphens.
pub fn validate_slug(slug: &str) -> Result<String> {
    match !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        true => Ok(slug.to_owned()),
        false => Err(ValidationError::new(
            "slug",
            "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
        )),
    }
}

/// The result of cleaning a form.
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Returned when a form field doesn't validate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> ValidationError {
        ValidationError {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

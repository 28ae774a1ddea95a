//! The [`Blog`] service ties a [`Store`] to a [`Render`]er. This module holds
//! the admin write path; the reader-facing read path lives in
//! [`crate::listing`].
//!
//! Every write follows the same order: clean the form, read the clock once,
//! render the Markdown, resolve tags, then hand a single row to the store. A
//! form that doesn't validate or Markdown that doesn't render never reaches
//! the store.

use crate::article::{Article, ArticleFields, NewArticle};
use crate::category::{Category, NewCategory};
use crate::forms::{ArticleForm, CategoryForm, PageForm, TagForm, ValidationError};
use crate::markdown::{self, Markdown, Render};
use crate::page::{NewPage, Page, PageFields};
use crate::store::{self, Id, Store};
use crate::tag::{NewTag, Tag};
use crate::tag_input::{format_tags, parse_tags};
use chrono::{DateTime, Utc};
use std::fmt;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The blog: content stored in `S`, rendered with `R`.
pub struct Blog<S, R = Markdown> {
    pub(crate) store: S,
    pub(crate) renderer: R,
    pub(crate) page_size: usize,
    clock: fn() -> DateTime<Utc>,
}

impl<S: Store, R: Render> Blog<S, R> {
    pub fn new(store: S, renderer: R) -> Blog<S, R> {
        Blog {
            store,
            renderer,
            page_size: DEFAULT_PAGE_SIZE,
            clock: Utc::now,
        }
    }

    /// Sets the number of articles per listing page.
    pub fn with_page_size(mut self, page_size: usize) -> Blog<S, R> {
        self.page_size = page_size.max(1);
        self
    }

    /// Replaces the clock used to stamp created, published and updated times.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Blog<S, R> {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn create_category(&self, form: &CategoryForm) -> Result<Category> {
        let named = form.clean()?;
        let category = self.store.create_category(
            NewCategory {
                name: named.name,
                slug: named.slug,
            },
            self.now(),
        )?;
        tracing::info!(id = category.id, name = %category.name, "created category");
        Ok(category)
    }

    pub fn update_category(&self, id: Id, form: &CategoryForm) -> Result<Category> {
        let named = form.clean()?;
        let mut category = self.store.category(id)?.ok_or(Error::NotFound)?;
        category.name = named.name;
        category.slug = named.slug;
        category.updated_time = self.now();
        self.store.update_category(&category)?;
        Ok(category)
    }

    /// Creates a tag from the admin. Unlike [`parse_tags`], a duplicate name
    /// is reported to the caller.
    pub fn create_tag(&self, form: &TagForm) -> Result<Tag> {
        let named = form.clean()?;
        let tag = self.store.create_tag(
            NewTag {
                name: named.name,
                slug: named.slug,
            },
            self.now(),
        )?;
        tracing::info!(id = tag.id, name = %tag.name, "created tag");
        Ok(tag)
    }

    pub fn create_article(&self, form: &ArticleForm) -> Result<Article> {
        let named = form.clean()?;
        self.require_category(form.category)?;
        let now = self.now();
        let fields = ArticleFields {
            category: form.category,
            title: named.name,
            slug: named.slug,
            status: form.status,
            published_time: form.published_time.unwrap_or(now),
        };
        let new = NewArticle::render(fields, &form.content, &self.renderer, now)?;
        let tags = parse_tags(&form.tags, &self.store, now)?;
        let article = self
            .store
            .insert_article(new.with_tags(tags.iter().map(|t| t.id)))?;
        tracing::info!(id = article.id, slug = %article.slug, status = %article.status, "created article");
        Ok(article)
    }

    /// Saves `form` over the article `id`. The content is rendered again on
    /// every save; if that fails the stored article is left untouched.
    pub fn update_article(&self, id: Id, form: &ArticleForm) -> Result<Article> {
        let named = form.clean()?;
        let mut article = self.store.article(id)?.ok_or(Error::NotFound)?;
        self.require_category(form.category)?;
        let now = self.now();
        article.set_content(&form.content, &self.renderer)?;
        let tags = parse_tags(&form.tags, &self.store, now)?;
        article.set_fields(ArticleFields {
            category: form.category,
            title: named.name,
            slug: named.slug,
            status: form.status,
            published_time: form.published_time.unwrap_or(article.published_time),
        });
        article.set_tags(tags.iter().map(|t| t.id));
        article.updated_time = now;
        self.store.update_article(&article)?;
        tracing::info!(id = article.id, slug = %article.slug, status = %article.status, "updated article");
        Ok(article)
    }

    pub fn delete_article(&self, id: Id) -> Result<()> {
        match self.store.delete_article(id) {
            Err(store::Error::Missing { .. }) => Err(Error::NotFound),
            result => {
                result?;
                tracing::info!(id, "deleted article");
                Ok(())
            }
        }
    }

    /// The admin form for an existing article, with its tags formatted back
    /// into comma-separated text.
    pub fn article_form(&self, id: Id) -> Result<ArticleForm> {
        let article = self.store.article(id)?.ok_or(Error::NotFound)?;
        let mut tags = Vec::with_capacity(article.tags().len());
        for tag in article.tags() {
            tags.extend(self.store.tag(*tag)?);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(ArticleForm {
            category: article.category,
            title: article.title.clone(),
            slug: Some(article.slug.clone()),
            content: article.content().markdown().to_owned(),
            tags: format_tags(&tags),
            status: article.status,
            published_time: Some(article.published_time),
        })
    }

    pub fn create_page(&self, form: &PageForm) -> Result<Page> {
        let named = form.clean()?;
        let fields = PageFields {
            title: named.name,
            slug: named.slug,
            rank: form.rank,
            status: form.status,
        };
        let new = NewPage::render(fields, &form.content, &self.renderer, self.now())?;
        let page = self.store.insert_page(new)?;
        tracing::info!(id = page.id, slug = %page.slug, status = %page.status, "created page");
        Ok(page)
    }

    pub fn update_page(&self, id: Id, form: &PageForm) -> Result<Page> {
        let named = form.clean()?;
        let mut page = self.store.page(id)?.ok_or(Error::NotFound)?;
        page.set_content(&form.content, &self.renderer)?;
        page.set_fields(PageFields {
            title: named.name,
            slug: named.slug,
            rank: form.rank,
            status: form.status,
        });
        page.updated_time = self.now();
        self.store.update_page(&page)?;
        tracing::info!(id = page.id, slug = %page.slug, "updated page");
        Ok(page)
    }

    pub fn delete_page(&self, id: Id) -> Result<()> {
        match self.store.delete_page(id) {
            Err(store::Error::Missing { .. }) => Err(Error::NotFound),
            result => {
                result?;
                tracing::info!(id, "deleted page");
                Ok(())
            }
        }
    }

    fn require_category(&self, id: Id) -> Result<Category> {
        self.store
            .category(id)?
            .ok_or_else(|| Error::Invalid(ValidationError::new("category", "Select a valid category.")))
    }
}

/// The result of a blog operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed blog operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when a lookup finds nothing, or finds something readers
    /// aren't allowed to see. The two cases are deliberately the same.
    NotFound,

    /// Returned when admin input doesn't validate.
    Invalid(ValidationError),

    /// Returned when Markdown fails to render; nothing was saved.
    Render(markdown::Error),

    /// Returned for store failures, including name conflicts.
    Store(store::Error),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound)
    }

    /// The HTTP status a web layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound => 404,
            Error::Invalid(_) => 400,
            Error::Store(store::Error::Conflict { .. })
            | Error::Store(store::Error::SlugConflict { .. }) => 409,
            Error::Render(_) | Error::Store(_) => 500,
        }
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "not found"),
            Error::Invalid(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::Store(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound => None,
            Error::Invalid(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::Store(err) => Some(err),
        }
    }
}

impl From<ValidationError> for Error {
    fn from(err: ValidationError) -> Error {
        Error::Invalid(err)
    }
}

impl From<markdown::Error> for Error {
    fn from(err: markdown::Error) -> Error {
        Error::Render(err)
    }
}

impl From<store::Error> for Error {
    fn from(err: store::Error) -> Error {
        Error::Store(err)
    }
}

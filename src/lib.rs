//! The library code for the `selfblog` personal blog. The architecture can be
//! generally broken down into three layers:
//!
//! 1. The content model: categories, tags, articles and pages
//!    ([`crate::category`], [`crate::tag`], [`crate::article`],
//!    [`crate::page`]), kept in a [`crate::store::Store`] such as
//!    [`crate::memory::MemoryStore`].
//! 2. The [`crate::blog::Blog`] service. Its write path ([`crate::blog`])
//!    validates forms ([`crate::forms`]), renders Markdown to HTML
//!    ([`crate::markdown`]) and resolves comma-separated tag input
//!    ([`crate::tag_input`]) before anything is saved. Its read path
//!    ([`crate::listing`]) only ever returns published content, paginated
//!    with [`crate::paging`].
//! 3. Publishing: every reader-facing [`crate::url::Route`] becomes a
//!    [`crate::views::View`], which [`crate::write`] templates to disk next
//!    to an Atom feed ([`crate::feed`]).
//!
//! [`crate::build::build_site`] ties it together: it loads the project
//! configuration ([`crate::config`]), imports the content directory
//! ([`crate::import`]) through the write path, and writes the site.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod article;
pub mod blog;
pub mod build;
pub mod category;
pub mod config;
pub mod feed;
pub mod forms;
pub mod import;
pub mod listing;
pub mod markdown;
pub mod memory;
pub mod page;
pub mod paging;
pub mod status;
pub mod store;
pub mod tag;
pub mod tag_input;
pub mod url;
pub mod value;
pub mod views;
pub mod write;

//! Support for creating Atom feeds from a list of articles.

use crate::article::Article;
use crate::status::published;
use crate::url::{Route, Routes};
use atom_syndication::{Content, Entry, Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Deserialize;
use std::fmt;
use std::io::Write;

/// The feed's author, also used for every entry.
#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Author {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    pub title: String,
    pub author: Option<Author>,
    pub routes: &'a Routes,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Article`]s and writes the result to a [`std::io::Write`]. Unpublished
/// articles are skipped.
pub fn write_feed<W: Write>(config: &FeedConfig, articles: &[Article], w: W) -> Result<()> {
    feed(config, articles)?.write_to(w)?;
    Ok(())
}

/// Builds the feed. Its `updated` time is the most recent `updated_time` of
/// the included articles.
pub fn feed(config: &FeedConfig, articles: &[Article]) -> Result<Feed> {
    let entries = feed_entries(config, articles)?;
    let updated = published(articles)
        .map(|a| a.updated_time)
        .max()
        .unwrap_or_default();
    let home_page = config.routes.root().to_string();
    Ok(Feed {
        title: config.title.clone().into(),
        id: home_page.clone(),
        updated: fixed(updated),
        authors: author_to_people(config.author.as_ref()),
        links: vec![alternate(home_page)],
        entries,
        ..Default::default()
    })
}

fn feed_entries(config: &FeedConfig, articles: &[Article]) -> Result<Vec<Entry>> {
    let mut entries: Vec<Entry> = Vec::with_capacity(articles.len());

    for article in published(articles) {
        let url = config.routes.url(&Route::article(article))?.to_string();
        entries.push(Entry {
            id: url.clone(),
            title: article.title.clone().into(),
            updated: fixed(article.updated_time),
            published: Some(fixed(article.published_time)),
            authors: author_to_people(config.author.as_ref()),
            links: vec![alternate(url)],
            content: Some(Content {
                value: Some(article.content_html().to_owned()),
                content_type: Some(String::from("html")),
                ..Default::default()
            }),
            ..Default::default()
        })
    }
    Ok(entries)
}

fn fixed(time: DateTime<Utc>) -> DateTime<FixedOffset> {
    time.into()
}

fn alternate(href: String) -> Link {
    Link {
        href,
        rel: String::from("alternate"),
        ..Default::default()
    }
}

fn author_to_people(author: Option<&Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name.clone(),
            email: author.email.clone(),
            uri: None,
        }],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O, Atom, and
/// URL issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when an article's URL can't be built.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

//! Loads a content directory into a [`Blog`]. The directory is laid out as
//! follows:
//!
//! * `categories.yaml` (optional): a list of `{name, slug}` objects, `slug`
//!   being optional.
//! * `articles/**/*.md`: one article per file.
//! * `pages/**/*.md`: one page per file.
//!
//! Every source file is structured as follows:
//!
//! 1. Initial frontmatter fence (`---`)
//! 2. YAML frontmatter
//! 3. Terminal frontmatter fence (`---`)
//! 4. Markdown body
//!
//! For example:
//!
//! ```md
//! ---
//! Title: Django Test
//! Category: Python
//! Tags: django, python
//! Status: published
//! Date: 2017-03-05
//! ---
//! # Django Test
//! ```
//!
//! Articles take `Title`, `Category`, and optionally `Slug`, `Tags` (a
//! comma-separated string), `Status` and `Date` (`YYYY-MM-DD` or RFC 3339).
//! Pages take `Title` and optionally `Slug`, `Rank` and `Status`. An article
//! whose category isn't declared in `categories.yaml` gets it created. All
//! writes go through the blog's write path, so imported content is validated
//! and rendered like anything else.

use crate::blog::{self, Blog};
use crate::forms::{ArticleForm, CategoryForm, PageForm};
use crate::markdown::Render;
use crate::page::DEFAULT_RANK;
use crate::status::Status;
use crate::store::{self, Id, Store};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// What an import created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub categories: usize,
    pub articles: usize,
    pub pages: usize,
}

/// Imports content into a [`Blog`].
pub struct Importer<'a, S, R> {
    blog: &'a Blog<S, R>,
}

impl<'a, S: Store, R: Render> Importer<'a, S, R> {
    pub fn new(blog: &'a Blog<S, R>) -> Importer<'a, S, R> {
        Importer { blog }
    }

    /// Imports `categories.yaml`, then every article, then every page under
    /// `content_directory`. Missing files and directories are skipped.
    pub fn import(&self, content_directory: &Path) -> Result<Summary> {
        let mut summary = Summary::default();

        let categories_file = content_directory.join("categories.yaml");
        if categories_file.is_file() {
            annotate(&categories_file, || {
                for category in read_categories(&categories_file)? {
                    self.blog.create_category(&category)?;
                    summary.categories += 1;
                }
                Ok(())
            })?;
        }

        for path in markdown_files(&content_directory.join("articles"))? {
            annotate(&path, || self.import_article(&path, &mut summary))?;
            summary.articles += 1;
        }

        for path in markdown_files(&content_directory.join("pages"))? {
            annotate(&path, || self.import_page(&path))?;
            summary.pages += 1;
        }

        tracing::info!(
            categories = summary.categories,
            articles = summary.articles,
            pages = summary.pages,
            "imported content"
        );
        Ok(summary)
    }

    fn import_article(&self, path: &Path, summary: &mut Summary) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let (yaml, body) = split_frontmatter(&contents)?;
        let frontmatter: ArticleFrontmatter = serde_yaml::from_str(yaml)?;
        let category = self.category_id(&frontmatter.category, summary)?;
        let published_time = match &frontmatter.date {
            Some(date) => Some(parse_date(date)?),
            None => None,
        };
        self.blog.create_article(&ArticleForm {
            category,
            title: frontmatter.title,
            slug: frontmatter.slug,
            content: body.to_owned(),
            tags: frontmatter.tags,
            status: frontmatter.status,
            published_time,
        })?;
        Ok(())
    }

    fn import_page(&self, path: &Path) -> Result<()> {
        let contents = std::fs::read_to_string(path)?;
        let (yaml, body) = split_frontmatter(&contents)?;
        let frontmatter: PageFrontmatter = serde_yaml::from_str(yaml)?;
        self.blog.create_page(&PageForm {
            title: frontmatter.title,
            slug: frontmatter.slug,
            content: body.to_owned(),
            rank: frontmatter.rank,
            status: frontmatter.status,
        })?;
        Ok(())
    }

    /// The id of the category named `name`, creating it if it doesn't exist
    /// yet.
    fn category_id(&self, name: &str, summary: &mut Summary) -> Result<Id> {
        if let Some(category) = self.blog.store().category_by_name(name.trim())? {
            return Ok(category.id);
        }
        let category = self.blog.create_category(&CategoryForm {
            name: name.to_owned(),
            slug: None,
        })?;
        tracing::debug!(category = %category.name, "created undeclared category");
        summary.categories += 1;
        Ok(category.id)
    }
}

#[derive(Deserialize)]
struct CategoryEntry {
    name: String,

    #[serde(default)]
    slug: Option<String>,
}

fn read_categories(path: &Path) -> Result<Vec<CategoryForm>> {
    let entries: Vec<CategoryEntry> = serde_yaml::from_str(&std::fs::read_to_string(path)?)?;
    Ok(entries
        .into_iter()
        .map(|e| CategoryForm {
            name: e.name,
            slug: e.slug,
        })
        .collect())
}

#[derive(Deserialize)]
struct ArticleFrontmatter {
    #[serde(rename = "Title")]
    title: String,

    #[serde(default, rename = "Slug")]
    slug: Option<String>,

    #[serde(rename = "Category")]
    category: String,

    /// Comma-separated tag names.
    #[serde(default, rename = "Tags")]
    tags: String,

    #[serde(default, rename = "Status")]
    status: Status,

    #[serde(default, rename = "Date")]
    date: Option<String>,
}

fn default_rank() -> i32 {
    DEFAULT_RANK
}

#[derive(Deserialize)]
struct PageFrontmatter {
    #[serde(rename = "Title")]
    title: String,

    #[serde(default, rename = "Slug")]
    slug: Option<String>,

    #[serde(default = "default_rank", rename = "Rank")]
    rank: i32,

    #[serde(default, rename = "Status")]
    status: Status,
}

/// Splits a source file into its YAML frontmatter and its body.
fn split_frontmatter(input: &str) -> Result<(&str, &str)> {
    const FENCE: &str = "---";
    if !input.starts_with(FENCE) {
        return Err(Error::FrontmatterMissingStartFence);
    }
    let rest = &input[FENCE.len()..];
    match rest.find("\n---") {
        None => Err(Error::FrontmatterMissingEndFence),
        Some(offset) => {
            let body = &rest[offset + 1 + FENCE.len()..];
            Ok((&rest[..offset], body.trim_start_matches(|c: char| c == '\r' || c == '\n')))
        }
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or an RFC 3339 timestamp.
fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(DateTime::from_naive_utc_and_offset(midnight, Utc));
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(s.to_owned()))
}

/// The Markdown files under `dir`, sorted by path. A missing `dir` has none.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for result in WalkDir::new(dir).sort_by_file_name() {
        let entry = result?;
        if entry.file_type().is_file()
            && entry.path().extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn annotate<T>(path: &Path, f: impl FnOnce() -> Result<T>) -> Result<T> {
    f().map_err(|e| Error::Annotated(format!("importing `{}`", path.display()), Box::new(e)))
}

/// Represents the result of an import operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error importing content.
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a source file is missing its terminal frontmatter fence
    /// (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a `Date` is neither `YYYY-MM-DD` nor RFC 3339.
    InvalidDate(String),

    /// Returned when the blog rejects the imported content.
    Blog(blog::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Source file must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(date) => {
                write!(f, "Invalid date `{}`: expected YYYY-MM-DD or RFC 3339", date)
            }
            Error::Blog(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(_) => None,
            Error::Blog(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<blog::Error> for Error {
    fn from(err: blog::Error) -> Error {
        Error::Blog(err)
    }
}

impl From<store::Error> for Error {
    fn from(err: store::Error) -> Error {
        Error::Blog(err.into())
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::markdown::Markdown;
    use crate::memory::MemoryStore;
    use crate::store::{ArticleStore, CategoryStore, PageStore, TagStore};
    use chrono::TimeZone;
    use std::fs;

    fn write(dir: &Path, relative: &str, contents: &str) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_import() -> Result<()> {
        let dir = tempfile::tempdir()?;
        write(dir.path(), "categories.yaml", "- name: Python\n- name: Life\n  slug: life-notes\n");
        write(
            dir.path(),
            "articles/python/django-test.md",
            "---
Title: Django Test
Category: Python
Tags: Django, python ,,
Status: published
Date: 2017-03-05
---
# Django Test
",
        );
        write(
            dir.path(),
            "articles/rust.md",
            "---
Title: Learning Rust
Category: Rust
Date: 2018-01-02T03:04:05+01:00
---
Hello
",
        );
        write(dir.path(), "articles/notes.txt", "not an article");
        write(
            dir.path(),
            "pages/about.md",
            "---\nTitle: About\nStatus: published\nRank: 3\n---\nAbout me\n",
        );

        let blog = Blog::new(MemoryStore::new(), Markdown::new());
        let summary = Importer::new(&blog).import(dir.path())?;
        assert_eq!(
            Summary {
                categories: 3,
                articles: 2,
                pages: 1
            },
            summary
        );

        let store = blog.store();
        let life = store.category_by_name("Life")?.unwrap();
        assert_eq!("life-notes", life.slug);
        let rust = store.category_by_name("Rust")?.unwrap();
        assert_eq!("rust", rust.slug);

        let django = store.articles_by_slug("django-test")?.remove(0);
        assert_eq!(Status::Published, django.status);
        assert_eq!("<h1>Django Test</h1>\n", django.content_html());
        assert_eq!(
            Utc.with_ymd_and_hms(2017, 3, 5, 0, 0, 0).unwrap(),
            django.published_time
        );
        assert_eq!(2, django.tags().len());
        assert_eq!(2, store.tags()?.len());

        let learning = store.articles_by_slug("learning-rust")?.remove(0);
        assert_eq!(Status::Draft, learning.status);
        assert_eq!(rust.id, learning.category);
        assert_eq!(
            Utc.with_ymd_and_hms(2018, 1, 2, 2, 4, 5).unwrap(),
            learning.published_time
        );

        let about = store.pages_by_slug("about")?.remove(0);
        assert_eq!(3, about.rank);
        assert_eq!("<p>About me</p>\n", about.content_html());
        Ok(())
    }

    #[test]
    fn test_errors_name_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "articles/broken.md", "Title: No fences\n");
        let blog = Blog::new(MemoryStore::new(), Markdown::new());
        let err = Importer::new(&blog).import(dir.path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("broken.md"), "{}", message);
        assert!(message.contains("must begin with `---`"), "{}", message);
    }

    #[test]
    fn test_split_frontmatter() -> Result<()> {
        let (yaml, body) = split_frontmatter("---\nTitle: x\n---\n\nbody --- text\n")?;
        assert_eq!("\nTitle: x", yaml);
        assert_eq!("body --- text\n", body);
        assert!(matches!(
            split_frontmatter("---\nTitle: x\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
        Ok(())
    }

    #[test]
    fn test_parse_date() -> Result<()> {
        assert_eq!(
            Utc.with_ymd_and_hms(2017, 3, 5, 0, 0, 0).unwrap(),
            parse_date("2017-03-05")?
        );
        assert!(matches!(parse_date("05/03/2017"), Err(Error::InvalidDate(_))));
        Ok(())
    }
}

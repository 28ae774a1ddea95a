//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: importing the content
//! ([`crate::import`]), rendering every view ([`crate::write`]), copying the
//! theme's static directory into the output directory, and generating the
//! Atom feed. Also exports [`stats`], which loads the content the same way
//! and reports the category and tag counts.

use crate::blog::{self, Blog};
use crate::category::Category;
use crate::config::Config;
use crate::feed::{self, write_feed, FeedConfig};
use crate::import::{self, Importer};
use crate::markdown::Markdown;
use crate::memory::MemoryStore;
use crate::tag::Tag;
use crate::url::Route;
use crate::views::{Template as View, Views};
use crate::write::{self, Templates, Writer};
use gtmpl::Template;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Marks an output directory as one that [`build_site`] created and may
/// therefore delete and rebuild.
pub const WATERMARK: &str = ".selfblog";

/// Builds the site from a [`Config`] object. This calls into
/// [`Importer::import`], [`Writer::write_views`], and [`feed::write_feed`]
/// which do the heavy-lifting. This function also copies the static assets
/// from source directory to the output directory.
pub fn build_site(config: Config) -> Result<()> {
    let blog = load(&config)?;

    // Templates are parsed before the output directory is touched.
    let templates = parse_templates(&config.templates)?;

    clean_output(&config.output_directory)?;
    std::fs::create_dir_all(&config.output_directory)?;
    File::create(config.output_directory.join(WATERMARK))?;

    let views = Views::new(&blog, &config.routes, &config.title);
    let writer = Writer {
        templates: &templates,
        output_directory: &config.output_directory,
        static_url: &config.static_url,
    };
    let written = writer.write_views(&views)?;

    if config.static_source_directory.is_dir() {
        copy_dir(
            &config.static_source_directory,
            &config.static_output_directory,
        )?;
    }

    let feed_path = config.output_directory.join(Route::Feed.path());
    if let Some(dir) = feed_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    write_feed(
        &FeedConfig {
            title: config.title.clone(),
            author: config.author.clone(),
            routes: &config.routes,
        },
        &blog.published_articles()?,
        File::create(&feed_path)?,
    )?;

    tracing::info!(
        output = %config.output_directory.display(),
        pages = written,
        "built site"
    );
    Ok(())
}

/// Published article counts per category and per tag, in the order the
/// categories and tags pages list them.
#[derive(Debug)]
pub struct Stats {
    pub categories: Vec<(Category, usize)>,
    pub tags: Vec<(Tag, usize)>,
}

/// Loads the project's content and counts it.
pub fn stats(config: &Config) -> Result<Stats> {
    let blog = load(config)?;
    Ok(Stats {
        categories: blog.category_counts()?,
        tags: blog.tag_counts()?,
    })
}

/// Imports the project's content into a fresh in-memory blog.
fn load(config: &Config) -> Result<Blog<MemoryStore>> {
    let blog = Blog::new(MemoryStore::new(), Markdown::with_extensions(&config.markdown))
        .with_page_size(config.index_page_size);
    Importer::new(&blog).import(&config.content_directory)?;
    Ok(blog)
}

fn parse_templates(templates: &HashMap<View, Vec<PathBuf>>) -> Result<Templates> {
    let mut parsed = Templates::new();
    for (view, files) in templates {
        parsed.insert(*view, parse_template(files.iter())?);
    }
    Ok(parsed)
}

// Loads the template file contents, joins them with newlines, and parses the
// result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        if !contents.is_empty() {
            contents.push('\n');
        }
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &dst.join(entry.file_name()))?;
        } else {
            std::fs::copy(entry.path(), dst.join(entry.file_name()))?;
        }
    }

    Ok(())
}

/// Deletes a previous build. Refuses to delete a non-empty directory that
/// doesn't carry the [`WATERMARK`], in case the wrong output directory was
/// passed.
fn clean_output(dir: &Path) -> Result<()> {
    if dir.is_dir() && !dir.join(WATERMARK).exists() {
        let mut entries = std::fs::read_dir(dir).map_err(|err| Error::Clean {
            path: dir.to_owned(),
            err,
        })?;
        if entries.next().is_some() {
            return Err(Error::UnmanagedOutput(dir.to_owned()));
        }
    }
    rmdir(dir)
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during importing,
/// writing, cleaning output directories, parsing template files, and other
/// I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors importing the content.
    Import(import::Error),

    /// Returned for errors reading the imported content back.
    Blog(blog::Error),

    /// Returned for errors writing views to disk as HTML files.
    Write(write::Error),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned when the output directory holds files that a previous build
    /// didn't create.
    UnmanagedOutput(PathBuf),

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    Feed(feed::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Import(err) => err.fmt(f),
            Error::Blog(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::UnmanagedOutput(path) => write!(
                f,
                "Refusing to replace '{}': it is not empty and has no `{}` file",
                path.display(),
                WATERMARK
            ),
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Import(err) => Some(err),
            Error::Blog(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::UnmanagedOutput(_) => None,
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Feed(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<import::Error> for Error {
    /// Converts [`import::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: import::Error) -> Error {
        Error::Import(err)
    }
}

impl From<blog::Error> for Error {
    fn from(err: blog::Error) -> Error {
        Error::Blog(err)
    }
}

impl From<write::Error> for Error {
    /// Converts [`write::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: write::Error) -> Error {
        Error::Write(err)
    }
}

impl From<feed::Error> for Error {
    /// Converts [`feed::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

//! Templates [`View`]s and writes them to disk. A route's path becomes a
//! directory under the output directory holding an `index.html`, so the
//! generated site serves the same URLs as [`crate::url::Routes`] builds.

use crate::markdown::Render;
use crate::store::Store;
use crate::url::{encode_segment, Route};
use crate::views::{self, Template, View, Views};
use gtmpl::{Template as Compiled, Value};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

/// One parsed template per kind of view.
pub type Templates = HashMap<Template, Compiled>;

/// Responsible for templating and writing HTML pages to disk from [`Views`].
pub struct Writer<'a> {
    /// The parsed theme templates.
    pub templates: &'a Templates,

    /// The directory in which the HTML files will be written.
    pub output_directory: &'a Path,

    /// The URL for the static assets. This is made available to every
    /// template, typically for the theme's stylesheet.
    pub static_url: &'a Url,
}

impl Writer<'_> {
    /// Takes a single [`View`], templates it, and writes it to `file_path`.
    fn write_view(&self, view: View, file_path: &Path) -> Result<()> {
        let template = self
            .templates
            .get(&view.template)
            .ok_or(Error::MissingTemplate(view.template))?;
        let mut value = view.context;
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.static_url.to_string()),
            );
        }
        if let Some(dir) = file_path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        template.execute(
            &mut std::fs::File::create(file_path)?,
            &gtmpl::Context::from(value)?,
        )?;
        Ok(())
    }

    /// Writes every route of `views` plus `404.html`. Routes whose path can't
    /// safely become a file path are skipped with a warning. Returns the
    /// number of files written.
    pub fn write_views<S: Store, R: Render>(&self, views: &Views<S, R>) -> Result<usize> {
        let mut written = 0;
        for route in views.routes()? {
            let file_path = match output_path(self.output_directory, &route) {
                Some(file_path) => file_path,
                None => {
                    tracing::warn!(path = %route.path(), "skipping route with unsafe path");
                    continue;
                }
            };
            tracing::debug!(path = %file_path.display(), "writing view");
            self.write_view(views.view(&route)?, &file_path)?;
            written += 1;
        }
        self.write_view(
            views.not_found()?,
            &self.output_directory.join("404.html"),
        )?;
        Ok(written + 1)
    }
}

/// The file a route is written to: `{dir}/{route path}/index.html`, or
/// `{dir}/{route path}` for the feed. Each segment is named the way
/// [`Route::path`] encodes it, so the file sits where the route's URL points.
/// Returns `None` if a segment is empty, `.` or `..`.
pub fn output_path(dir: &Path, route: &Route) -> Option<PathBuf> {
    let mut path = dir.to_path_buf();
    for segment in route.segments() {
        let segment = encode_segment(&segment);
        if matches!(segment.as_str(), "" | "." | "..") {
            return None;
        }
        path.push(segment);
    }
    if route.is_directory() {
        path.push("index.html");
    }
    Some(path)
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// Returned when the theme has no template for a kind of view.
    MissingTemplate(Template),

    /// An error building a view.
    View(views::Error),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<views::Error> for Error {
    fn from(err: views::Error) -> Error {
        Error::View(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::MissingTemplate(template) => {
                write!(f, "Theme has no `{}` template", template)
            }
            Error::View(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::MissingTemplate(_) => None,
            Error::View(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

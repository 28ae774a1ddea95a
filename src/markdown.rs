//! Converts Markdown to HTML. Defines the [`Render`] seam, the
//! [`pulldown_cmark`]-backed [`Markdown`] renderer, and [`Content`], the pair
//! of Markdown source and rendered HTML owned by articles and pages.

use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use std::fmt;
use std::io;
use std::string::FromUtf8Error;

/// Something that converts Markdown into HTML. Implementations must be pure:
/// the same input always yields the same output.
pub trait Render {
    fn render(&self, markdown: &str) -> Result<String>;
}

impl<F> Render for F
where
    F: Fn(&str) -> Result<String>,
{
    fn render(&self, markdown: &str) -> Result<String> {
        self(markdown)
    }
}

/// Optional Markdown extensions. Fenced code blocks are part of CommonMark and
/// are always enabled; these are the extras a site can opt into from its
/// project file.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Extension {
    Tables,
    Strikethrough,
    Footnotes,
    Tasklists,
    SmartPunctuation,
}

impl Extension {
    fn option(self) -> Options {
        match self {
            Extension::Tables => Options::ENABLE_TABLES,
            Extension::Strikethrough => Options::ENABLE_STRIKETHROUGH,
            Extension::Footnotes => Options::ENABLE_FOOTNOTES,
            Extension::Tasklists => Options::ENABLE_TASKLISTS,
            Extension::SmartPunctuation => Options::ENABLE_SMART_PUNCTUATION,
        }
    }
}

/// The default [`Render`] implementation.
#[derive(Clone, Copy, Debug)]
pub struct Markdown {
    options: Options,
}

impl Default for Markdown {
    fn default() -> Self {
        Markdown::new()
    }
}

impl Markdown {
    /// A plain CommonMark renderer (fenced code blocks included).
    pub fn new() -> Markdown {
        Markdown {
            options: Options::empty(),
        }
    }

    pub fn with_extensions(extensions: &[Extension]) -> Markdown {
        let mut options = Options::empty();
        for extension in extensions {
            options.insert(extension.option());
        }
        Markdown { options }
    }
}

impl Render for Markdown {
    fn render(&self, markdown: &str) -> Result<String> {
        let mut buf: Vec<u8> = Vec::with_capacity(markdown.len() * 3 / 2);
        html::write_html(&mut buf, Parser::new_ext(markdown, self.options))?;
        Ok(String::from_utf8(buf)?)
    }
}

/// Markdown source together with its rendered HTML. The only way to build a
/// [`Content`] is [`Content::render`], so `html` always equals
/// `render(markdown)` for the renderer that built it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Content {
    markdown: String,
    html: String,
}

impl Content {
    /// Renders `markdown` and bundles it with the result. Nothing is built if
    /// rendering fails.
    pub fn render<R: Render + ?Sized>(markdown: &str, renderer: &R) -> Result<Content> {
        let html = renderer.render(markdown)?;
        Ok(Content {
            markdown: markdown.to_owned(),
            html,
        })
    }

    pub fn markdown(&self) -> &str {
        &self.markdown
    }

    pub fn html(&self) -> &str {
        &self.html
    }
}

/// The result of a rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error converting markdown to HTML.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O errors while writing the HTML.
    Io(io::Error),

    /// Returned when the HTML output isn't valid UTF-8.
    Utf8(FromUtf8Error),

    /// Returned by renderers that reject their input.
    Rejected(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "rendering markdown: {}", err),
            Error::Utf8(err) => write!(f, "rendering markdown: {}", err),
            Error::Rejected(reason) => write!(f, "rendering markdown: {}", reason),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Utf8(err) => Some(err),
            Error::Rejected(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    /// Converts a [`io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for IO operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<FromUtf8Error> for Error {
    fn from(err: FromUtf8Error) -> Error {
        Error::Utf8(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heading() -> Result<()> {
        assert_eq!(
            "<h1>Django Test</h1>\n",
            Markdown::new().render("# Django Test")?
        );
        Ok(())
    }

    #[test]
    fn test_fenced_code_block() -> Result<()> {
        let html = Markdown::new().render("```rust\nfn main() {}\n```\n")?;
        assert_eq!(
            "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n",
            html
        );
        Ok(())
    }

    #[test]
    fn test_render_is_deterministic() -> Result<()> {
        let renderer = Markdown::with_extensions(&[Extension::Tables, Extension::Footnotes]);
        let input = "Some *text*[^1]\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n[^1]: note\n";
        assert_eq!(renderer.render(input)?, renderer.render(input)?);
        Ok(())
    }

    #[test]
    fn test_extensions_are_opt_in() -> Result<()> {
        let input = "~~gone~~";
        assert!(!Markdown::new().render(input)?.contains("<del>"));
        assert!(Markdown::with_extensions(&[Extension::Strikethrough])
            .render(input)?
            .contains("<del>gone</del>"));
        Ok(())
    }

    #[test]
    fn test_content_matches_renderer() -> Result<()> {
        let renderer = Markdown::new();
        let content = Content::render("# About", &renderer)?;
        assert_eq!("# About", content.markdown());
        assert_eq!(renderer.render("# About")?, content.html());
        Ok(())
    }

    #[test]
    fn test_content_not_built_on_failure() {
        let failing = |_: &str| -> Result<String> { Err(Error::Rejected("nope".to_owned())) };
        assert!(Content::render("# About", &failing).is_err());
    }
}

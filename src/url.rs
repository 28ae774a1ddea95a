//! Maps every reader-facing view to a [`Route`], and routes to paths and
//! [`Url`]s under the site root. Slugs are arbitrary text (a tag's slug is its
//! name), so every path segment is percent-encoded: a slug never adds a
//! segment, a query or a fragment.

use crate::article::Article;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::{ParseError, Url};

/// Bytes escaped in a path segment: the URL path set plus the segment
/// separators and `%` itself.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// A reader-facing location on the site.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// The front page; page 1 is the site root.
    Index { page: usize },
    Article { year: i32, month: u32, slug: String },
    Page { slug: String },
    Archives,
    Categories,
    Category { slug: String, page: usize },
    Tags,
    Tag { slug: String, page: usize },
    Feed,
}

impl Route {
    pub fn article(article: &Article) -> Route {
        Route::Article {
            year: article.year(),
            month: article.month(),
            slug: article.slug.clone(),
        }
    }

    /// The route's path segments, unencoded.
    pub fn segments(&self) -> Vec<String> {
        match self {
            Route::Index { page } => paged(Vec::new(), *page),
            Route::Article { year, month, slug } => {
                vec![String::from("post"), year.to_string(), month.to_string(), slug.clone()]
            }
            Route::Page { slug } => vec![String::from("pages"), slug.clone()],
            Route::Archives => fixed(&["archives"]),
            Route::Categories => fixed(&["categories"]),
            Route::Category { slug, page } => {
                paged(vec![String::from("category"), slug.clone()], *page)
            }
            Route::Tags => fixed(&["tags"]),
            Route::Tag { slug, page } => paged(vec![String::from("tag"), slug.clone()], *page),
            Route::Feed => fixed(&["feeds", "atom.xml"]),
        }
    }

    /// Whether the route is a directory holding an `index.html`. Only the
    /// feed is a plain file.
    pub fn is_directory(&self) -> bool {
        !matches!(self, Route::Feed)
    }

    /// The route's path relative to the site root, each segment
    /// percent-encoded. Directory-style routes end in `/`; the root itself is
    /// the empty path.
    pub fn path(&self) -> String {
        let mut path = self
            .segments()
            .iter()
            .map(|s| encode_segment(s))
            .collect::<Vec<String>>()
            .join("/");
        if self.is_directory() && !path.is_empty() {
            path.push('/');
        }
        path
    }
}

/// Percent-encodes a single path segment.
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

fn fixed(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

fn paged(mut base: Vec<String>, page: usize) -> Vec<String> {
    if page > 1 {
        base.push(String::from("page"));
        base.push(page.to_string());
    }
    base
}

/// Resolves [`Route`]s against the site root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Routes {
    root: Url,
}

impl Routes {
    /// `root` is the site's base URL. A trailing slash is added if it's
    /// missing, since [`Url::join`] would otherwise drop the last path
    /// segment.
    pub fn new(mut root: Url) -> Routes {
        if !root.path().ends_with('/') {
            let path = format!("{}/", root.path());
            root.set_path(&path);
        }
        Routes { root }
    }

    pub fn root(&self) -> &Url {
        &self.root
    }

    /// The absolute URL of `route`. The path is already encoded, so joining
    /// it can't introduce a query or a fragment.
    pub fn url(&self, route: &Route) -> Result<Url, ParseError> {
        self.root.join(&route.path())
    }
}

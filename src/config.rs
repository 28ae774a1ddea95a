//! Loads a project's configuration. A project is a directory holding
//! `selfblog.yaml`, a `content/` directory (see [`crate::import`]) and a
//! `theme/` directory with `theme.yaml`, the templates it names, and a
//! `static/` directory of assets.

use crate::feed::Author;
use crate::markdown::Extension;
use crate::url::Routes;
use crate::views::Template;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

pub const PROJECT_FILE: &str = "selfblog.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(crate::blog::DEFAULT_PAGE_SIZE)
    }
}

#[derive(Deserialize)]
struct Project {
    pub title: String,
    pub site_root: Url,

    #[serde(default)]
    pub author: Option<Author>,

    #[serde(default)]
    pub index_page_size: PageSize,

    #[serde(default)]
    pub markdown: Vec<Extension>,
}

#[derive(Deserialize)]
struct Theme {
    templates: HashMap<Template, Vec<PathBuf>>,
}

pub struct Config {
    pub title: String,
    pub author: Option<Author>,
    pub routes: Routes,
    pub content_directory: PathBuf,
    pub templates: HashMap<Template, Vec<PathBuf>>,
    pub static_source_directory: PathBuf,
    pub static_url: Url,
    pub output_directory: PathBuf,
    pub static_output_directory: PathBuf,
    pub index_page_size: usize,
    pub markdown: Vec<Extension>,
}

impl Config {
    /// Looks for [`PROJECT_FILE`] in `dir` and then in each of its parents.
    /// Output goes to `output_directory`, or `_output` in the project
    /// directory if none is given.
    pub fn from_directory(dir: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path, output_directory)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory),
                None => Err(Error::ProjectNotFound),
            }
        }
    }

    pub fn from_project_file(path: &Path, output_directory: Option<&Path>) -> Result<Config> {
        let project: Project = parse_yaml(path)?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        let theme_dir = project_root.join("theme");
        let theme: Theme = parse_yaml(&theme_dir.join("theme.yaml"))?;
        for template in Template::ALL {
            if !theme.templates.contains_key(&template) {
                return Err(Error::MissingTemplate(template));
            }
        }

        let output_directory = match output_directory {
            Some(dir) => dir.to_owned(),
            None => project_root.join("_output"),
        };
        let routes = Routes::new(project.site_root);
        Ok(Config {
            title: project.title,
            author: project.author,
            static_url: routes.root().join("static/")?,
            routes,
            content_directory: project_root.join("content"),
            templates: theme
                .templates
                .into_iter()
                .map(|(template, relpaths)| {
                    (
                        template,
                        relpaths.iter().map(|relpath| theme_dir.join(relpath)).collect(),
                    )
                })
                .collect(),
            static_source_directory: theme_dir.join("static"),
            static_output_directory: output_directory.join("static"),
            output_directory,
            index_page_size: project.index_page_size.0.max(1),
            markdown: project.markdown,
        })
    }
}

fn parse_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| Error::Open {
        path: path.to_owned(),
        err,
    })?;
    serde_yaml::from_reader(file).map_err(|err| Error::Parse {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no parent directory holds a [`PROJECT_FILE`].
    ProjectNotFound,

    /// Returned when a configuration file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when a configuration file isn't valid YAML for its schema.
    Parse {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when `theme.yaml` doesn't list files for a template.
    MissingTemplate(Template),

    /// Returned when a URL can't be derived from `site_root`.
    Url(url::ParseError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectNotFound => {
                write!(f, "Could not find `{}` in any parent directory", PROJECT_FILE)
            }
            Error::Open { path, err } => {
                write!(f, "Opening configuration file '{}': {}", path.display(), err)
            }
            Error::Parse { path, err } => {
                write!(f, "Loading configuration file '{}': {}", path.display(), err)
            }
            Error::MissingTemplate(template) => {
                write!(f, "Theme lists no files for the `{}` template", template)
            }
            Error::Url(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::ProjectNotFound => None,
            Error::Open { path: _, err } => Some(err),
            Error::Parse { path: _, err } => Some(err),
            Error::MissingTemplate(_) => None,
            Error::Url(err) => Some(err),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    const THEME: &str = "templates:
  index: [base.html, index.html]
  article: [base.html, article.html]
  page: [base.html, page.html]
  archives: [archives.html]
  categories: [categories.html]
  category: [listing.html]
  tags: [tags.html]
  tag: [listing.html]
  not_found: [404.html]
";

    fn project(dir: &Path, project: &str, theme: &str) {
        fs::write(dir.join(PROJECT_FILE), project).unwrap();
        fs::create_dir_all(dir.join("theme")).unwrap();
        fs::write(dir.join("theme").join("theme.yaml"), theme).unwrap();
    }

    #[test]
    fn test_from_nested_directory() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        project(
            dir.path(),
            "title: My blog
site_root: https://example.org/blog
author:
  name: tntC4stl3
index_page_size: 5
markdown: [tables, footnotes]
",
            THEME,
        );
        let nested = dir.path().join("content").join("articles");
        fs::create_dir_all(&nested).unwrap();

        let config = Config::from_directory(&nested, None)?;
        assert_eq!("My blog", config.title);
        assert_eq!("https://example.org/blog/", config.routes.root().as_str());
        assert_eq!("https://example.org/blog/static/", config.static_url.as_str());
        assert_eq!(5, config.index_page_size);
        assert_eq!(vec![Extension::Tables, Extension::Footnotes], config.markdown);
        assert_eq!(Some("tntC4stl3"), config.author.as_ref().map(|a| a.name.as_str()));
        assert_eq!(dir.path().join("content"), config.content_directory);
        assert_eq!(dir.path().join("_output"), config.output_directory);
        assert_eq!(
            vec![
                dir.path().join("theme").join("base.html"),
                dir.path().join("theme").join("index.html")
            ],
            config.templates[&Template::Index]
        );
        Ok(())
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let dir = tempfile::tempdir().unwrap();
        project(
            dir.path(),
            "title: My blog\nsite_root: https://example.org/\n",
            THEME,
        );
        let out = dir.path().join("out");
        let config = Config::from_directory(dir.path(), Some(&out))?;
        assert_eq!(10, config.index_page_size);
        assert!(config.markdown.is_empty());
        assert!(config.author.is_none());
        assert_eq!(out.join("static"), config.static_output_directory);
        Ok(())
    }

    #[test]
    fn test_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        project(
            dir.path(),
            "title: My blog\nsite_root: https://example.org/\n",
            "templates:\n  index: [index.html]\n",
        );
        match Config::from_directory(dir.path(), None) {
            Err(Error::MissingTemplate(_)) => {}
            Err(err) => panic!("unexpected error: {}", err),
            Ok(_) => panic!("expected an error"),
        }
    }
}

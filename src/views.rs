//! Turns a [`Route`] into a [`View`]: the name of the template to apply and
//! the [`Value`] to apply it to. Every view's value has a `site` object
//! (`title`, `home`, `feed`, `archives`, `categories`, `tags` and the
//! published `pages` for navigation) and an `item`. Paginated views also
//! have `prev`, `next` and `page` (`number`, `num_pages`, `count`).

use crate::article::Article;
use crate::blog::{self, Blog};
use crate::markdown::Render;
use crate::paging::{num_pages, Paginated};
use crate::store::Store;
use crate::url::{Route, Routes};
use crate::value::{self, object, optional_url};
use gtmpl_value::Value;
use serde::Deserialize;
use std::fmt;
use url::ParseError;

/// The templates a theme provides, one per kind of view.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    Index,
    Article,
    Page,
    Archives,
    Categories,
    Category,
    Tags,
    Tag,
    NotFound,
}

impl Template {
    pub const ALL: [Template; 9] = [
        Template::Index,
        Template::Article,
        Template::Page,
        Template::Archives,
        Template::Categories,
        Template::Category,
        Template::Tags,
        Template::Tag,
        Template::NotFound,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Template::Index => "index",
            Template::Article => "article",
            Template::Page => "page",
            Template::Archives => "archives",
            Template::Categories => "categories",
            Template::Category => "category",
            Template::Tags => "tags",
            Template::Tag => "tag",
            Template::NotFound => "not_found",
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A template together with the value to execute it against.
#[derive(Clone, Debug)]
pub struct View {
    pub template: Template,
    pub context: Value,
}

/// Builds [`View`]s from a [`Blog`].
pub struct Views<'a, S, R> {
    blog: &'a Blog<S, R>,
    routes: &'a Routes,
    title: &'a str,
}

impl<'a, S: Store, R: Render> Views<'a, S, R> {
    pub fn new(blog: &'a Blog<S, R>, routes: &'a Routes, title: &'a str) -> Views<'a, S, R> {
        Views {
            blog,
            routes,
            title,
        }
    }

    /// Every route that has a view: all index pages, every published article
    /// and page, archives, the category and tag overviews, and every page of
    /// the listing of each category and tag with published articles. The feed
    /// isn't a view.
    pub fn routes(&self) -> Result<Vec<Route>> {
        let page_size = self.blog.page_size();
        let articles = self.blog.published_articles()?;
        let mut routes: Vec<Route> = (1..=num_pages(articles.len(), page_size))
            .map(|page| Route::Index { page })
            .collect();
        routes.extend(articles.iter().map(Route::article));
        routes.extend(
            self.blog
                .pages()?
                .into_iter()
                .map(|p| Route::Page { slug: p.slug }),
        );
        routes.push(Route::Archives);
        routes.push(Route::Categories);
        routes.push(Route::Tags);
        for (category, count) in self.blog.category_counts()? {
            routes.extend((1..=num_pages(count, page_size)).map(|page| Route::Category {
                slug: category.slug.clone(),
                page,
            }));
        }
        for (tag, count) in self.blog.tag_counts()? {
            routes.extend((1..=num_pages(count, page_size)).map(|page| Route::Tag {
                slug: tag.slug.clone(),
                page,
            }));
        }
        Ok(routes)
    }

    /// The view for `route`. Unknown or unpublished content is
    /// [`blog::Error::NotFound`], as is the feed.
    pub fn view(&self, route: &Route) -> Result<View> {
        match route {
            Route::Index { page } => self.index(Some(&page.to_string())),
            Route::Article { year, month, slug } => self.article(*year, *month, slug),
            Route::Page { slug } => self.page(slug),
            Route::Archives => self.archives(),
            Route::Categories => self.categories(),
            Route::Category { slug, page } => self.category(slug, Some(&page.to_string())),
            Route::Tags => self.tags(),
            Route::Tag { slug, page } => self.tag(slug, Some(&page.to_string())),
            Route::Feed => Err(Error::Blog(blog::Error::NotFound)),
        }
    }

    pub fn index(&self, page: Option<&str>) -> Result<View> {
        let listing = self.blog.index(page)?;
        self.listing(Template::Index, listing, Vec::new(), |page| Route::Index {
            page,
        })
    }

    /// An article, with `prev` and `next` linking the neighbouring published
    /// articles (newer and older respectively).
    pub fn article(&self, year: i32, month: u32, slug: &str) -> Result<View> {
        let article = self.blog.article(year, month, slug)?;
        let articles = self.blog.published_articles()?;
        let (prev, next) = match articles.iter().position(|a| a.id == article.id) {
            Some(i) => (
                match i > 0 {
                    true => Some(self.routes.url(&Route::article(&articles[i - 1]))?),
                    false => None,
                },
                match articles.get(i + 1) {
                    Some(a) => Some(self.routes.url(&Route::article(a))?),
                    None => None,
                },
            ),
            None => (None, None),
        };
        Ok(View {
            template: Template::Article,
            context: object(vec![
                ("site", self.site()?),
                ("item", self.article_value(&article)?),
                ("prev", optional_url(prev.as_ref())),
                ("next", optional_url(next.as_ref())),
            ]),
        })
    }

    pub fn page(&self, slug: &str) -> Result<View> {
        let page = self.blog.page(slug)?;
        self.single(Template::Page, value::page(&page, self.routes)?)
    }

    pub fn archives(&self) -> Result<View> {
        let entries = self
            .blog
            .archives()?
            .iter()
            .map(|e| value::archive_entry(e, self.routes))
            .collect::<std::result::Result<Vec<Value>, ParseError>>()?;
        self.single(Template::Archives, Value::Array(entries))
    }

    pub fn categories(&self) -> Result<View> {
        let counts = self
            .blog
            .category_counts()?
            .iter()
            .map(|(c, n)| value::category(c, self.routes).map(|v| value::counted(v, *n)))
            .collect::<std::result::Result<Vec<Value>, ParseError>>()?;
        self.single(Template::Categories, Value::Array(counts))
    }

    pub fn tags(&self) -> Result<View> {
        let counts = self
            .blog
            .tag_counts()?
            .iter()
            .map(|(t, n)| value::tag(t, self.routes).map(|v| value::counted(v, *n)))
            .collect::<std::result::Result<Vec<Value>, ParseError>>()?;
        self.single(Template::Tags, Value::Array(counts))
    }

    /// The articles of a category. An unknown category renders as an empty
    /// listing with a `Nil` `category`.
    pub fn category(&self, slug: &str, page: Option<&str>) -> Result<View> {
        let (category, listing) = self.blog.category_articles(slug, page)?;
        let category = match &category {
            Some(c) => value::category(c, self.routes)?,
            None => Value::Nil,
        };
        self.listing(
            Template::Category,
            listing,
            vec![("category", category)],
            |page| Route::Category {
                slug: slug.to_owned(),
                page,
            },
        )
    }

    pub fn tag(&self, slug: &str, page: Option<&str>) -> Result<View> {
        let (tag, listing) = self.blog.tag_articles(slug, page)?;
        let tag = value::tag(&tag, self.routes)?;
        self.listing(Template::Tag, listing, vec![("tag", tag)], |page| {
            Route::Tag {
                slug: slug.to_owned(),
                page,
            }
        })
    }

    /// The 404 page.
    pub fn not_found(&self) -> Result<View> {
        self.single(Template::NotFound, Value::Nil)
    }

    fn single(&self, template: Template, item: Value) -> Result<View> {
        Ok(View {
            template,
            context: object(vec![("site", self.site()?), ("item", item)]),
        })
    }

    fn listing(
        &self,
        template: Template,
        listing: Paginated<Article>,
        mut extra: Vec<(&'static str, Value)>,
        route: impl Fn(usize) -> Route,
    ) -> Result<View> {
        let page_url = |page: Option<usize>| -> std::result::Result<Value, ParseError> {
            Ok(match page {
                Some(page) => value::url(&self.routes.url(&route(page))?),
                None => Value::Nil,
            })
        };
        let prev = page_url(listing.prev())?;
        let next = page_url(listing.next())?;
        let items = listing
            .items
            .iter()
            .map(|a| self.article_value(a))
            .collect::<Result<Vec<Value>>>()?;
        tracing::debug!(
            template = template.name(),
            page = listing.number,
            num_pages = listing.num_pages,
            "rendering listing"
        );
        extra.extend(vec![
            ("site", self.site()?),
            ("item", Value::Array(items)),
            ("prev", prev),
            ("next", next),
            (
                "page",
                object(vec![
                    ("number", Value::from(listing.number as u64)),
                    ("num_pages", Value::from(listing.num_pages as u64)),
                    ("count", Value::from(listing.count as u64)),
                ]),
            ),
        ]);
        Ok(View {
            template,
            context: object(extra),
        })
    }

    fn article_value(&self, article: &Article) -> Result<Value> {
        let category = self.blog.category_of(article)?;
        let tags = self.blog.tags_of(article)?;
        Ok(value::article(
            article,
            category.as_ref(),
            &tags,
            self.routes,
        )?)
    }

    fn site(&self) -> Result<Value> {
        let pages = self
            .blog
            .pages()?
            .iter()
            .map(|p| value::page(p, self.routes))
            .collect::<std::result::Result<Vec<Value>, ParseError>>()?;
        Ok(object(vec![
            ("title", value::text(self.title)),
            ("home", value::url(self.routes.root())),
            ("feed", value::url(&self.routes.url(&Route::Feed)?)),
            ("archives", value::url(&self.routes.url(&Route::Archives)?)),
            ("categories", value::url(&self.routes.url(&Route::Categories)?)),
            ("tags", value::url(&self.routes.url(&Route::Tags)?)),
            ("pages", Value::Array(pages)),
        ]))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem building a view.
#[derive(Debug)]
pub enum Error {
    /// Returned when the blog can't answer the lookup, including
    /// [`blog::Error::NotFound`].
    Blog(blog::Error),

    /// Returned when a link can't be built from the site root.
    Url(ParseError),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Blog(err) if err.is_not_found())
    }

    /// The HTTP status a server would answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Blog(err) => err.status_code(),
            Error::Url(_) => 500,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Blog(err) => err.fmt(f),
            Error::Url(err) => write!(f, "Building link: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Blog(err) => Some(err),
            Error::Url(err) => Some(err),
        }
    }
}

impl From<blog::Error> for Error {
    fn from(err: blog::Error) -> Error {
        Error::Blog(err)
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Error {
        Error::Url(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::forms::{ArticleForm, CategoryForm, PageForm};
    use crate::markdown::Markdown;
    use crate::memory::MemoryStore;
    use crate::status::Status;
    use chrono::{DateTime, TimeZone, Utc};
    use url::Url;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 20, 8, 0, 0).unwrap()
    }

    fn blog() -> Blog<MemoryStore> {
        let blog = Blog::new(MemoryStore::new(), Markdown::new())
            .with_clock(now)
            .with_page_size(2);
        let python = blog
            .create_category(&CategoryForm {
                name: "Python".to_owned(),
                slug: None,
            })
            .unwrap();
        for (day, slug, status) in [
            (1, "first", Status::Published),
            (2, "second", Status::Published),
            (3, "third", Status::Published),
            (4, "draft", Status::Draft),
        ] {
            blog.create_article(&ArticleForm {
                category: python.id,
                title: slug.to_owned(),
                slug: Some(slug.to_owned()),
                content: format!("# {}", slug),
                tags: "django, python".to_owned(),
                status,
                published_time: Some(Utc.with_ymd_and_hms(2021, 5, day, 0, 0, 0).unwrap()),
            })
            .unwrap();
        }
        blog.create_page(&PageForm {
            title: "About".to_owned(),
            slug: Some("about".to_owned()),
            content: "About me".to_owned(),
            status: Status::Published,
            ..Default::default()
        })
        .unwrap();
        blog
    }

    fn routes() -> Routes {
        Routes::new(Url::parse("https://example.org/").unwrap())
    }

    fn field<'v>(value: &'v Value, key: &str) -> &'v Value {
        match value {
            Value::Object(m) => &m[key],
            _ => panic!("not an object: {:?}", value),
        }
    }

    fn string(value: &Value) -> &str {
        match value {
            Value::String(s) => s,
            _ => panic!("not a string: {:?}", value),
        }
    }

    fn len(value: &Value) -> usize {
        match value {
            Value::Array(items) => items.len(),
            _ => panic!("not an array: {:?}", value),
        }
    }

    #[test]
    fn test_routes_cover_published_content() -> Result<()> {
        let blog = blog();
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let all = views.routes()?;
        assert!(all.contains(&Route::Index { page: 2 }));
        assert!(!all.contains(&Route::Index { page: 3 }));
        assert!(all.contains(&Route::Article {
            year: 2021,
            month: 5,
            slug: "third".to_owned()
        }));
        assert!(!all.iter().any(|r| matches!(r, Route::Article { slug, .. } if slug == "draft")));
        assert!(all.contains(&Route::Page {
            slug: "about".to_owned()
        }));
        assert!(all.contains(&Route::Tag {
            slug: "django".to_owned(),
            page: 2
        }));
        assert!(all.contains(&Route::Category {
            slug: "python".to_owned(),
            page: 1
        }));
        Ok(())
    }

    #[test]
    fn test_routes_skip_unpublished_tags_and_categories() -> Result<()> {
        let blog = blog();
        let drafts = blog.create_category(&CategoryForm {
            name: "Drafts".to_owned(),
            slug: None,
        })?;
        blog.create_article(&ArticleForm {
            category: drafts.id,
            title: "Launch".to_owned(),
            slug: None,
            content: "soon".to_owned(),
            tags: "secret-launch, python".to_owned(),
            status: Status::Hidden,
            published_time: None,
        })?;
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let all = views.routes()?;
        assert!(!all.iter().any(|r| matches!(r, Route::Tag { slug, .. } if slug == "secret-launch")));
        assert!(!all.iter().any(|r| matches!(r, Route::Category { slug, .. } if slug == "drafts")));
        assert!(all.contains(&Route::Tag {
            slug: "python".to_owned(),
            page: 2
        }));
        assert!(!all.contains(&Route::Tag {
            slug: "python".to_owned(),
            page: 3
        }));
        Ok(())
    }

    #[test]
    fn test_index_view() -> Result<()> {
        let blog = blog();
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let view = views.index(Some("NotInteger"))?;
        assert_eq!(Template::Index, view.template);
        assert_eq!(2, len(field(&view.context, "item")));
        assert!(matches!(field(&view.context, "prev"), Value::Nil));
        assert_eq!(
            "https://example.org/page/2/",
            string(field(&view.context, "next"))
        );
        let site = field(&view.context, "site");
        assert_eq!("My blog", string(field(site, "title")));
        assert_eq!(1, len(field(site, "pages")));
        Ok(())
    }

    #[test]
    fn test_article_view_links_neighbours() -> Result<()> {
        let blog = blog();
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let view = views.article(2021, 5, "second")?;
        let item = field(&view.context, "item");
        assert_eq!("<h1>second</h1>\n", string(field(item, "html")));
        assert_eq!(2, len(field(item, "tags")));
        assert_eq!(
            "https://example.org/post/2021/5/third/",
            string(field(&view.context, "prev"))
        );
        assert_eq!(
            "https://example.org/post/2021/5/first/",
            string(field(&view.context, "next"))
        );
        Ok(())
    }

    #[test]
    fn test_not_found() {
        let blog = blog();
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let err = views.article(2021, 5, "draft").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(404, err.status_code());
        assert_eq!(404, views.tag("nope", None).unwrap_err().status_code());
        assert!(views.view(&Route::Feed).unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_category_is_empty_listing() -> Result<()> {
        let blog = blog();
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let view = views.category("nope", None)?;
        assert_eq!(0, len(field(&view.context, "item")));
        assert!(matches!(field(&view.context, "category"), Value::Nil));
        Ok(())
    }

    #[test]
    fn test_counts_views() -> Result<()> {
        let blog = blog();
        let routes = routes();
        let views = Views::new(&blog, &routes, "My blog");
        let view = views.tags()?;
        assert_eq!(2, len(field(&view.context, "item")));
        let view = views.archives()?;
        assert_eq!(3, len(field(&view.context, "item")));
        Ok(())
    }
}

//! The reader-facing side of [`Blog`]: detail lookups and listings. Every
//! method here only ever returns published content. The aggregation helpers
//! ([`archive_list`], [`category_counts`], [`tag_counts`]) filter again
//! themselves, so they are safe to call on any list of articles.

use crate::article::Article;
use crate::blog::{Blog, Error, Result};
use crate::category::Category;
use crate::markdown::Render;
use crate::page::Page;
use crate::paging::{paginate, Paginated};
use crate::status::{published, Status};
use crate::store::{Id, Store};
use crate::tag::Tag;
use chrono::{DateTime, Datelike, Utc};
use std::collections::HashMap;

/// The slim projection of an article shown on the archives page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub id: Id,
    pub title: String,
    pub slug: String,
    pub published_time: DateTime<Utc>,
}

impl ArchiveEntry {
    pub fn year(&self) -> i32 {
        self.published_time.year()
    }

    pub fn month(&self) -> u32 {
        self.published_time.month()
    }
}

impl<S: Store, R: Render> Blog<S, R> {
    /// All published articles, newest first.
    pub fn published_articles(&self) -> Result<Vec<Article>> {
        Ok(self.store.articles_by_status(Status::Published)?)
    }

    /// The front page: published articles, paginated. `page` is the raw query
    /// value.
    pub fn index(&self, page: Option<&str>) -> Result<Paginated<Article>> {
        Ok(paginate(self.published_articles()?, self.page_size, page))
    }

    /// Looks up an article by its detail URL. Articles that exist but aren't
    /// published are reported as [`Error::NotFound`], same as missing ones.
    pub fn article(&self, year: i32, month: u32, slug: &str) -> Result<Article> {
        let candidates: Vec<Article> = self
            .store
            .articles_by_slug(slug)?
            .into_iter()
            .filter(|a| a.year() == year && a.month() == month)
            .collect();
        if candidates.is_empty() {
            return Err(Error::NotFound);
        }
        published(candidates).next().ok_or(Error::NotFound)
    }

    /// Looks up a page by slug, with the same visibility rule as
    /// [`Blog::article`].
    pub fn page(&self, slug: &str) -> Result<Page> {
        let candidates = self.store.pages_by_slug(slug)?;
        if candidates.is_empty() {
            return Err(Error::NotFound);
        }
        published(candidates).next().ok_or(Error::NotFound)
    }

    /// Published pages in navigation order.
    pub fn pages(&self) -> Result<Vec<Page>> {
        Ok(self.store.pages_by_status(Status::Published)?)
    }

    pub fn archives(&self) -> Result<Vec<ArchiveEntry>> {
        Ok(archive_list(&self.published_articles()?))
    }

    pub fn category_counts(&self) -> Result<Vec<(Category, usize)>> {
        Ok(category_counts(
            &self.published_articles()?,
            &self.store.categories()?,
        ))
    }

    pub fn tag_counts(&self) -> Result<Vec<(Tag, usize)>> {
        Ok(tag_counts(&self.published_articles()?, &self.store.tags()?))
    }

    /// Published articles in the category with `slug`. An unknown category is
    /// just an empty listing.
    pub fn category_articles(
        &self,
        slug: &str,
        page: Option<&str>,
    ) -> Result<(Option<Category>, Paginated<Article>)> {
        let category = self.store.category_by_slug(slug)?;
        let articles = match &category {
            Some(category) => self
                .store
                .articles_by_category(category.id, Status::Published)?,
            None => Vec::new(),
        };
        Ok((category, paginate(articles, self.page_size, page)))
    }

    /// Published articles carrying the tag with `slug`. An unknown tag is
    /// [`Error::NotFound`].
    pub fn tag_articles(&self, slug: &str, page: Option<&str>) -> Result<(Tag, Paginated<Article>)> {
        let tag = self.store.tag_by_slug(slug)?.ok_or(Error::NotFound)?;
        let articles = self.store.articles_by_tag(tag.id, Status::Published)?;
        Ok((tag, paginate(articles, self.page_size, page)))
    }

    /// The category of `article`, if it still exists.
    pub fn category_of(&self, article: &Article) -> Result<Option<Category>> {
        Ok(self.store.category(article.category)?)
    }

    /// The tags of `article`, sorted by name.
    pub fn tags_of(&self, article: &Article) -> Result<Vec<Tag>> {
        let mut tags = Vec::with_capacity(article.tags().len());
        for id in article.tags() {
            tags.extend(self.store.tag(*id)?);
        }
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tags)
    }
}

/// Projects the published `articles` for the archives page, newest first.
/// Articles published at the same instant are ordered by id, highest first.
pub fn archive_list(articles: &[Article]) -> Vec<ArchiveEntry> {
    let mut entries: Vec<ArchiveEntry> = published(articles)
        .map(|a| ArchiveEntry {
            id: a.id,
            title: a.title.clone(),
            slug: a.slug.clone(),
            published_time: a.published_time,
        })
        .collect();
    entries.sort_by(|a, b| {
        b.published_time
            .cmp(&a.published_time)
            .then(b.id.cmp(&a.id))
    });
    entries
}

/// Counts published `articles` per category. Categories without a published
/// article are left out; the rest are sorted by name.
pub fn category_counts(articles: &[Article], categories: &[Category]) -> Vec<(Category, usize)> {
    let mut counts: HashMap<Id, usize> = HashMap::new();
    for article in published(articles) {
        *counts.entry(article.category).or_insert(0) += 1;
    }
    sorted_counts(categories, &counts, |c| c.id, |c| &c.name)
}

/// Counts published `articles` per tag. An article with several tags counts
/// once towards each of them.
pub fn tag_counts(articles: &[Article], tags: &[Tag]) -> Vec<(Tag, usize)> {
    let mut counts: HashMap<Id, usize> = HashMap::new();
    for article in published(articles) {
        for tag in article.tags() {
            *counts.entry(*tag).or_insert(0) += 1;
        }
    }
    sorted_counts(tags, &counts, |t| t.id, |t| &t.name)
}

fn sorted_counts<T: Clone>(
    rows: &[T],
    counts: &HashMap<Id, usize>,
    id: impl Fn(&T) -> Id,
    name: impl Fn(&T) -> &String,
) -> Vec<(T, usize)> {
    let mut result: Vec<(T, usize)> = rows
        .iter()
        .filter_map(|row| match counts.get(&id(row)) {
            Some(count) if *count > 0 => Some((row.clone(), *count)),
            _ => None,
        })
        .collect();
    result.sort_by(|(a, _), (b, _)| name(a).cmp(name(b)).then(id(a).cmp(&id(b))));
    result
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::forms::{ArticleForm, CategoryForm, PageForm};
    use crate::markdown::Markdown;
    use crate::memory::MemoryStore;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 5, 20, 8, 0, 0).unwrap()
    }

    fn blog() -> Blog<MemoryStore> {
        Blog::new(MemoryStore::new(), Markdown::new()).with_clock(now)
    }

    fn category(blog: &Blog<MemoryStore>, name: &str) -> Category {
        blog.create_category(&CategoryForm {
            name: name.to_owned(),
            slug: None,
        })
        .unwrap()
    }

    fn post(
        blog: &Blog<MemoryStore>,
        category: Id,
        slug: &str,
        tags: &str,
        status: Status,
        day: u32,
    ) -> Article {
        blog.create_article(&ArticleForm {
            category,
            title: slug.to_owned(),
            slug: Some(slug.to_owned()),
            content: format!("# {}", slug),
            tags: tags.to_owned(),
            status,
            published_time: Some(Utc.with_ymd_and_hms(2021, 5, day, 0, 0, 0).unwrap()),
        })
        .unwrap()
    }

    #[test]
    fn test_only_published_articles_are_listed() -> Result<()> {
        let blog = blog();
        let python = category(&blog, "Python");
        post(&blog, python.id, "django-test", "", Status::Published, 1);
        post(&blog, python.id, "django-test-1", "", Status::Draft, 2);
        post(&blog, python.id, "django-test-2", "", Status::Hidden, 3);

        let index = blog.index(None)?;
        assert_eq!(1, index.items.len());
        assert_eq!("django-test", index.items[0].slug);
        assert_eq!(1, blog.archives()?.len());
        assert_eq!(1, blog.category_articles("python", None)?.1.count);
        Ok(())
    }

    #[test]
    fn test_detail_hides_unpublished() -> Result<()> {
        let blog = blog();
        let python = category(&blog, "Python");
        let published = post(&blog, python.id, "django-test", "", Status::Published, 1);
        post(&blog, python.id, "django-test-1", "", Status::Draft, 2);
        post(&blog, python.id, "django-test-2", "", Status::Hidden, 3);

        assert_eq!(published, blog.article(2021, 5, "django-test")?);
        assert!(blog.article(2021, 5, "django-test-1").unwrap_err().is_not_found());
        assert!(blog.article(2021, 5, "django-test-2").unwrap_err().is_not_found());
        assert!(blog.article(2021, 5, "missing").unwrap_err().is_not_found());
        Ok(())
    }

    #[test]
    fn test_detail_checks_year_and_month() {
        let blog = blog();
        let python = category(&blog, "Python");
        post(&blog, python.id, "django-test", "", Status::Published, 1);
        assert!(blog.article(2021, 6, "django-test").unwrap_err().is_not_found());
        assert!(blog.article(2020, 5, "django-test").unwrap_err().is_not_found());
    }

    #[test]
    fn test_page_detail_hides_unpublished() -> Result<()> {
        let blog = blog();
        blog.create_page(&PageForm {
            title: String::from("About"),
            content: String::from("# About"),
            status: Status::Published,
            ..PageForm::default()
        })?;
        blog.create_page(&PageForm {
            title: String::from("Secret"),
            content: String::from("# Secret"),
            status: Status::Hidden,
            ..PageForm::default()
        })?;
        assert_eq!("<h1>About</h1>\n", blog.page("about")?.content_html());
        assert!(blog.page("secret").unwrap_err().is_not_found());
        assert_eq!(1, blog.pages()?.len());
        Ok(())
    }

    #[test]
    fn test_category_counts_skip_empty_categories() -> Result<()> {
        let blog = blog();
        let rust = category(&blog, "Rust");
        let python = category(&blog, "Python");
        post(&blog, python.id, "a", "", Status::Published, 1);
        post(&blog, rust.id, "b", "", Status::Draft, 2);

        let counts = blog.category_counts()?;
        assert_eq!(1, counts.len());
        assert_eq!("Python", counts[0].0.name);
        assert_eq!(1, counts[0].1);
        Ok(())
    }

    #[test]
    fn test_category_counts_sorted_by_name() -> Result<()> {
        let blog = blog();
        let rust = category(&blog, "Rust");
        let go = category(&blog, "Go");
        post(&blog, rust.id, "a", "", Status::Published, 1);
        post(&blog, go.id, "b", "", Status::Published, 2);
        post(&blog, rust.id, "c", "", Status::Published, 3);

        let counts: Vec<(String, usize)> = blog
            .category_counts()?
            .into_iter()
            .map(|(c, n)| (c.name, n))
            .collect();
        assert_eq!(
            vec![(String::from("Go"), 1), (String::from("Rust"), 2)],
            counts
        );
        Ok(())
    }

    #[test]
    fn test_tag_counts() -> Result<()> {
        let blog = blog();
        let python = category(&blog, "Python");
        post(&blog, python.id, "one", "B, A", Status::Published, 1);
        post(&blog, python.id, "two", "a", Status::Published, 2);
        post(&blog, python.id, "three", "b", Status::Published, 3);
        post(&blog, python.id, "four", "C", Status::Hidden, 4);

        let counts: Vec<(String, usize)> = blog
            .tag_counts()?
            .into_iter()
            .map(|(t, n)| (t.name, n))
            .collect();
        assert_eq!(
            vec![(String::from("a"), 2), (String::from("b"), 2)],
            counts
        );
        Ok(())
    }

    #[test]
    fn test_archives_newest_first() -> Result<()> {
        let blog = blog();
        let python = category(&blog, "Python");
        let old = post(&blog, python.id, "old", "", Status::Published, 1);
        let tie_a = post(&blog, python.id, "tie-a", "", Status::Published, 9);
        let tie_b = post(&blog, python.id, "tie-b", "", Status::Published, 9);

        let ids: Vec<Id> = blog.archives()?.iter().map(|e| e.id).collect();
        assert_eq!(vec![tie_b.id, tie_a.id, old.id], ids);
        Ok(())
    }

    #[test]
    fn test_aggregations_ignore_unpublished_input() {
        let blog = blog();
        let python = category(&blog, "Python");
        let hidden = post(&blog, python.id, "h", "x", Status::Hidden, 1);
        let articles = vec![hidden];
        assert!(archive_list(&articles).is_empty());
        assert!(category_counts(&articles, &[python]).is_empty());
    }

    #[test]
    fn test_tag_articles() -> Result<()> {
        let blog = blog();
        let python = category(&blog, "Python");
        post(&blog, python.id, "one", "web", Status::Published, 1);
        post(&blog, python.id, "two", "web", Status::Draft, 2);
        post(&blog, python.id, "three", "cli", Status::Published, 3);

        let (tag, page) = blog.tag_articles("web", None)?;
        assert_eq!("web", tag.name);
        assert_eq!(1, page.count);
        assert_eq!("one", page.items[0].slug);
        assert!(blog.tag_articles("nope", None).unwrap_err().is_not_found());
        Ok(())
    }

    #[test]
    fn test_unknown_category_is_empty() -> Result<()> {
        let blog = blog();
        let (category, page) = blog.category_articles("nope", Some("3"))?;
        assert_eq!(None, category);
        assert_eq!(1, page.number);
        assert!(page.items.is_empty());
        Ok(())
    }

    #[test]
    fn test_index_paginates() -> Result<()> {
        let blog = blog().with_page_size(2);
        let python = category(&blog, "Python");
        for day in 1..=5 {
            post(&blog, python.id, &format!("p{}", day), "", Status::Published, day);
        }
        let page = blog.index(Some("3"))?;
        assert_eq!(3, page.num_pages);
        assert_eq!(vec!["p1"], page.items.iter().map(|a| a.slug.as_str()).collect::<Vec<_>>());
        assert_eq!(1, blog.index(Some("4"))?.number);
        assert_eq!(1, blog.index(Some("abc"))?.number);
        Ok(())
    }

    #[test]
    fn test_tags_of_sorted() -> Result<()> {
        let blog = blog();
        let python = category(&blog, "Python");
        let article = post(&blog, python.id, "one", "zeta, alpha", Status::Published, 1);
        let names: Vec<String> = blog.tags_of(&article)?.into_iter().map(|t| t.name).collect();
        assert_eq!(vec!["alpha", "zeta"], names);
        assert_eq!(Some(python), blog.category_of(&article)?);
        Ok(())
    }
}

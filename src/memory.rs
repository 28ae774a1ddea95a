//! An in-memory [`crate::store::Store`]. Tables live behind a single
//! [`RwLock`], so the store can be shared between threads; uniqueness checks
//! and inserts happen under the same write lock.

use crate::article::{Article, NewArticle};
use crate::category::{Category, NewCategory};
use crate::page::{NewPage, Page};
use crate::status::Status;
use crate::store::{
    ArticleStore, CategoryStore, Error, Id, PageStore, Result, TagStore,
};
use crate::tag::{NewTag, Tag};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    categories: Table<Category>,
    tags: Table<Tag>,
    articles: Table<Article>,
    pages: Table<Page>,
}

struct Table<T> {
    last_id: Id,
    rows: BTreeMap<Id, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Table {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Clone> Table<T> {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn get(&self, id: Id) -> Option<T> {
        self.rows.get(&id).cloned()
    }

    fn select(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows.values().filter(|row| predicate(row)).cloned().collect()
    }

    fn replace(&mut self, entity: &'static str, id: Id, row: T) -> Result<()> {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(Error::Missing { entity, id }),
        }
    }

    fn remove(&mut self, entity: &'static str, id: Id) -> Result<()> {
        self.rows
            .remove(&id)
            .map(|_| ())
            .ok_or(Error::Missing { entity, id })
    }
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| Error::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| Error::Poisoned)
    }
}

impl Tables {
    fn check_article_refs(&self, category: Id, tags: &[Id]) -> Result<()> {
        if !self.categories.rows.contains_key(&category) {
            return Err(Error::Missing {
                entity: "category",
                id: category,
            });
        }
        match tags.iter().find(|id| !self.tags.rows.contains_key(*id)) {
            Some(id) => Err(Error::Missing {
                entity: "tag",
                id: *id,
            }),
            None => Ok(()),
        }
    }
}

fn by_name<T>(rows: &mut [T], name: impl Fn(&T) -> &str, id: impl Fn(&T) -> Id) {
    rows.sort_by(|a, b| name(a).cmp(name(b)).then(id(a).cmp(&id(b))));
}

fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(|a, b| {
        b.published_time
            .cmp(&a.published_time)
            .then(b.id.cmp(&a.id))
    });
}

fn sort_pages(pages: &mut [Page]) {
    pages.sort_by(|a, b| {
        b.rank
            .cmp(&a.rank)
            .then(b.created_time.cmp(&a.created_time))
            .then(b.id.cmp(&a.id))
    });
}

impl CategoryStore for MemoryStore {
    fn create_category(&self, new: NewCategory, now: DateTime<Utc>) -> Result<Category> {
        let mut tables = self.write()?;
        if tables.categories.rows.values().any(|c| c.name == new.name) {
            return Err(Error::Conflict {
                entity: "category",
                name: new.name,
            });
        }
        if tables.categories.rows.values().any(|c| c.slug == new.slug) {
            return Err(Error::SlugConflict {
                entity: "category",
                slug: new.slug,
            });
        }
        let id = tables.categories.next_id();
        let category = Category::from_new(id, new, now);
        tables.categories.rows.insert(id, category.clone());
        Ok(category)
    }

    fn update_category(&self, category: &Category) -> Result<()> {
        let mut tables = self.write()?;
        if tables
            .categories
            .rows
            .values()
            .any(|c| c.name == category.name && c.id != category.id)
        {
            return Err(Error::Conflict {
                entity: "category",
                name: category.name.clone(),
            });
        }
        if tables
            .categories
            .rows
            .values()
            .any(|c| c.slug == category.slug && c.id != category.id)
        {
            return Err(Error::SlugConflict {
                entity: "category",
                slug: category.slug.clone(),
            });
        }
        tables
            .categories
            .replace("category", category.id, category.clone())
    }

    fn category(&self, id: Id) -> Result<Option<Category>> {
        Ok(self.read()?.categories.get(id))
    }

    fn category_by_name(&self, name: &str) -> Result<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .select(|c| c.name == name)
            .into_iter()
            .next())
    }

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let mut matches = self.read()?.categories.select(|c| c.slug == slug);
        by_name(&mut matches, |c| c.name.as_str(), |c| c.id);
        Ok(matches.into_iter().next())
    }

    fn categories(&self) -> Result<Vec<Category>> {
        let mut categories = self.read()?.categories.select(|_| true);
        by_name(&mut categories, |c| c.name.as_str(), |c| c.id);
        Ok(categories)
    }
}

impl TagStore for MemoryStore {
    fn create_tag(&self, new: NewTag, now: DateTime<Utc>) -> Result<Tag> {
        let mut tables = self.write()?;
        if tables.tags.rows.values().any(|t| t.name == new.name) {
            return Err(Error::Conflict {
                entity: "tag",
                name: new.name,
            });
        }
        let id = tables.tags.next_id();
        let tag = Tag::from_new(id, new, now);
        tables.tags.rows.insert(id, tag.clone());
        Ok(tag)
    }

    fn tag(&self, id: Id) -> Result<Option<Tag>> {
        Ok(self.read()?.tags.get(id))
    }

    fn tag_by_name(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self
            .read()?
            .tags
            .select(|t| t.name == name)
            .into_iter()
            .next())
    }

    fn tag_by_slug(&self, slug: &str) -> Result<Option<Tag>> {
        let mut matches = self.read()?.tags.select(|t| t.slug == slug);
        by_name(&mut matches, |t| t.name.as_str(), |t| t.id);
        Ok(matches.into_iter().next())
    }

    fn tags(&self) -> Result<Vec<Tag>> {
        let mut tags = self.read()?.tags.select(|_| true);
        by_name(&mut tags, |t| t.name.as_str(), |t| t.id);
        Ok(tags)
    }
}

impl ArticleStore for MemoryStore {
    fn insert_article(&self, new: NewArticle) -> Result<Article> {
        let mut tables = self.write()?;
        tables.check_article_refs(new.fields.category, new.tags())?;
        let id = tables.articles.next_id();
        let article = Article::from_new(id, new);
        tables.articles.rows.insert(id, article.clone());
        Ok(article)
    }

    fn update_article(&self, article: &Article) -> Result<()> {
        let mut tables = self.write()?;
        tables.check_article_refs(article.category, article.tags())?;
        tables
            .articles
            .replace("article", article.id, article.clone())
    }

    fn delete_article(&self, id: Id) -> Result<()> {
        self.write()?.articles.remove("article", id)
    }

    fn article(&self, id: Id) -> Result<Option<Article>> {
        Ok(self.read()?.articles.get(id))
    }

    fn articles_by_slug(&self, slug: &str) -> Result<Vec<Article>> {
        let mut articles = self.read()?.articles.select(|a| a.slug == slug);
        sort_articles(&mut articles);
        Ok(articles)
    }

    fn articles_by_status(&self, status: Status) -> Result<Vec<Article>> {
        let mut articles = self.read()?.articles.select(|a| a.status == status);
        sort_articles(&mut articles);
        Ok(articles)
    }

    fn articles_by_category(&self, category: Id, status: Status) -> Result<Vec<Article>> {
        let mut articles = self
            .read()?
            .articles
            .select(|a| a.category == category && a.status == status);
        sort_articles(&mut articles);
        Ok(articles)
    }

    fn articles_by_tag(&self, tag: Id, status: Status) -> Result<Vec<Article>> {
        let mut articles = self
            .read()?
            .articles
            .select(|a| a.tags().contains(&tag) && a.status == status);
        sort_articles(&mut articles);
        Ok(articles)
    }
}

impl PageStore for MemoryStore {
    fn insert_page(&self, new: NewPage) -> Result<Page> {
        let mut tables = self.write()?;
        let id = tables.pages.next_id();
        let page = Page::from_new(id, new);
        tables.pages.rows.insert(id, page.clone());
        Ok(page)
    }

    fn update_page(&self, page: &Page) -> Result<()> {
        self.write()?.pages.replace("page", page.id, page.clone())
    }

    fn delete_page(&self, id: Id) -> Result<()> {
        self.write()?.pages.remove("page", id)
    }

    fn page(&self, id: Id) -> Result<Option<Page>> {
        Ok(self.read()?.pages.get(id))
    }

    fn pages_by_slug(&self, slug: &str) -> Result<Vec<Page>> {
        let mut pages = self.read()?.pages.select(|p| p.slug == slug);
        sort_pages(&mut pages);
        Ok(pages)
    }

    fn pages_by_status(&self, status: Status) -> Result<Vec<Page>> {
        let mut pages = self.read()?.pages.select(|p| p.status == status);
        sort_pages(&mut pages);
        Ok(pages)
    }
}

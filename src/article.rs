//! Defines the [`Article`] entity and [`NewArticle`], its unsaved form. Both
//! own their [`Content`], so the rendered HTML can't drift from the Markdown
//! it came from.

use crate::markdown::{self, Content, Render};
use crate::status::{Status, Visible};
use crate::store::Id;
use chrono::{DateTime, Datelike, Utc};

/// The editable, non-derived fields of an article.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleFields {
    pub category: Id,
    pub title: String,
    pub slug: String,
    pub status: Status,
    pub published_time: DateTime<Utc>,
}

/// An article that hasn't been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewArticle {
    pub fields: ArticleFields,
    content: Content,
    tags: Vec<Id>,
    pub updated_time: DateTime<Utc>,
}

impl NewArticle {
    /// Renders `markdown` and builds an unsaved article around it. Fails, and
    /// builds nothing, if rendering fails.
    pub fn render<R: Render + ?Sized>(
        fields: ArticleFields,
        markdown: &str,
        renderer: &R,
        now: DateTime<Utc>,
    ) -> markdown::Result<NewArticle> {
        Ok(NewArticle {
            fields,
            content: Content::render(markdown, renderer)?,
            tags: Vec::new(),
            updated_time: now,
        })
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Id>) -> NewArticle {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn tags(&self) -> &[Id] {
        &self.tags
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Article {
    pub id: Id,
    pub category: Id,
    pub title: String,
    pub slug: String,
    content: Content,
    tags: Vec<Id>,
    pub status: Status,
    pub published_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl Article {
    /// Builds a stored article from its id and its unsaved form.
    pub fn from_new(id: Id, new: NewArticle) -> Article {
        Article {
            id,
            category: new.fields.category,
            title: new.fields.title,
            slug: new.fields.slug,
            content: new.content,
            tags: new.tags,
            status: new.fields.status,
            published_time: new.fields.published_time,
            updated_time: new.updated_time,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_html(&self) -> &str {
        self.content.html()
    }

    /// Ids of the article's tags, sorted and without duplicates.
    pub fn tags(&self) -> &[Id] {
        &self.tags
    }

    pub fn set_tags(&mut self, tags: impl IntoIterator<Item = Id>) {
        self.tags = normalize_tags(tags);
    }

    /// Re-renders the article from `markdown`. On failure the article is left
    /// exactly as it was.
    pub fn set_content<R: Render + ?Sized>(
        &mut self,
        markdown: &str,
        renderer: &R,
    ) -> markdown::Result<()> {
        self.content = Content::render(markdown, renderer)?;
        Ok(())
    }

    pub fn set_fields(&mut self, fields: ArticleFields) {
        self.category = fields.category;
        self.title = fields.title;
        self.slug = fields.slug;
        self.status = fields.status;
        self.published_time = fields.published_time;
    }

    pub fn year(&self) -> i32 {
        self.published_time.year()
    }

    pub fn month(&self) -> u32 {
        self.published_time.month()
    }
}

impl Visible for Article {
    fn status(&self) -> Status {
        self.status
    }
}

fn normalize_tags(tags: impl IntoIterator<Item = Id>) -> Vec<Id> {
    let mut tags: Vec<Id> = tags.into_iter().collect();
    tags.sort_unstable();
    tags.dedup();
    tags
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::markdown::{Error as RenderError, Markdown};
    use chrono::TimeZone;

    fn fields() -> ArticleFields {
        ArticleFields {
            category: 1,
            title: String::from("Django test"),
            slug: String::from("django-test"),
            status: Status::Published,
            published_time: Utc.with_ymd_and_hms(2017, 3, 9, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_new_article_renders_content() -> markdown::Result<()> {
        let now = Utc.with_ymd_and_hms(2017, 3, 10, 0, 0, 0).unwrap();
        let article = Article::from_new(
            7,
            NewArticle::render(fields(), "# Django Test", &Markdown::new(), now)?
                .with_tags(vec![3, 1, 3]),
        );
        assert_eq!(7, article.id);
        assert_eq!("<h1>Django Test</h1>\n", article.content_html());
        assert_eq!(&[1, 3], article.tags());
        assert_eq!(2017, article.year());
        assert_eq!(3, article.month());
        assert_eq!(now, article.updated_time);
        Ok(())
    }

    #[test]
    fn test_failed_set_content_keeps_article() -> markdown::Result<()> {
        let now = Utc.with_ymd_and_hms(2017, 3, 10, 0, 0, 0).unwrap();
        let mut article = Article::from_new(
            1,
            NewArticle::render(fields(), "# Before", &Markdown::new(), now)?,
        );
        let before = article.clone();
        let failing = |_: &str| -> markdown::Result<String> {
            Err(RenderError::Rejected(String::from("malformed")))
        };
        assert!(article.set_content("# After", &failing).is_err());
        assert_eq!(before, article);
        Ok(())
    }
}

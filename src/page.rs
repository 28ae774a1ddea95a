//! Defines the static [`Page`] entity (about pages and the like). Pages share
//! the article's content invariant and visibility rules but have no category,
//! tags or publication date; `rank` orders them in the site navigation.

use crate::markdown::{self, Content, Render};
use crate::status::{Status, Visible};
use crate::store::Id;
use chrono::{DateTime, Utc};

pub const DEFAULT_RANK: i32 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageFields {
    pub title: String,
    pub slug: String,
    /// Higher ranks are listed first.
    pub rank: i32,
    pub status: Status,
}

/// A page that hasn't been stored yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPage {
    pub fields: PageFields,
    content: Content,
    pub created_time: DateTime<Utc>,
}

impl NewPage {
    pub fn render<R: Render + ?Sized>(
        fields: PageFields,
        markdown: &str,
        renderer: &R,
        now: DateTime<Utc>,
    ) -> markdown::Result<NewPage> {
        Ok(NewPage {
            fields,
            content: Content::render(markdown, renderer)?,
            created_time: now,
        })
    }

    pub fn content(&self) -> &Content {
        &self.content
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub id: Id,
    pub title: String,
    pub slug: String,
    content: Content,
    pub rank: i32,
    pub status: Status,
    pub created_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
}

impl Page {
    pub fn from_new(id: Id, new: NewPage) -> Page {
        Page {
            id,
            title: new.fields.title,
            slug: new.fields.slug,
            content: new.content,
            rank: new.fields.rank,
            status: new.fields.status,
            created_time: new.created_time,
            updated_time: new.created_time,
        }
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_html(&self) -> &str {
        self.content.html()
    }

    /// Re-renders the page from `markdown`, leaving it untouched on failure.
    pub fn set_content<R: Render + ?Sized>(
        &mut self,
        markdown: &str,
        renderer: &R,
    ) -> markdown::Result<()> {
        self.content = Content::render(markdown, renderer)?;
        Ok(())
    }

    pub fn set_fields(&mut self, fields: PageFields) {
        self.title = fields.title;
        self.slug = fields.slug;
        self.rank = fields.rank;
        self.status = fields.status;
    }
}

impl Visible for Page {
    fn status(&self) -> Status {
        self.status
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::markdown::Markdown;
    use chrono::TimeZone;

    #[test]
    fn test_page_renders_content() -> markdown::Result<()> {
        let now = Utc.with_ymd_and_hms(2017, 3, 10, 0, 0, 0).unwrap();
        let page = Page::from_new(
            1,
            NewPage::render(
                PageFields {
                    title: String::from("About"),
                    slug: String::from("about"),
                    rank: DEFAULT_RANK,
                    status: Status::Published,
                },
                "# About",
                &Markdown::new(),
                now,
            )?,
        );
        assert_eq!("<h1>About</h1>\n", page.content_html());
        assert_eq!(now, page.created_time);
        assert_eq!(now, page.updated_time);
        Ok(())
    }
}

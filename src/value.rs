//! Conversions from domain objects into template [`Value`]s. Every object
//! that templates can link to carries its own `url`.

use crate::article::Article;
use crate::category::Category;
use crate::listing::ArchiveEntry;
use crate::page::Page;
use crate::tag::Tag;
use crate::url::{Route, Routes};
use chrono::{DateTime, Datelike, Utc};
use gtmpl_value::Value;
use std::collections::HashMap;
use url::{ParseError, Url};

/// Builds a [`Value::Object`] from `(key, value)` pairs.
pub fn object<I: IntoIterator<Item = (&'static str, Value)>>(fields: I) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    for (key, value) in fields {
        m.insert(key.to_owned(), value);
    }
    Value::Object(m)
}

pub fn url(url: &Url) -> Value {
    Value::String(url.to_string())
}

/// `Nil` for a missing URL, so templates can test it with `{{if}}`.
pub fn optional_url(url: Option<&Url>) -> Value {
    match url {
        Some(u) => self::url(u),
        None => Value::Nil,
    }
}

pub fn text(s: &str) -> Value {
    Value::String(s.to_owned())
}

/// A timestamp as an object with `iso` (RFC 3339), `date` (`YYYY-MM-DD`),
/// `year`, `month` and `day` fields.
pub fn time(t: &DateTime<Utc>) -> Value {
    object(vec![
        ("iso", Value::String(t.to_rfc3339())),
        ("date", Value::String(t.format("%Y-%m-%d").to_string())),
        ("year", Value::from(t.year() as i64)),
        ("month", Value::from(t.month() as i64)),
        ("day", Value::from(t.day() as i64)),
    ])
}

pub fn category(c: &Category, routes: &Routes) -> Result<Value, ParseError> {
    let route = Route::Category {
        slug: c.slug.clone(),
        page: 1,
    };
    Ok(object(vec![
        ("name", text(&c.name)),
        ("slug", text(&c.slug)),
        ("url", url(&routes.url(&route)?)),
    ]))
}

pub fn tag(t: &Tag, routes: &Routes) -> Result<Value, ParseError> {
    let route = Route::Tag {
        slug: t.slug.clone(),
        page: 1,
    };
    Ok(object(vec![
        ("name", text(&t.name)),
        ("slug", text(&t.slug)),
        ("url", url(&routes.url(&route)?)),
    ]))
}

/// An article with its category (`Nil` if the category is gone) and tags.
pub fn article(
    a: &Article,
    category: Option<&Category>,
    tags: &[Tag],
    routes: &Routes,
) -> Result<Value, ParseError> {
    let category = match category {
        Some(c) => self::category(c, routes)?,
        None => Value::Nil,
    };
    let tags = tags
        .iter()
        .map(|t| tag(t, routes))
        .collect::<Result<Vec<Value>, ParseError>>()?;
    Ok(object(vec![
        ("id", Value::from(a.id)),
        ("title", text(&a.title)),
        ("slug", text(&a.slug)),
        ("url", url(&routes.url(&Route::article(a))?)),
        ("content", text(a.content().markdown())),
        ("html", text(a.content_html())),
        ("status", text(a.status.label())),
        ("published", time(&a.published_time)),
        ("updated", time(&a.updated_time)),
        ("category", category),
        ("tags", Value::Array(tags)),
    ]))
}

pub fn page(p: &Page, routes: &Routes) -> Result<Value, ParseError> {
    let route = Route::Page {
        slug: p.slug.clone(),
    };
    Ok(object(vec![
        ("title", text(&p.title)),
        ("slug", text(&p.slug)),
        ("url", url(&routes.url(&route)?)),
        ("html", text(p.content_html())),
        ("rank", Value::from(p.rank as i64)),
        ("created", time(&p.created_time)),
        ("updated", time(&p.updated_time)),
    ]))
}

pub fn archive_entry(e: &ArchiveEntry, routes: &Routes) -> Result<Value, ParseError> {
    let route = Route::Article {
        year: e.year(),
        month: e.month(),
        slug: e.slug.clone(),
    };
    Ok(object(vec![
        ("title", text(&e.title)),
        ("url", url(&routes.url(&route)?)),
        ("published", time(&e.published_time)),
    ]))
}

/// Wraps an already-converted item together with how many published
/// articles it has.
pub fn counted(item: Value, count: usize) -> Value {
    object(vec![("item", item), ("count", Value::from(count as u64))])
}

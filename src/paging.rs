//! Splits a list into numbered pages. A page request is whatever the reader
//! put in the `page` query parameter, so it may be missing or garbage; any
//! request that doesn't name an existing page gets page 1.

/// One page of a paginated list. Pages are numbered from 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paginated<T> {
    /// The items on this page.
    pub items: Vec<T>,

    /// This page's number.
    pub number: usize,

    /// The number of pages. Always at least 1, even for an empty list.
    pub num_pages: usize,

    /// The number of items across all pages.
    pub count: usize,
}

impl<T> Paginated<T> {
    pub fn prev(&self) -> Option<usize> {
        match self.number > 1 {
            true => Some(self.number - 1),
            false => None,
        }
    }

    pub fn next(&self) -> Option<usize> {
        match self.number < self.num_pages {
            true => Some(self.number + 1),
            false => None,
        }
    }
}

/// The number of pages `count` items fill at `page_size` items per page.
pub fn num_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    match count % page_size {
        0 => (count / page_size).max(1),
        _ => count / page_size + 1,
    }
}

/// Returns page `requested` of `items`. `requested` is the raw query value; if
/// it is absent, not a positive integer, or past the last page, page 1 is
/// returned instead.
pub fn paginate<T>(items: Vec<T>, page_size: usize, requested: Option<&str>) -> Paginated<T> {
    let page_size = page_size.max(1);
    let count = items.len();
    let num_pages = num_pages(count, page_size);
    let number = match requested.map(|raw| raw.trim().parse::<usize>()) {
        None => 1,
        Some(Ok(n)) if n >= 1 && n <= num_pages => n,
        Some(_) => {
            tracing::debug!(requested = ?requested, num_pages, "invalid page request, serving page 1");
            1
        }
    };
    Paginated {
        items: items
            .into_iter()
            .skip((number - 1) * page_size)
            .take(page_size)
            .collect(),
        number,
        num_pages,
        count,
    }
}

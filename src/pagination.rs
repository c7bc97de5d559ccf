use serde::Serialize;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    Number(u64),
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Page is not 'last' or 'first', nor can it be converted to a positive integer: {0:?}")]
pub struct InvalidPage(pub String);

impl FromStr for PageSelector {
    type Err = InvalidPage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(PageSelector::First);
        }
        match raw.parse::<u64>() {
            Ok(0) => Err(InvalidPage(raw.to_string())),
            Ok(n) => Ok(PageSelector::Number(n)),
            Err(_) => match raw {
                "first" => Ok(PageSelector::First),
                "last" => Ok(PageSelector::Last),
                _ => Err(InvalidPage(raw.to_string())),
            },
        }
    }
}

impl PageSelector {
    /// Absent selector means the first page.
    pub fn from_query(raw: Option<&str>) -> Result<Self, InvalidPage> {
        raw.map_or(Ok(PageSelector::First), str::parse)
    }

    /// 1-based page number; numbers past the end land on the last page.
    pub fn resolve(self, num_pages: u64) -> u64 {
        let num_pages = num_pages.max(1);
        match self {
            PageSelector::First => 1,
            PageSelector::Last => num_pages,
            PageSelector::Number(n) => n.clamp(1, num_pages),
        }
    }
}

/// Number of pages for `count` items; an empty listing still has one page.
pub fn num_pages(count: u64, per_page: u64) -> u64 {
    count.div_ceil(per_page.max(1)).max(1)
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub has_other_pages: bool,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, number: u64, num_pages: u64) -> Self {
        Page {
            items,
            number,
            num_pages,
            has_previous: number > 1,
            has_next: number < num_pages,
            has_other_pages: num_pages > 1,
        }
    }
}

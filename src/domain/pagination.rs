use serde::Deserialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Raw `page` / `limit` query parameters. Kept as strings so that invalid
/// values are reported through the envelope instead of a bare rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field} must be a positive integer")]
pub struct InvalidPage {
    pub field: &'static str,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    pub fn new(page: u64, limit: u64) -> Result<Self, InvalidPage> {
        if page == 0 {
            return Err(InvalidPage { field: "page" });
        }
        if limit == 0 {
            return Err(InvalidPage { field: "limit" });
        }
        Ok(Self { page, limit })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl TryFrom<&PageParams> for Page {
    type Error = InvalidPage;

    fn try_from(params: &PageParams) -> Result<Self, Self::Error> {
        fn parse(raw: Option<&str>, default: u64, field: &'static str) -> Result<u64, InvalidPage> {
            match raw.map(str::trim).filter(|s| !s.is_empty()) {
                None => Ok(default),
                Some(s) => s.parse::<u64>().map_err(|_| InvalidPage { field }),
            }
        }

        let page = parse(params.page.as_deref(), DEFAULT_PAGE, "page")?;
        let limit = parse(params.limit.as_deref(), DEFAULT_LIMIT, "limit")?;
        Page::new(page, limit)
    }
}

//! Optional page-number pagination
//!
//! Without `page`/`page_size` a list endpoint returns a plain JSON array. With
//! either of them it returns `{count, next, previous, results}`.

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{DEFAULT_PAGE_SIZE, Page};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

/// Either the full list or one page of it
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    All(Vec<T>),
    Paged(Page<T>),
}

impl PageParams {
    /// Apply the params to `items`; an out-of-range page is a 404
    pub fn apply<T>(self, items: Vec<T>, base_url: &str) -> Result<Listing<T>, AppError> {
        if self.page.is_none() && self.page_size.is_none() {
            return Ok(Listing::All(items));
        }
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        Page::paginate(items, page, page_size, base_url)
            .map(Listing::Paged)
            .ok_or_else(|| AppError::new(ErrorCode::InvalidPage))
    }
}

/// Absolute URL of the current request minus `page`/`page_size`
///
/// Neighbour links built on it keep the caller's filters and ordering.
#[derive(Debug, Clone)]
pub struct ListUrl(pub String);

impl FromRequestParts<AppState> for ListUrl {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Nested routers see a stripped URI; the original one has the full path
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or(&parts.uri, |original| &original.0);
        let url = without_page_params(uri.path(), uri.query());
        Ok(Self(state.absolute_url(&url)))
    }
}

/// Rebuild `path?query` without the pagination params, other pairs kept as sent
fn without_page_params(path: &str, query: Option<&str>) -> String {
    let kept: Vec<&str> = query
        .unwrap_or_default()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| {
            let key = pair.split('=').next().unwrap_or_default();
            key != "page" && key != "page_size"
        })
        .collect();
    if kept.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", kept.join("&"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_without_page_params() {
        assert_eq!(without_page_params("/x/", None), "/x/");
        assert_eq!(
            without_page_params("/x/", Some("page=2&page_size=1")),
            "/x/"
        );
        assert_eq!(
            without_page_params("/x/", Some("search=cake&page=2&ordering=-price&page_size=1")),
            "/x/?search=cake&ordering=-price"
        );
        // Encoded values pass through untouched
        assert_eq!(
            without_page_params("/x/", Some("search=%D9%86%D9%88%D8%B4&pagex=1")),
            "/x/?search=%D9%86%D9%88%D8%B4&pagex=1"
        );
    }

    #[test]
    fn test_links_keep_filters() {
        let params = PageParams {
            page: Some(1),
            page_size: Some(1),
        };
        let listing = params.apply(vec![1, 2], "/x/?search=cake").unwrap();
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["next"], "/x/?search=cake&page=2&page_size=1");
    }

    #[test]
    fn test_plain_list_without_params() {
        let listing = PageParams::default().apply(vec![1, 2, 3], "/x/").unwrap();
        assert_eq!(serde_json::to_value(&listing).unwrap(), serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_paged_with_page_size_only() {
        let params = PageParams {
            page: None,
            page_size: Some(2),
        };
        let listing = params.apply(vec![1, 2, 3], "/x/").unwrap();
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["count"], 3);
        assert_eq!(json["results"], serde_json::json!([1, 2]));
        assert_eq!(json["next"], "/x/?page=2&page_size=2");
    }

    #[test]
    fn test_invalid_page() {
        let params = PageParams {
            page: Some(9),
            page_size: None,
        };
        let err = params.apply(vec![1], "/x/").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidPage);
    }
}

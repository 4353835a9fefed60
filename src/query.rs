//! Query-string codec for [`SearchRequest`].
//!
//! Wire form: `pageIndex`, `pageSize`, then `keyword`, `sortField`,
//! `sortDirection` when set, then one `filters[<name>]` parameter per active
//! filter in insertion order.

use crate::domain::search::{FilterValue, SearchRequest, SortDirection};

const PAGE_INDEX: &str = "pageIndex";
const PAGE_SIZE: &str = "pageSize";
const KEYWORD: &str = "keyword";
const SORT_FIELD: &str = "sortField";
const SORT_DIRECTION: &str = "sortDirection";
const FILTER_PREFIX: &str = "filters[";

/// Ordered `(name, value)` pairs that make up the query string.
pub fn to_pairs(request: &SearchRequest) -> Vec<(String, String)> {
    let mut pairs = vec![
        (PAGE_INDEX.to_string(), request.page_index.max(1).to_string()),
        (PAGE_SIZE.to_string(), request.page_size.max(1).to_string()),
    ];

    if let Some(keyword) = request
        .keyword
        .as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty())
    {
        pairs.push((KEYWORD.to_string(), keyword.to_string()));
    }

    if let Some(field) = request
        .sort_field
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
    {
        pairs.push((SORT_FIELD.to_string(), field.to_string()));
        pairs.push((
            SORT_DIRECTION.to_string(),
            request.sort_direction.to_string(),
        ));
    }

    for (key, value) in request.filters.active() {
        if key.is_empty() || key.contains(['[', ']']) {
            log::warn!("Skipping filter with unencodable name '{key}'");
            continue;
        }
        pairs.push((format!("{FILTER_PREFIX}{key}]"), value.to_string()));
    }

    pairs
}

/// Serializes the request into a percent-encoded query string.
pub fn encode(request: &SearchRequest) -> String {
    let pairs = to_pairs(request);
    serde_html_form::to_string(&pairs).unwrap_or_else(|err| {
        // String pairs always serialize; keep the mandatory counters regardless.
        log::error!("Failed to serialize search query: {err}");
        format!(
            "{PAGE_INDEX}={}&{PAGE_SIZE}={}",
            request.page_index.max(1),
            request.page_size.max(1)
        )
    })
}

/// Parses a query string, falling back to defaults for anything unusable.
///
/// `default_page_size` applies when `pageSize` is missing or invalid. A
/// leading `?` is accepted.
pub fn decode(query: &str, default_page_size: u32) -> SearchRequest {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs: Vec<(String, String)> = serde_html_form::from_str(query).unwrap_or_else(|err| {
        log::warn!("Ignoring malformed search query: {err}");
        Vec::new()
    });
    from_pairs(pairs, default_page_size)
}

/// Builds a request from already-split query parameters.
pub fn from_pairs<I>(pairs: I, default_page_size: u32) -> SearchRequest
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut request = SearchRequest::new(default_page_size);

    for (name, value) in pairs {
        match name.as_str() {
            PAGE_INDEX => {
                request.page_index = parse_positive(&value).unwrap_or(1);
            }
            PAGE_SIZE => {
                request.page_size = parse_positive(&value).unwrap_or(default_page_size.max(1));
            }
            KEYWORD => {
                request = request.keyword(&value);
            }
            SORT_FIELD => {
                let field = value.trim();
                request.sort_field = (!field.is_empty()).then(|| field.to_string());
            }
            SORT_DIRECTION => {
                request.sort_direction = value.parse().unwrap_or(SortDirection::Asc);
            }
            _ => {
                if let Some(key) = filter_name(&name)
                    && !value.is_empty()
                {
                    request.filters.set(key, FilterValue::Text(value));
                }
            }
        }
    }

    request
}

fn parse_positive(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|v| *v >= 1)
}

/// Extracts `<name>` from `filters[<name>]`; anything else is `None`.
fn filter_name(param: &str) -> Option<&str> {
    let name = param.strip_prefix(FILTER_PREFIX)?.strip_suffix(']')?;
    if name.is_empty() || name.contains(['[', ']']) {
        return None;
    }
    Some(name)
}

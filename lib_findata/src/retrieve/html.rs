//! # HTML Field Extraction
//!
//! Fetches pages through [`ApiClient`] and pulls displayed values out of them
//! with ad hoc element filters. There is no schema: a [`FieldSelector`] names
//! an element type plus either a class or a set of attribute values, and the
//! first element satisfying it wins.
//!
//! A selector that matches nothing is not an error at this level; it is
//! logged and reported as `None` so callers decide what absence means.

use std::fmt;

use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::ky_http::{ApiClient, FetchError};

/// How a candidate element is matched once its tag name fits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldFilter {
    /// Any element of the requested type.
    Any,
    /// Element whose `class` attribute contains this class.
    Class(String),
    /// Element carrying every listed attribute with exactly the given value.
    Attributes(Vec<(String, String)>),
}

/// Locates one element inside a parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelector {
    element: String,
    filter: FieldFilter,
}

impl FieldSelector {
    /// Element type used when none is given.
    pub const DEFAULT_ELEMENT: &'static str = "span";

    /// Matches a `span` with the given class.
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            element: Self::DEFAULT_ELEMENT.to_string(),
            filter: FieldFilter::Class(name.into()),
        }
    }

    /// Matches a `span` whose attribute `name` equals `value`.
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::attributes([(name, value)])
    }

    /// Matches a `span` carrying all of the given attribute values.
    pub fn attributes<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            element: Self::DEFAULT_ELEMENT.to_string(),
            filter: FieldFilter::Attributes(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()),
        }
    }

    /// Matches the first element of the given type.
    pub fn any(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            filter: FieldFilter::Any,
        }
    }

    /// Replaces the element type (defaults to `span`).
    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = element.into();
        self
    }

    /// Element type this selector looks at.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Filter applied to elements of that type.
    pub fn filter(&self) -> &FieldFilter {
        &self.filter
    }

    /// Whether `element` satisfies the filter. The tag name is checked by the
    /// caller's CSS type selector.
    pub fn matches(&self, element: &Element) -> bool {
        match &self.filter {
            FieldFilter::Any => true,
            FieldFilter::Class(name) => element.classes().any(|c| c == name),
            FieldFilter::Attributes(pairs) => pairs.iter().all(|(k, v)| element.attr(k) == Some(v.as_str())),
        }
    }

    fn first_match<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let by_type = match Selector::parse(&self.element) {
            Ok(selector) => selector,
            Err(e) => {
                warn!(element = %self.element, error = ?e, "Invalid element type in field selector");
                return None;
            }
        };
        document.select(&by_type).find(|el| self.matches(el.value()))
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filter {
            FieldFilter::Any => write!(f, "{}", self.element),
            FieldFilter::Class(name) => write!(f, "{}.{}", self.element, name),
            FieldFilter::Attributes(pairs) => {
                write!(f, "{}", self.element)?;
                for (k, v) in pairs {
                    write!(f, "[{}=\"{}\"]", k, v)?;
                }
                Ok(())
            }
        }
    }
}

/// Parses an HTML body into a navigable document.
pub fn parse_document(body: &str) -> Html {
    Html::parse_document(body)
}

/// Returns the raw text content of the first element matching `selector`.
///
/// Text nodes are concatenated verbatim, whitespace included.
pub fn extract_field(document: &Html, selector: &FieldSelector) -> Option<String> {
    match selector.first_match(document) {
        Some(element) => Some(element.text().collect()),
        None => {
            warn!(selector = %selector, "Attribute not found.");
            None
        }
    }
}

/// Returns the cell texts of every row of the first `table` element matching
/// `table`. Rows without `td` cells (header rows) are skipped, and so are the
/// rows of tables nested inside it.
pub fn extract_rows(document: &Html, table: &FieldSelector) -> Vec<Vec<String>> {
    let Some(table_el) = table.first_match(document) else {
        warn!(selector = %table, "Table not found.");
        return Vec::new();
    };
    let Ok(rows) = Selector::parse("tr") else {
        return Vec::new();
    };

    table_el
        .select(&rows)
        .filter(|tr| {
            let owner = tr
                .ancestors()
                .find(|node| node.value().as_element().is_some_and(|el| el.name() == "table"));
            owner == Some(*table_el)
        })
        .map(|tr| {
            tr.children()
                .filter_map(ElementRef::wrap)
                .filter(|cell| cell.value().name() == "td")
                .map(|td| td.text().collect::<String>())
                .collect::<Vec<_>>()
        })
        .filter(|row| !row.is_empty())
        .collect()
}

/// GETs `url` (absolute, or relative to the client's base) and parses it.
pub async fn fetch_document(client: &ApiClient, url: &str) -> Result<Html, FetchError> {
    let body = client.get_text(url, &[]).await?;
    Ok(parse_document(&body))
}

/// Fetches `url` and extracts one field from it.
///
/// Transport and status failures are errors; a missing element is `Ok(None)`.
pub async fn fetch_field(client: &ApiClient, url: &str, selector: &FieldSelector) -> Result<Option<String>, FetchError> {
    let document = fetch_document(client, url).await?;
    Ok(extract_field(&document, selector))
}

//! HTML parser for extracting page metadata
//!
//! Only two facts are taken from a page:
//! - The text of the first `<title>` element
//! - The number of `<a>` elements that carry an `href` attribute

use scraper::{Html, Selector};

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The trimmed page title, `None` if missing or blank
    pub title: Option<String>,

    /// Count of anchors with an `href`, whatever the value
    pub link_count: u32,
}

/// Parses HTML content and extracts the title and outgoing link count
///
/// # Arguments
///
/// * `html` - The HTML content to parse
///
/// # Returns
///
/// * `Ok(ParsedPage)` - Successfully parsed page
/// * `Err(String)` - A selector could not be built
///
/// # Example
///
/// ```
/// use crawl_compare::crawler::parse_page;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let parsed = parse_page(html).unwrap();
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// assert_eq!(parsed.link_count, 1);
/// ```
pub fn parse_page(html: &str) -> Result<ParsedPage, String> {
    let document = Html::parse_document(html);

    let title = extract_title(&document)?;
    let link_count = count_links(&document)?;

    Ok(ParsedPage { title, link_count })
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Result<Option<String>, String> {
    let title_selector = Selector::parse("title").map_err(|e| e.to_string())?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty()))
}

/// Counts anchors carrying an `href`
fn count_links(document: &Html) -> Result<u32, String> {
    let a_selector = Selector::parse("a[href]").map_err(|e| e.to_string())?;
    let count = document.select(&a_selector).count();
    u32::try_from(count).map_err(|_| format!("link count {} out of range", count))
}

// src/extract/html.rs
// =============================================================================
// Pulls links and asset references out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM, the same way a browser would (html5ever)
// - Never fails: broken markup still produces a (possibly odd) tree
//
// What we collect, in document order:
//   <a href>       -> links
//   <img src>      -> assets
//   <script src>   -> assets
//   <link href>    -> assets (stylesheets, icons, ...)
//
// Values are returned exactly as written in the page. Resolving and
// filtering them is the crawler's job.
// =============================================================================

use scraper::Html;

/// Everything found on one page.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub links: Vec<String>,
    pub assets: Vec<String>,
}

/// Extracts links and assets from a response body.
///
/// The body is decoded as UTF-8, replacing invalid sequences.
pub fn extract(body: &[u8]) -> Extracted {
    let html = String::from_utf8_lossy(body);
    let document = Html::parse_document(&html);
    let mut found = Extracted::default();

    for node in document.root_element().descendants() {
        let Some(element) = node.value().as_element() else {
            continue;
        };

        match element.name() {
            "a" => {
                if let Some(href) = element.attr("href") {
                    found.links.push(href.to_string());
                }
            }
            "img" | "script" => {
                if let Some(src) = element.attr("src") {
                    found.assets.push(src.to_string());
                }
            }
            "link" => {
                if let Some(href) = element.attr("href") {
                    found.assets.push(href.to_string());
                }
            }
            _ => {}
        }
    }

    found
}

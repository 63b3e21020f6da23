// src/report/sitemap.rs
// =============================================================================
// Collects what every crawled page links to and uses, and renders it.
//
// - record(): first write wins; recording a page twice changes nothing
// - render_html(): a browsable sitemap where each "links to" entry jumps to
//   that page's own section
// - render_json(): the same data as pretty-printed JSON
//
// Pages are kept in a BTreeMap so output is sorted by URL.
// =============================================================================

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::io::{self, Write};
use url::Url;

/// What one page links to and which assets it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageEntry {
    pub links: Vec<String>,
    pub assets: Vec<String>,
}

#[derive(Debug, Default)]
pub struct Sitemap {
    pages: Mutex<BTreeMap<String, PageEntry>>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a page. Returns false if it was already recorded.
    pub fn record(&self, url: &Url, links: &[Url], assets: Vec<String>) -> bool {
        match self.pages.lock().entry(url.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(PageEntry {
                    links: links.iter().map(Url::to_string).collect(),
                    assets,
                });
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.pages.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.lock().is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<PageEntry> {
        self.pages.lock().get(url).cloned()
    }

    pub fn render_json<W: Write>(&self, out: W) -> io::Result<()> {
        let pages = self.pages.lock();
        serde_json::to_writer_pretty(out, &*pages).map_err(io::Error::from)
    }

    pub fn render_html<W: Write>(&self, mut out: W) -> io::Result<()> {
        let pages = self.pages.lock();

        writeln!(out, "<html>")?;
        writeln!(out, "<head><meta charset=\"utf-8\"><title>Sitemap</title></head>")?;
        writeln!(out, "<body>")?;
        for (page, entry) in pages.iter() {
            let id = html_escape::encode_double_quoted_attribute(page);
            writeln!(out, "  <div>")?;
            writeln!(
                out,
                "    <h2 id=\"{}\">Page {}</h2>",
                id,
                html_escape::encode_text(page)
            )?;

            writeln!(out, "    <h4>Has assets:</h4>")?;
            writeln!(out, "    <ul>")?;
            for asset in &entry.assets {
                writeln!(out, "      <li>{}</li>", html_escape::encode_text(asset))?;
            }
            writeln!(out, "    </ul>")?;

            writeln!(out, "    <h4>Links to:</h4>")?;
            writeln!(out, "    <ul>")?;
            for link in &entry.links {
                writeln!(
                    out,
                    "      <li><a href=\"#{}\">{}</a></li>",
                    html_escape::encode_double_quoted_attribute(link),
                    html_escape::encode_text(link)
                )?;
            }
            writeln!(out, "    </ul>")?;
            writeln!(out, "  </div>")?;
        }
        writeln!(out, "</body>")?;
        writeln!(out, "</html>")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_first_record_wins() {
        let sitemap = Sitemap::new();
        let page = url("https://example.com/");

        assert!(sitemap.record(&page, &[url("https://example.com/a")], vec!["/a.css".into()]));
        assert!(!sitemap.record(&page, &[], vec![]));

        assert_eq!(sitemap.len(), 1);
        let entry = sitemap.get("https://example.com/").unwrap();
        assert_eq!(entry.links, vec!["https://example.com/a"]);
        assert_eq!(entry.assets, vec!["/a.css"]);
    }

    #[test]
    fn test_render_html() {
        let sitemap = Sitemap::new();
        sitemap.record(
            &url("https://example.com/"),
            &[url("https://example.com/about")],
            vec!["/img/<logo>.png".into()],
        );

        let mut out = Vec::new();
        sitemap.render_html(&mut out).unwrap();
        let html = String::from_utf8(out).unwrap();

        assert!(html.contains("<h2 id=\"https://example.com/\">Page https://example.com/</h2>"));
        assert!(html.contains(
            "<li><a href=\"#https://example.com/about\">https://example.com/about</a></li>"
        ));
        assert!(html.contains("<li>/img/&lt;logo&gt;.png</li>"));
    }

    #[test]
    fn test_render_json_is_sorted() {
        let sitemap = Sitemap::new();
        sitemap.record(&url("https://example.com/b"), &[], vec![]);
        sitemap.record(&url("https://example.com/a"), &[], vec![]);

        let mut out = Vec::new();
        sitemap.render_json(&mut out).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();

        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["https://example.com/a", "https://example.com/b"]);
        assert_eq!(json["https://example.com/a"]["links"], serde_json::json!([]));
    }

    #[test]
    fn test_render_empty_sitemap() {
        let sitemap = Sitemap::new();
        assert!(sitemap.is_empty());
        let mut out = Vec::new();
        sitemap.render_html(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("<body>"));
    }
}

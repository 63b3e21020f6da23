// src/report/mod.rs
// =============================================================================
// The crawl report: an in-memory sitemap, rendered once the run is over.
// =============================================================================

mod sitemap;

pub use sitemap::Sitemap;

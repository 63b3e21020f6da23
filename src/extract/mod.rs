// src/extract/mod.rs
// =============================================================================
// Turning a fetched page into candidate links and asset references.
// =============================================================================

mod html;

pub use html::extract;

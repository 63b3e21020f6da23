// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Parallel, depth-first crawling starting from a root URL
// - Every internal page fetched exactly once
// - Same-host restriction, optionally widened to subdomains
// - robots.txt honoured unless told otherwise
// - Optional depth limit, counted in links followed from the root
// - Stops by itself when no work is left, or on the first fatal error
//
// Submodules:
// - frontier: pending URLs (a stack) plus the seen-set
// - pending:  the "work outstanding" counter that detects completion
// - links:    internal/external classification and resolution
// - robots:   robots.txt acquisition and matching
// - spider:   the orchestrator and its per-worker crawl step
// =============================================================================

mod error;
mod frontier;
mod links;
mod pending;
mod robots;
mod spider;

pub use spider::Spider;

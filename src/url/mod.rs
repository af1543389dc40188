//! URL handling module for Sitemap-Harvest
//!
//! Index pages link to their children with a mix of absolute and
//! site-relative hrefs. This module resolves those hrefs against the archive
//! base URL and derives the calendar month encoded in topic-month index URLs.

mod month;
mod resolve;

// Re-export main functions
pub use month::month_from_url;
pub use resolve::resolve_link;

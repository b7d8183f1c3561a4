//! Portal scrapers.
//!
//! Scraping happens in two phases:
//!
//! 1. **Indexing** ([`listing`]): parse a section page into article headers
//! 2. **Extraction** ([`article`]): fetch each article and pull out its body
//!
//! Both phases try an ordered chain of selectors so a change in one page
//! layout falls through to the next known layout, and both report failure as
//! an empty result rather than an error.

pub mod article;
pub mod listing;

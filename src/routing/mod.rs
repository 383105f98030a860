//! Routing module
//!
//! Explicit route table for the wiki:
//! - `/` and `/index/` list pages
//! - `/view/<title>`, `/edit/<title>`, `/save/<title>` operate on one page
//! - `/new/` redirects into the editor
//! - `/assets/*` serves static files

mod matcher;
mod title;

pub use matcher::{match_route, Route};
pub use title::Title;

//! Request handler module
//!
//! Route dispatch, the wiki page handlers and static asset serving.

pub mod pages;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;

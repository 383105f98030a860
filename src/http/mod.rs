//! HTTP protocol layer module
//!
//! Response builders, form decoding and static asset helpers, kept apart
//! from the wiki handlers.

pub mod cache;
pub mod form;
pub mod mime;
pub mod response;

pub use form::FormValues;
pub use response::{
    build_304_response, build_404_response, build_405_response, build_error_response,
    build_html_response, build_options_response, build_redirect_response,
};

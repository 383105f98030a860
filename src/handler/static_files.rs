//! Static asset serving module
//!
//! Serves files under the assets directory for `/assets/*`, with `ETag`
//! revalidation. Directories are not listed.

use crate::http::{self, cache, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Serve the decoded `relative` path from `assets_dir`
pub async fn serve_asset(
    assets_dir: &Path,
    relative: &str,
    if_none_match: Option<&str>,
    is_head: bool,
) -> Response<Full<Bytes>> {
    let Some(file_path) = resolve_asset_path(assets_dir, relative).await else {
        return http::build_404_response();
    };

    let content = match fs::read(&file_path).await {
        Ok(c) => c,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read asset '{}': {}",
                file_path.display(),
                e
            ));
            return http::build_404_response();
        }
    };

    let etag = cache::generate_etag(&content);
    if cache::check_etag_match(if_none_match, &etag) {
        return http::build_304_response(&etag);
    }

    let content_type = mime::get_content_type(file_path.extension().and_then(|e| e.to_str()));
    http::response::build_cached_response(Bytes::from(content), content_type, &etag, is_head)
}

/// Map a request path onto a regular file inside `assets_dir`
///
/// Returns `None` for empty paths, directories, missing files and anything
/// that canonicalizes outside the assets directory.
pub async fn resolve_asset_path(assets_dir: &Path, relative: &str) -> Option<PathBuf> {
    let relative = relative.trim_start_matches('/');
    if relative.is_empty() || relative.ends_with('/') || relative.contains('\0') {
        return None;
    }

    let assets_canonical = match fs::canonicalize(assets_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Assets directory not found or inaccessible '{}': {e}",
                assets_dir.display()
            ));
            return None;
        }
    };

    // Missing files are ordinary 404s, not worth a log line
    let file_canonical = fs::canonicalize(assets_dir.join(relative)).await.ok()?;
    if !file_canonical.starts_with(&assets_canonical) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {relative} -> {}",
            file_canonical.display()
        ));
        return None;
    }

    let metadata = fs::metadata(&file_canonical).await.ok()?;
    metadata.is_file().then_some(file_canonical)
}

//! Route table
//!
//! Maps a request path onto a [`Route`] and decides which methods each
//! route accepts. Page routes take exactly one title segment. The path is
//! percent-decoded once before matching.

use hyper::Method;

use super::title::Title;

/// A resolved route with its extracted parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Index,
    View(Title),
    Edit(Title),
    Save(Title),
    New,
    /// Decoded path relative to the assets directory
    Asset(String),
}

const INDEX_PREFIX: &str = "/index/";
const ASSETS_PREFIX: &str = "/assets/";
const NEW_PATH: &str = "/new/";

static READ_METHODS: [Method; 2] = [Method::GET, Method::HEAD];
static WRITE_METHODS: [Method; 1] = [Method::POST];
static FORM_METHODS: [Method; 3] = [Method::GET, Method::HEAD, Method::POST];

/// Find the route for a raw request path, `None` means 404
///
/// Escapes that decode to invalid UTF-8 match nothing.
pub fn match_route(raw_path: &str) -> Option<Route> {
    let decoded = urlencoding::decode(raw_path).ok()?;
    let path: &str = &decoded;
    if path == "/" || path.starts_with(INDEX_PREFIX) {
        return Some(Route::Index);
    }
    if path == NEW_PATH {
        return Some(Route::New);
    }
    if let Some(rest) = path.strip_prefix(ASSETS_PREFIX) {
        return Some(Route::Asset(rest.to_string()));
    }
    match_page_route(path)
}

/// Match `/(view|edit|save)/<title>` anchored at both ends
fn match_page_route(path: &str) -> Option<Route> {
    let rest = path.strip_prefix('/')?;
    let (action, title) = rest.split_once('/')?;
    let title = Title::parse(title).ok()?;
    match action {
        "view" => Some(Route::View(title)),
        "edit" => Some(Route::Edit(title)),
        "save" => Some(Route::Save(title)),
        _ => None,
    }
}

impl Route {
    /// Methods this route answers, used for 405 and `Allow`
    pub fn allowed_methods(&self) -> &'static [Method] {
        match self {
            Self::Index | Self::View(_) | Self::Edit(_) | Self::Asset(_) => &READ_METHODS,
            Self::Save(_) => &WRITE_METHODS,
            Self::New => &FORM_METHODS,
        }
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods().contains(method)
    }

    /// `Allow` header value for this route
    pub fn allow_header(&self) -> String {
        let mut methods: Vec<&str> = self.allowed_methods().iter().map(Method::as_str).collect();
        methods.push("OPTIONS");
        methods.join(", ")
    }

    /// Short name for logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::View(_) => "view",
            Self::Edit(_) => "edit",
            Self::Save(_) => "save",
            Self::New => "new",
            Self::Asset(_) => "assets",
        }
    }
}

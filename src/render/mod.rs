//! Template rendering
//!
//! Templates are parsed once at startup from `<templates_dir>/*.html`.
//! The parsed set is read-only afterwards and shared across requests.

use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};

use crate::error::WikiError;
use crate::store::Page;

pub const INDEX_TEMPLATE: &str = "index.html";
pub const VIEW_TEMPLATE: &str = "view.html";
pub const EDIT_TEMPLATE: &str = "edit.html";

const REQUIRED_TEMPLATES: [&str; 3] = [INDEX_TEMPLATE, VIEW_TEMPLATE, EDIT_TEMPLATE];

/// Data exposed to `view.html` and `edit.html`
#[derive(Serialize)]
struct PageContext<'a> {
    title: &'a str,
    body: &'a str,
}

/// Data exposed to `index.html`
#[derive(Serialize)]
struct IndexContext<'a> {
    titles: &'a [String],
}

/// Parsed template set
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Parse every `*.html` file in `dir`
    ///
    /// Fails on any syntax error or when a template the handlers need is absent.
    pub fn load(dir: &Path) -> Result<Self, WikiError> {
        let glob = dir.join("*.html");
        let tera = Tera::new(&glob.to_string_lossy())?;
        Self::from_tera(tera)
    }

    /// Build from in-memory `(name, source)` pairs
    #[cfg(test)]
    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self, WikiError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())?;
        Self::from_tera(tera)
    }

    fn from_tera(tera: Tera) -> Result<Self, WikiError> {
        for name in REQUIRED_TEMPLATES {
            if !tera.get_template_names().any(|t| t == name) {
                return Err(WikiError::MissingTemplate(name));
            }
        }
        Ok(Self { tera })
    }

    /// Render `view.html` or `edit.html` for a page
    pub fn render_page(&self, name: &str, page: &Page) -> Result<String, WikiError> {
        let body = page.body_text();
        let ctx = Context::from_serialize(PageContext {
            title: page.title.as_str(),
            body: &body,
        })?;
        Ok(self.tera.render(name, &ctx)?)
    }

    /// Render the page list
    pub fn render_index(&self, titles: &[String]) -> Result<String, WikiError> {
        let ctx = Context::from_serialize(IndexContext { titles })?;
        Ok(self.tera.render(INDEX_TEMPLATE, &ctx)?)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::routing::Title;

    /// Templates shipped in the repository
    pub fn shipped_templates() -> Templates {
        Templates::load(&Path::new(env!("CARGO_MANIFEST_DIR")).join("templates")).unwrap()
    }

    #[test]
    fn test_shipped_templates_parse() {
        let templates = shipped_templates();
        let names = templates.names();
        for required in REQUIRED_TEMPLATES {
            assert!(names.contains(&required), "missing {required}");
        }
    }

    #[test]
    fn test_render_view_escapes_body() {
        let templates = shipped_templates();
        let page = Page::new(Title::parse("Home").unwrap(), b"<b>hi</b>".to_vec());

        let html = templates.render_page(VIEW_TEMPLATE, &page).unwrap();
        assert!(html.contains("Home"));
        assert!(html.contains("&lt;b&gt;hi"));
        assert!(!html.contains("<b>hi</b>"));
    }

    #[test]
    fn test_render_edit_for_empty_page() {
        let templates = shipped_templates();
        let page = Page::empty(Title::parse("Fresh").unwrap());

        let html = templates.render_page(EDIT_TEMPLATE, &page).unwrap();
        assert!(html.contains("action=\"/save/Fresh\""));
        assert!(html.contains("<textarea name=\"body\""));
    }

    #[test]
    fn test_render_index_lists_titles() {
        let templates = shipped_templates();
        let titles = vec!["Alpha".to_string(), "Beta".to_string()];

        let html = templates.render_index(&titles).unwrap();
        assert!(html.contains("href=\"/view/Alpha\""));
        assert!(html.contains("href=\"/view/Beta\""));
    }

    #[test]
    fn test_missing_required_template() {
        let err = Templates::from_raw(&[("index.html", "x"), ("view.html", "y")]).unwrap_err();
        assert!(matches!(err, WikiError::MissingTemplate("edit.html")));
    }

    #[test]
    fn test_syntax_error_fails_load() {
        let err = Templates::from_raw(&[
            ("index.html", "{% for t in titles %}"),
            ("view.html", "y"),
            ("edit.html", "z"),
        ])
        .unwrap_err();
        assert!(matches!(err, WikiError::Render(_)));
    }

    #[test]
    fn test_missing_directory_fails_load() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Templates::load(&dir.path().join("none")).is_err());
    }

    #[test]
    fn test_render_error_surfaces() {
        let templates = Templates::from_raw(&[
            ("index.html", "{{ titles | length }}"),
            ("view.html", "{{ missing_variable }}"),
            ("edit.html", "{{ title }}"),
        ])
        .unwrap();
        let page = Page::empty(Title::parse("A").unwrap());

        let err = templates.render_page(VIEW_TEMPLATE, &page).unwrap_err();
        assert_eq!(err.status(), 500);
        assert!(err.detail().contains("missing_variable"));
    }
}

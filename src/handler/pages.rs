//! Wiki page handlers
//!
//! Each handler composes the page store with the template set. Errors are
//! returned to the dispatcher, which turns them into plain-text responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

use crate::config::AppState;
use crate::error::WikiError;
use crate::http::{self, FormValues};
use crate::logger;
use crate::render::{EDIT_TEMPLATE, VIEW_TEMPLATE};
use crate::routing::Title;
use crate::store::Page;

type HandlerResult = Result<Response<Full<Bytes>>, WikiError>;

/// Target of a bare `/new/` submission
const INDEX_PATH: &str = "/index/";

/// Render the list of every stored page
pub async fn index(state: &AppState, is_head: bool) -> HandlerResult {
    let titles = state.store.list().await?;
    let html = state.templates.render_index(&titles)?;
    Ok(http::build_html_response(html, is_head))
}

/// Show a page, or send the browser to the editor when it does not exist
pub async fn view(state: &AppState, title: &Title, is_head: bool) -> HandlerResult {
    let page = match state.store.load(title).await {
        Ok(page) => page,
        Err(WikiError::NotFound(_)) => {
            return Ok(http::build_redirect_response(&format!("/edit/{title}")));
        }
        Err(e) => return Err(e),
    };
    let html = state.templates.render_page(VIEW_TEMPLATE, &page)?;
    Ok(http::build_html_response(html, is_head))
}

/// Show the edit form; a missing page starts out empty
pub async fn edit(state: &AppState, title: &Title, is_head: bool) -> HandlerResult {
    let page = match state.store.load(title).await {
        Ok(page) => page,
        Err(WikiError::NotFound(_)) => Page::empty(title.clone()),
        Err(e) => return Err(e),
    };
    let html = state.templates.render_page(EDIT_TEMPLATE, &page)?;
    Ok(http::build_html_response(html, is_head))
}

/// Store the posted `body` field and redirect to the page
pub async fn save(state: &AppState, title: Title, form: &FormValues) -> HandlerResult {
    let page = Page::new(title, form.value_bytes("body").to_vec());
    state.store.save(&page).await?;
    logger::log_page_saved(page.title.as_str(), page.body.len());
    Ok(http::build_redirect_response(&format!("/view/{}", page.title)))
}

/// Redirect to the editor for the submitted `title`, or back to the index
///
/// The title is not validated here; the edit route rejects bad ones with 404.
pub fn new_page(form: &FormValues) -> Response<Full<Bytes>> {
    let title = form.value("title");
    if title.is_empty() {
        return http::build_redirect_response(INDEX_PATH);
    }
    http::build_redirect_response(&format!("/edit/{}", urlencoding::encode(&title)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::router::tests::{body_text, location, test_state};

    fn title(s: &str) -> Title {
        Title::parse(s).unwrap()
    }

    fn form(body: &str) -> FormValues {
        FormValues::new(None, Some(body.as_bytes()))
    }

    #[tokio::test]
    async fn test_view_missing_redirects_to_edit() {
        let (_dir, state) = test_state();
        let resp = view(&state, &title("Ghost"), false).await.unwrap();
        assert_eq!(resp.status(), 302);
        assert_eq!(location(&resp), "/edit/Ghost");
    }

    #[tokio::test]
    async fn test_edit_missing_renders_empty_form() {
        let (dir, state) = test_state();
        let resp = edit(&state, &title("Fresh"), false).await.unwrap();
        assert_eq!(resp.status(), 200);

        let html = body_text(resp).await;
        assert!(html.contains("Editing Fresh"));
        assert!(html.contains("action=\"/save/Fresh\""));
        assert!(html.contains(">\n</textarea>"));
        // editing does not create the file
        assert!(!dir.path().join("texts").join("Fresh.txt").exists());
    }

    #[tokio::test]
    async fn test_edit_existing_prefills_body() {
        let (_dir, state) = test_state();
        save(&state, title("Draft"), &form("body=first+draft")).await.unwrap();

        let html = body_text(edit(&state, &title("Draft"), false).await.unwrap()).await;
        assert!(html.contains(">\nfirst draft</textarea>"));
    }

    #[tokio::test]
    async fn test_save_round_trip_is_exact() {
        let (dir, state) = test_state();
        let resp = save(&state, title("Exact"), &form("body=line1%0D%0Aline2%09tab"))
            .await
            .unwrap();
        assert_eq!(location(&resp), "/view/Exact");

        let stored = std::fs::read(dir.path().join("texts").join("Exact.txt")).unwrap();
        assert_eq!(stored, b"line1\r\nline2\ttab");

        let html = body_text(view(&state, &title("Exact"), false).await.unwrap()).await;
        assert!(html.contains("line1\r\nline2\ttab"));
    }

    #[tokio::test]
    async fn test_save_keeps_non_utf8_bytes() {
        let (dir, state) = test_state();
        save(&state, title("Bin"), &form("body=%FF%FEok")).await.unwrap();

        let stored = std::fs::read(dir.path().join("texts").join("Bin.txt")).unwrap();
        assert_eq!(stored, b"\xff\xfeok");
        let page = state.store.load(&title("Bin")).await.unwrap();
        assert_eq!(page.body, b"\xff\xfeok");
    }

    #[tokio::test]
    async fn test_leading_newline_survives_edit_cycle() {
        let (_dir, state) = test_state();
        save(&state, title("Lead"), &form("body=%0Afirst")).await.unwrap();

        let html = body_text(edit(&state, &title("Lead"), false).await.unwrap()).await;
        // the parser drops the newline right after the tag, not the body's own
        assert!(html.contains(">\n\nfirst</textarea>"));
    }

    #[tokio::test]
    async fn test_index_lists_each_title_once() {
        let (_dir, state) = test_state();
        save(&state, title("Alpha"), &form("body=a")).await.unwrap();
        save(&state, title("Beta"), &form("body=b")).await.unwrap();
        save(&state, title("Alpha"), &form("body=again")).await.unwrap();

        let html = body_text(index(&state, false).await.unwrap()).await;
        assert_eq!(html.matches("href=\"/view/Alpha\"").count(), 1);
        assert_eq!(html.matches("href=\"/view/Beta\"").count(), 1);
    }

    #[tokio::test]
    async fn test_index_fails_when_pages_dir_missing() {
        let (dir, state) = test_state();
        std::fs::remove_dir_all(dir.path().join("texts")).unwrap();

        let err = index(&state, false).await.unwrap_err();
        assert_eq!(err.status(), 500);
    }

    #[tokio::test]
    async fn test_save_fails_when_pages_dir_missing() {
        let (dir, state) = test_state();
        std::fs::remove_dir_all(dir.path().join("texts")).unwrap();

        let err = save(&state, title("Lost"), &form("body=x")).await.unwrap_err();
        assert!(matches!(err, WikiError::Io(_)));
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let (_dir, state) = test_state();
        let resp = index(&state, true).await.unwrap();
        assert_eq!(resp.status(), 200);
        assert!(body_text(resp).await.is_empty());
    }

    #[test]
    fn test_new_page_redirects() {
        assert_eq!(location(&new_page(&form("title=Foo"))), "/edit/Foo");
        assert_eq!(location(&new_page(&form("title="))), "/index/");
        assert_eq!(location(&new_page(&form(""))), "/index/");
        assert_eq!(location(&new_page(&form("title=a+b"))), "/edit/a%20b");
    }
}

//! Error taxonomy for request handling and startup

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WikiError {
    /// Page file absent. View redirects and Edit substitutes an empty page.
    #[error("page '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Render(#[from] tera::Error),

    #[error("missing required template '{0}'")]
    MissingTemplate(&'static str),

    #[error("invalid page title '{0}'")]
    InvalidTitle(String),

    #[error("no route for '{0}'")]
    RouteMismatch(String),

    #[error("request body exceeds {0} bytes")]
    BodyTooLarge(u64),

    #[error("unreadable request body: {0}")]
    BadRequest(String),

    /// `/save/` only accepts urlencoded forms; anything else leaves the page alone
    #[error("unsupported content type '{0}', expected {expected}", expected = crate::http::form::FORM_CONTENT_TYPE)]
    UnsupportedMediaType(String),

    #[error("request not served within {0} seconds")]
    Timeout(u64),
}

impl WikiError {
    /// Status code used when this error reaches the client
    pub const fn status(&self) -> u16 {
        match self {
            Self::NotFound(_) | Self::RouteMismatch(_) | Self::InvalidTitle(_) => 404,
            Self::BodyTooLarge(_) => 413,
            Self::BadRequest(_) => 400,
            Self::UnsupportedMediaType(_) => 415,
            Self::Timeout(_) => 503,
            Self::Io(_) | Self::Render(_) | Self::MissingTemplate(_) => 500,
        }
    }

    /// Raw error text including every source in the chain
    ///
    /// Tera reports the useful part ("Variable `x` not found") as a source.
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            let text = err.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = err.source();
        }
        message
    }
}

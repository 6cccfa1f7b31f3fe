use crate::model::Loose;
use askama::Template;
use rocket::http::{ContentType, Status};
use rocket::request::Request;
use rocket::response::{self, Responder, Response};
use std::io::Cursor;

#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Token endpoint answered with `success: false`; carries its `msg`.
    #[error("login rejected: {0}")]
    LoginError(Loose),
    /// Endpoint answered 200 but reported `success` other than true.
    #[error("API error: {msg}")]
    ApiError { code: Option<Loose>, msg: Loose },
    #[error("API responded {status}: {body}")]
    HttpStatus { status: u16, body: String },
    /// Response body and the reason it could not be decoded.
    #[error("invalid API response ({1}): {0}")]
    InvalidResponse(String, String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("unable to render metrics")]
    FormatError,
    #[error("internal error: {0}")]
    InternalError(String),
}

/* upstream bodies end up in `detail`; html templates escape it */
#[derive(Template)]
#[template(
    source = "<html><body><h3>{{ title }}</h3>Downstream API response: <code>{{ detail }}</code></body></html>",
    ext = "html"
)]
struct ErrorPage<'a> {
    title: &'a str,
    detail: &'a str,
}

fn html(status: Status, title: &str, detail: &str) -> response::Result<'static> {
    let page = ErrorPage { title, detail }
        .render()
        .map_err(|_| Status::InternalServerError)?;
    Response::build()
        .status(status)
        .sized_body(page.len(), Cursor::new(page))
        .header(ContentType::new("text", "html"))
        .ok()
}

impl<'r> Responder<'r, 'static> for Error {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let detail = self.to_string();
        match self {
            Error::HttpStatus { status: 429, .. } => {
                html(Status::TooManyRequests, "429 Too Many Requests", &detail)
            }
            Error::LoginError(_) | Error::HttpStatus { status: 401 | 403, .. } => {
                html(Status::Forbidden, "403 Forbidden", &detail)
            }
            Error::Timeout(_) => html(Status::GatewayTimeout, "504 Gateway Timeout", &detail),
            _ => html(Status::InternalServerError, "Unknown exception", &detail),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn upstream_message_is_shown_verbatim() {
        let error = Error::LoginError(Loose::Text("appId is invalid".to_string()));
        assert_eq!("login rejected: appId is invalid", error.to_string());

        let error = Error::ApiError {
            code: Some(Loose::Text("2101019".to_string())),
            msg: Loose::Structured(json!({"detail": "station not found"})),
        };
        assert_eq!(
            r#"API error: {"detail":"station not found"}"#,
            error.to_string()
        );
    }

    #[test]
    fn http_status_carries_body() {
        let error = Error::HttpStatus {
            status: 502,
            body: "bad gateway".to_string(),
        };
        assert_eq!("API responded 502: bad gateway", error.to_string());
    }

    #[test]
    fn upstream_body_is_escaped_in_page() {
        let error = Error::HttpStatus {
            status: 500,
            body: "<script>alert(1)</script> & more".to_string(),
        };
        let detail = error.to_string();
        let page = ErrorPage {
            title: "Unknown exception",
            detail: &detail,
        }
        .render()
        .unwrap();

        assert!(page.starts_with("<html><body><h3>Unknown exception</h3>"));
        assert!(page.contains("alert(1)"));
        assert!(!page.contains("<script>"));
        assert!(!page.contains("</script>"));
        assert!(!page.contains(" & more"));
    }
}

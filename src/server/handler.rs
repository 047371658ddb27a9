// src/server/handler.rs

//! Request → file mapping for the static server.

use std::convert::Infallible;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Method, Request, Response, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::{debug, warn};

use crate::server::content_type;

/// File served for directory requests.
pub const INDEX_FILE: &str = "index.html";

/// Map a request path onto a file path beneath `root`.
///
/// Each `/`-separated segment is percent-decoded on its own. Returns `None`
/// for segments that are not valid UTF-8 once decoded, that decode to `..`,
/// or that smuggle in a separator (`%2F`) or a drive prefix.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut resolved = root.to_path_buf();
    for segment in request_path.split('/') {
        let decoded = percent_decode_str(segment).decode_utf8().ok()?;
        let mut components = Path::new(decoded.as_ref()).components();
        match (components.next(), components.next()) {
            (None, _) | (Some(Component::CurDir), None) => {}
            (Some(Component::Normal(part)), None) => resolved.push(part),
            _ => return None,
        }
    }
    Some(resolved)
}

/// Serve one request from `root`. Never fails; IO problems become status codes.
pub async fn handle<B>(root: &Path, req: Request<B>) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match method {
        Method::GET | Method::HEAD => serve_file(root, &path, method == Method::HEAD).await,
        _ => {
            let mut resp = status_response(StatusCode::METHOD_NOT_ALLOWED);
            resp.headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            resp
        }
    };

    debug!(%method, path = %path, status = response.status().as_u16(), "served request");
    Ok(response)
}

async fn serve_file(root: &Path, request_path: &str, head_only: bool) -> Response<Full<Bytes>> {
    let Some(mut target) = resolve_path(root, request_path) else {
        return status_response(StatusCode::NOT_FOUND);
    };

    if tokio::fs::metadata(&target)
        .await
        .is_ok_and(|meta| meta.is_dir())
    {
        target.push(INDEX_FILE);
    }

    match tokio::fs::read(&target).await {
        Ok(contents) => {
            let len = contents.len();
            let body = if head_only {
                Bytes::new()
            } else {
                Bytes::from(contents)
            };
            let mut resp = Response::new(Full::new(body));
            resp.headers_mut().insert(
                CONTENT_TYPE,
                HeaderValue::from_static(content_type::for_path(&target)),
            );
            if head_only {
                resp.headers_mut().insert(CONTENT_LENGTH, HeaderValue::from(len));
            }
            resp
        }
        Err(err) if matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
            status_response(StatusCode::NOT_FOUND)
        }
        Err(err) => {
            warn!(?target, error = %err, "failed to read file");
            status_response(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn status_response(status: StatusCode) -> Response<Full<Bytes>> {
    let reason = status.canonical_reason().unwrap_or("error");
    let mut resp = Response::new(Full::new(Bytes::from(format!("{reason}\n"))));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    resp
}

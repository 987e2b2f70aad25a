//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: size check, path matching and
//! dispatch to the file or collection handler.

use crate::config::AppState;
use crate::handler::{collection, resource};
use crate::http::{self, response::ResponseBody};
use crate::logger;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::{Request, Response};
use std::convert::Infallible;
use std::fmt::Display;
use std::sync::Arc;

const COLLECTION_PATH: &str = "/files";
const RESOURCE_PREFIX: &str = "/files/";

/// Route selected from the request path
#[derive(Debug, PartialEq, Eq)]
pub enum Route {
    /// `/files`
    Collection,
    /// `/files/{name...}`, percent-decoded
    Resource(String),
    NotFound,
}

/// Match a request path against the two file routes
pub fn match_route(path: &str) -> Route {
    if path == COLLECTION_PATH {
        return Route::Collection;
    }

    match path.strip_prefix(RESOURCE_PREFIX) {
        Some(raw) if !raw.is_empty() => match urlencoding::decode(raw) {
            Ok(name) => Route::Resource(name.into_owned()),
            Err(e) => {
                logger::log_warning(&format!("Undecodable file name in path '{path}': {e}"));
                Route::NotFound
            }
        },
        _ => Route::NotFound,
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    if state.config.logging.access_log {
        logger::log_request(req.method(), req.uri(), req.version());
    }

    let mut response = if let Some(resp) = check_body_size(&req, state.config.http.max_body_size)
    {
        resp
    } else {
        let (parts, body) = req.into_parts();
        let store = state.store.as_ref();
        match match_route(parts.uri.path()) {
            Route::Collection => collection::list_all(&parts.method, store).await,
            Route::Resource(name) => resource::handle(&parts.method, &name, body, store).await,
            Route::NotFound => http::build_404_response(),
        }
    };

    set_server_header(&mut response, &state.config.http.server_name);
    Ok(response)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<ResponseBody>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn set_server_header(response: &mut Response<ResponseBody>, server_name: &str) {
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            response.headers_mut().insert(SERVER, value);
        }
        Err(e) => logger::log_warning(&format!("Invalid server name '{server_name}': {e}")),
    }
}

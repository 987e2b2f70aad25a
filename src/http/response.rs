//! HTTP response building module
//!
//! Builders for the fixed status responses the file API returns, plus the
//! streaming body used to serve file contents.

use crate::storage::FileReader;
use futures_util::TryStreamExt;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Full, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use std::io;
use tokio_util::io::ReaderStream;

/// Methods accepted on a single file resource
pub const RESOURCE_METHODS: &str = "GET, HEAD, PUT, DELETE";

/// Body of every response
///
/// Fixed responses never fail; a streamed file body fails with the read
/// error, which makes hyper abort the connection.
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Body holding `data` in full
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Body streamed from `reader` chunk by chunk
pub fn stream_body(reader: FileReader) -> ResponseBody {
    StreamBody::new(ReaderStream::new(reader).map_ok(Frame::data)).boxed_unsync()
}

/// Build a response with no body (201, 204, ...)
pub fn build_empty_response(status: StatusCode) -> Response<ResponseBody> {
    Response::builder()
        .status(status)
        .body(full_body(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "text/plain")
        .body(full_body("404 Not Found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full_body("404 Not Found"))
        })
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &str) -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Allow", allow)
        .body(full_body(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(full_body(Bytes::new()))
        })
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::PAYLOAD_TOO_LARGE)
        .header("Content-Type", "text/plain")
        .body(full_body("413 Payload Too Large"))
        .unwrap_or_else(|e| {
            log_build_error("413", &e);
            Response::new(full_body("413 Payload Too Large"))
        })
}

/// Build 500 Internal Server Error response
///
/// The body never carries error detail; that only goes to the log.
pub fn build_500_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header("Content-Type", "text/plain")
        .body(full_body("500 Internal Server Error"))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut resp = Response::new(full_body(Bytes::new()));
            *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            resp
        })
}

/// Finish a builder that already carries the file metadata headers
///
/// `Content-Length` comes from the builder, never from the body, so a
/// streamed body that fails midway leaves the response short.
pub fn build_file_response(headers: Builder, body: ResponseBody) -> Response<ResponseBody> {
    headers
        .status(StatusCode::OK)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            build_500_response()
        })
}

/// Build JSON response, keeping Content-Length for HEAD
pub fn build_json_response(json: Vec<u8>, is_head: bool) -> Response<ResponseBody> {
    let content_length = json.len();
    let body = if is_head {
        Bytes::new()
    } else {
        Bytes::from(json)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Content-Length", content_length)
        .body(full_body(body))
        .unwrap_or_else(|e| {
            log_build_error("JSON", &e);
            build_500_response()
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

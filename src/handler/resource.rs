//! Single file handler
//!
//! Maps GET, HEAD, PUT and DELETE on `/files/{name}` onto the storage
//! capability. Every failure is answered where it happens; nothing is retried.

use crate::http::response::{build_file_response, full_body, stream_body, ResponseBody};
use crate::http::{self, mime};
use crate::logger;
use crate::storage::{FileStore, FileWriter, StoreError};
use http_body_util::BodyExt;
use hyper::body::{Body, Bytes};
use hyper::http::response::Builder;
use hyper::{Method, Response, StatusCode};
use std::fmt::Display;
use tokio::io::AsyncWriteExt;

/// Handle one request for the file `name`
pub async fn handle<B>(
    method: &Method,
    name: &str,
    body: B,
    store: &dyn FileStore,
) -> Response<ResponseBody>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    logger::log_file_request(method, name);

    match *method {
        Method::GET => get_file(name, store).await,
        Method::HEAD => head_file(name, store).await,
        Method::PUT => put_file(name, body, store).await,
        Method::DELETE => delete_file(name, store).await,
        _ => http::build_405_response(http::RESOURCE_METHODS),
    }
}

/// Stat `name` and prepare its metadata headers
///
/// On success the returned builder carries `Content-Type` (omitted for
/// unknown extensions) and `Content-Length`, with the status left to the
/// caller. On failure the complete 404/500 response is returned instead.
#[allow(clippy::result_large_err)]
pub async fn resolve_metadata(
    name: &str,
    store: &dyn FileStore,
) -> Result<Builder, Response<ResponseBody>> {
    match store.stat(name).await {
        Ok(meta) => {
            let mut headers = Response::builder();
            let content_type = mime::content_type_for(name);
            if !content_type.is_empty() {
                headers = headers.header("Content-Type", content_type);
            }
            Ok(headers.header("Content-Length", meta.size))
        }
        Err(StoreError::NotFound) => Err(http::build_404_response()),
        Err(err) => {
            logger::log_store_error("stat", name, &err);
            Err(http::build_500_response())
        }
    }
}

async fn get_file(name: &str, store: &dyn FileStore) -> Response<ResponseBody> {
    let headers = match resolve_metadata(name, store).await {
        Ok(headers) => headers,
        Err(resp) => return resp,
    };

    // The file was just stat'ed, so any open failure here is unexpected
    let reader = match store.open(name).await {
        Ok(reader) => reader,
        Err(err) => {
            logger::log_store_error("open", name, &err);
            return http::build_500_response();
        }
    };

    // Status and Content-Length are fixed from here on. A read error ends
    // the body early and hyper drops the connection.
    let owned_name = name.to_string();
    let body = stream_body(reader)
        .map_err(move |err| {
            logger::log_error(&format!("Got error while reading file '{owned_name}': {err}"));
            err
        })
        .boxed_unsync();

    build_file_response(headers, body)
}

async fn head_file(name: &str, store: &dyn FileStore) -> Response<ResponseBody> {
    match resolve_metadata(name, store).await {
        Ok(headers) => build_file_response(headers, full_body(Bytes::new())),
        Err(resp) => resp,
    }
}

async fn put_file<B>(name: &str, body: B, store: &dyn FileStore) -> Response<ResponseBody>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    // Any stat failure counts as "did not exist", not only NotFound
    let success = if store.stat(name).await.is_ok() {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CREATED
    };

    let mut writer = match store.create(name).await {
        Ok(writer) => writer,
        Err(err) => {
            logger::log_store_error("create", name, &err);
            return http::build_500_response();
        }
    };

    // A failure past this point leaves a truncated file behind
    let data = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            logger::log_error(&format!("Got error while receiving upload for '{name}': {err}"));
            return http::build_500_response();
        }
    };

    if let Err(err) = write_all(&mut writer, &data).await {
        logger::log_error(&format!("Got error while writing file '{name}': {err}"));
        return http::build_500_response();
    }

    http::build_empty_response(success)
}

async fn write_all(writer: &mut FileWriter, data: &[u8]) -> std::io::Result<()> {
    writer.write_all(data).await?;
    writer.shutdown().await
}

async fn delete_file(name: &str, store: &dyn FileStore) -> Response<ResponseBody> {
    match store.remove(name).await {
        Ok(()) => http::build_empty_response(StatusCode::NO_CONTENT),
        Err(StoreError::NotFound) => http::build_404_response(),
        Err(err) => {
            logger::log_store_error("remove", name, &err);
            http::build_500_response()
        }
    }
}

//! File collection handler
//!
//! Lists the direct children of the storage root as a JSON array.

use crate::http::response::{build_json_response, ResponseBody};
use crate::http::{self, mime};
use crate::logger;
use crate::storage::{DirEntry, FileStore};
use hyper::{Method, Response};
use serde::{Deserialize, Serialize};

/// Size reported for entries whose metadata could not be read
pub const SIZE_UNAVAILABLE: i64 = -1;

/// One element of the listing body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub size: i64,
    pub mimetype: String,
}

impl From<DirEntry> for FileEntry {
    fn from(entry: DirEntry) -> Self {
        let mimetype = mime::content_type_for(&entry.name).to_string();
        let size = match entry.meta {
            Ok(meta) => i64::try_from(meta.size).unwrap_or(SIZE_UNAVAILABLE),
            Err(err) => {
                logger::log_store_error("stat", &entry.name, &err);
                SIZE_UNAVAILABLE
            }
        };

        Self {
            name: entry.name,
            size,
            mimetype,
        }
    }
}

/// Handle a request on `/files`
///
/// Every method lists; HEAD only drops the body.
pub async fn list_all(method: &Method, store: &dyn FileStore) -> Response<ResponseBody> {
    let is_head = *method == Method::HEAD;

    let entries = match store.list().await {
        Ok(entries) => entries,
        Err(err) => {
            logger::log_store_error("list", ".", &err);
            return http::build_500_response();
        }
    };

    let files: Vec<FileEntry> = entries.into_iter().map(FileEntry::from).collect();

    match serde_json::to_vec(&files) {
        Ok(json) => build_json_response(json, is_head),
        Err(err) => {
            logger::log_error(&format!("Unable to encode file entries to json: {err}"));
            http::build_500_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::FailingStore;
    use crate::storage::MemoryStore;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use tokio::io::AsyncWriteExt;

    async fn put(store: &MemoryStore, name: &str, data: &[u8]) {
        let mut writer = store.create(name).await.unwrap();
        writer.write_all(data).await.unwrap();
        writer.shutdown().await.unwrap();
    }

    async fn listing(resp: Response<ResponseBody>) -> Vec<FileEntry> {
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_empty_root() {
        let store = MemoryStore::new();
        let resp = list_all(&Method::GET, &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()["Content-Type"], "application/json");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"[]");
    }

    #[tokio::test]
    async fn test_entries_carry_size_and_mimetype() {
        let store = MemoryStore::new();
        put(&store, "a.txt", b"hello").await;
        put(&store, "data.unknownext", b"??").await;
        store.create_dir("nested").unwrap();
        put(&store, "nested/b.png", b"png").await;

        let files = listing(list_all(&Method::GET, &store).await).await;
        assert_eq!(
            files,
            vec![
                FileEntry {
                    name: "a.txt".into(),
                    size: 5,
                    mimetype: "text/plain".into(),
                },
                FileEntry {
                    name: "data.unknownext".into(),
                    size: 2,
                    mimetype: String::new(),
                },
                FileEntry {
                    name: "nested".into(),
                    size: 0,
                    mimetype: String::new(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_unreadable_entry_gets_sentinel_size() {
        let store = FailingStore {
            unreadable: vec!["broken.json".into()],
            ..FailingStore::default()
        };
        put(&store.inner, "broken.json", b"{}").await;
        put(&store.inner, "ok.json", b"[]").await;

        let files = listing(list_all(&Method::GET, &store).await).await;
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].size, SIZE_UNAVAILABLE);
        assert_eq!(files[0].mimetype, "application/json");
        assert_eq!(files[1].size, 2);
    }

    #[tokio::test]
    async fn test_list_failure_is_500() {
        let store = FailingStore {
            fail_list: true,
            ..FailingStore::default()
        };
        let resp = list_all(&Method::GET, &store).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_head_has_no_body() {
        let store = MemoryStore::new();
        put(&store, "a.txt", b"hello").await;

        let resp = list_all(&Method::HEAD, &store).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_ne!(resp.headers()["Content-Length"], "0");
        let body = resp.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_any_method_lists() {
        let store = MemoryStore::new();
        put(&store, "a.txt", b"hello").await;

        for method in [Method::POST, Method::DELETE, Method::PUT] {
            let files = listing(list_all(&method, &store).await).await;
            assert_eq!(files.len(), 1, "method {method}");
            assert_eq!(files[0].name, "a.txt");
        }
        // Listing never touches the files themselves
        assert_eq!(store.stat("a.txt").await.unwrap().size, 5);
    }
}

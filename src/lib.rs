//! HTTP file storage server
//!
//! Stores, serves, lists and deletes files under a single storage root:
//!
//! | Method | Path            | Behavior                                   |
//! |--------|-----------------|--------------------------------------------|
//! | GET    | `/files/{name}` | file bytes with Content-Type/Content-Length |
//! | HEAD   | `/files/{name}` | same headers, no body                       |
//! | PUT    | `/files/{name}` | 201 when new, 204 when replaced             |
//! | DELETE | `/files/{name}` | 204, or 404 when missing                    |
//! | any    | `/files`        | JSON array of `{name, size, mimetype}`      |

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod storage;

//! 原生 Web API 封装模块
//!
//! 此模块提供对浏览器原生 API 的轻量级封装：
//! HTTP 传输、键值存储、路由。页面与业务流程只依赖这里的 trait。

mod http;
pub mod route;
pub mod router;
mod storage;

#[cfg(test)]
pub use http::MockTransport;
pub use http::{FetchTransport, HttpRequest, HttpResponse, Transport};
pub use storage::{BrowserStorage, KeyValueStore, MemoryStore, listen_storage_changes};

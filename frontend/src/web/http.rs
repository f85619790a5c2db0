//! HTTP 传输层
//!
//! `Transport` 只负责把请求发出去并取回状态码与响应体，
//! 不解释状态码、不碰会话，更不做导航。浏览器实现基于 `gloo-net`。

use std::rc::Rc;

use gloo_net::http::{Request, RequestBuilder};
use oms_shared::protocol::HttpMethod;

use crate::error::{ApiError, ApiResult};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// 添加请求头
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// 设置 JSON 请求体
    pub fn with_json_body(mut self, body: String) -> Self {
        self.body = Some(body);
        self.with_header("Content-Type", "application/json")
    }

    /// 按名称查找请求头（不区分大小写）
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 传输特性 (Trait)
/// (?Send) 是因为浏览器环境下的 future 不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait Transport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

#[async_trait::async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Rc<T> {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        (**self).send(req).await
    }
}

// =========================================================
// 实现层: 浏览器 fetch (gloo-net)
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    fn builder(req: &HttpRequest) -> RequestBuilder {
        let mut builder = match req.method {
            HttpMethod::Get => Request::get(&req.url),
            HttpMethod::Post => Request::post(&req.url),
            HttpMethod::Put => Request::put(&req.url),
            HttpMethod::Delete => Request::delete(&req.url),
        };
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }
        builder
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let builder = Self::builder(&req);

        let response = match req.body {
            Some(body) => builder.body(body)?.send().await?,
            None => builder.send().await?,
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::decode(format!("读取响应体失败: {}", e)).with_status(status))?;

        Ok(HttpResponse { status, body })
    }
}

// =========================================================
// 测试工具: MockTransport
// =========================================================

#[cfg(test)]
pub use mock::MockTransport;

#[cfg(test)]
mod mock {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// 按 "METHOD url" 返回预设响应，并记录所有发出的请求
    pub struct MockTransport {
        responses: RefCell<HashMap<String, HttpResponse>>,
        network_down: RefCell<bool>,
        pub requests: RefCell<Vec<HttpRequest>>,
    }

    impl MockTransport {
        pub fn new() -> Rc<Self> {
            Rc::new(Self {
                responses: RefCell::new(HashMap::new()),
                network_down: RefCell::new(false),
                requests: RefCell::new(Vec::new()),
            })
        }

        pub fn mock(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
            self.mock_raw(method, url, status, &body.to_string());
        }

        pub fn mock_raw(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
            self.responses.borrow_mut().insert(
                format!("{} {}", method.as_str(), url),
                HttpResponse::new(status, body),
            );
        }

        pub fn fail_network(&self) {
            *self.network_down.borrow_mut() = true;
        }

        pub fn request_count(&self) -> usize {
            self.requests.borrow().len()
        }

        pub fn last_request(&self) -> Option<HttpRequest> {
            self.requests.borrow().last().cloned()
        }
    }

    #[async_trait::async_trait(?Send)]
    impl Transport for MockTransport {
        async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
            self.requests.borrow_mut().push(req.clone());

            if *self.network_down.borrow() {
                return Err(ApiError::network("connection refused"));
            }

            let key = format!("{} {}", req.method.as_str(), req.url);
            Ok(self
                .responses
                .borrow()
                .get(&key)
                .cloned()
                .unwrap_or_else(|| HttpResponse::new(404, "Not Found")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_sets_content_type() {
        let req = HttpRequest::new("/products", HttpMethod::Post).with_json_body("{}".to_string());
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn response_ok_range() {
        assert!(HttpResponse::new(204, "").ok());
        assert!(!HttpResponse::new(401, "").ok());
    }
}

//! HTTP 客户端封装
//!
//! 所有请求都经过 `ApiClient`：
//! - 请求拦截：会话中有 token 时附加 `Authorization: Bearer <token>`
//! - 响应拦截：按状态码分类为 `ApiError`；401 额外通知唯一的顶层处理器
//!
//! 客户端本身从不导航，导航由路由服务根据会话状态决定。

use std::cell::RefCell;
use std::rc::Rc;

use oms_shared::protocol::{ApiRequest, HttpMethod};
use oms_shared::{BEARER_PREFIX, HEADER_AUTHORIZATION};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::normalize_base_url;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;
use crate::web::{HttpRequest, HttpResponse, Transport};

/// 401 的顶层处理器
pub type UnauthorizedHandler = Rc<dyn Fn(&ApiError)>;

/// 是否把 401 上报给顶层处理器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reporting {
    /// 默认：上报，处理器清除会话并提示
    Report,
    /// 身份检查用：由调用方自行把 401/422 解释为“没有会话”
    Quiet,
}

pub struct ApiClient<T: Transport> {
    base_url: String,
    transport: T,
    session: Session,
    on_unauthorized: RefCell<Option<UnauthorizedHandler>>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, transport: T, session: Session) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            transport,
            session,
            on_unauthorized: RefCell::new(None),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 注册顶层 401 处理器（后注册的覆盖先注册的）
    pub fn on_unauthorized(&self, handler: UnauthorizedHandler) {
        *self.on_unauthorized.borrow_mut() = Some(handler);
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    // =========================================================
    // 动词操作
    // =========================================================

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.execute(HttpMethod::Get, path, None, Reporting::Report)
            .await
    }

    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<R> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::invalid(e.to_string()))?;
        self.execute(HttpMethod::Post, path, Some(body), Reporting::Report)
            .await
    }

    pub async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<R> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::invalid(e.to_string()))?;
        self.execute(HttpMethod::Put, path, Some(body), Reporting::Report)
            .await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> ApiResult<R> {
        self.execute(HttpMethod::Delete, path, None, Reporting::Report)
            .await
    }

    /// 发送类型化的协议请求
    pub async fn send<Q: ApiRequest>(&self, request: &Q) -> ApiResult<Q::Response> {
        self.send_with(request, Reporting::Report).await
    }

    pub async fn send_with<Q: ApiRequest>(
        &self,
        request: &Q,
        reporting: Reporting,
    ) -> ApiResult<Q::Response> {
        let body = if Q::METHOD.has_body() {
            Some(serde_json::to_string(request).map_err(|e| ApiError::invalid(e.to_string()))?)
        } else {
            None
        };
        self.execute(Q::METHOD, &request.path(), body, reporting)
            .await
    }

    // =========================================================
    // 拦截与分类
    // =========================================================

    async fn execute<R: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<String>,
        reporting: Reporting,
    ) -> ApiResult<R> {
        let request = self.authorize(self.build(method, path, body));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                log_warn!("[Api] {} {} failed: {}", method.as_str(), path, e);
                return Err(e);
            }
        };

        match Self::classify(response) {
            Ok(value) => Ok(value),
            Err(e) => {
                log_warn!("[Api] {} {} -> {}", method.as_str(), path, e);
                if e.is_unauthorized() && reporting == Reporting::Report {
                    self.report_unauthorized(&e);
                }
                Err(e)
            }
        }
    }

    fn build(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let request =
            HttpRequest::new(self.url(path), method).with_header("Accept", "application/json");
        match body {
            Some(body) => request.with_json_body(body),
            None => request,
        }
    }

    /// 请求拦截：有 token 才附加认证头，否则按未认证请求发送
    fn authorize(&self, request: HttpRequest) -> HttpRequest {
        match self.session.token() {
            Some(token) => {
                request.with_header(HEADER_AUTHORIZATION, &format!("{}{}", BEARER_PREFIX, token))
            }
            None => request,
        }
    }

    /// 响应拦截：非 2xx 转为分类错误，2xx 解析响应体（空响应体按 `null` 解析）
    fn classify<R: DeserializeOwned>(response: HttpResponse) -> ApiResult<R> {
        if let Some(err) = ApiError::from_response(response.status, &response.body) {
            return Err(err);
        }

        let body = response.body.trim();
        let body = if body.is_empty() { "null" } else { body };
        serde_json::from_str(body)
            .map_err(|e| ApiError::decode(e.to_string()).with_status(response.status))
    }

    /// 补报静默请求的错误，只有 401 会交给顶层处理器
    pub fn report(&self, error: &ApiError) {
        if error.is_unauthorized() {
            self.report_unauthorized(error);
        }
    }

    fn report_unauthorized(&self, error: &ApiError) {
        // 先克隆出处理器再调用，处理器内可以安全地重新注册
        let handler = self.on_unauthorized.borrow().clone();
        match handler {
            Some(handler) => handler(error),
            None => {
                log_warn!("[Api] 401 without a registered handler, clearing session");
                self.session.sign_out();
            }
        }
    }
}

#[cfg(test)]
mod tests;

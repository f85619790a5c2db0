use std::fmt;

use oms_shared::ErrorBody;

// =========================================================
// 错误分类枚举
// =========================================================

/// API 调用失败的分类
/// 每个分类对应前端的一种处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// 401: 凭证缺失或失效，由顶层处理器清除会话
    Unauthorized,
    /// 422: 凭证格式错误（身份检查时与 401 同等对待）
    Unprocessable,
    /// 404: 资源不存在
    NotFound,
    /// 其他 4xx: 校验或业务规则失败，就地提示
    Rejected,
    /// 5xx: 服务端错误
    Server,
    /// 请求未能发出或未收到响应
    Network,
    /// 2xx 但响应体无法解析
    Decode,
    /// 请求本身无法构造（如序列化失败）
    Invalid,
}

impl ApiErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Unauthorized => "UNAUTHORIZED",
            ApiErrorKind::Unprocessable => "UNPROCESSABLE",
            ApiErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ApiErrorKind::Rejected => "REJECTED",
            ApiErrorKind::Server => "SERVER_ERROR",
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Decode => "DECODE_ERROR",
            ApiErrorKind::Invalid => "INVALID_REQUEST",
        }
    }

    /// 按 HTTP 状态码分类，2xx 返回 None
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200..=299 => None,
            401 => Some(ApiErrorKind::Unauthorized),
            404 => Some(ApiErrorKind::NotFound),
            422 => Some(ApiErrorKind::Unprocessable),
            400..=499 => Some(ApiErrorKind::Rejected),
            _ => Some(ApiErrorKind::Server),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    /// 有响应时的 HTTP 状态码
    pub status: Option<u16>,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Invalid, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Unauthorized, message).with_status(401)
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// 非 2xx 响应转换为错误；消息优先取 `{description|message|msg}`
    pub fn from_response(status: u16, body: &str) -> Option<Self> {
        let kind = ApiErrorKind::from_status(status)?;
        let message = ErrorBody::extract(body).unwrap_or_else(|| default_message(kind).to_string());
        Some(Self::new(kind, message).with_status(status))
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ApiErrorKind::Unauthorized
    }

    /// 身份检查时 401 / 422 都表示“没有会话”
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self.kind,
            ApiErrorKind::Unauthorized | ApiErrorKind::Unprocessable
        )
    }

    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self.kind {
            ApiErrorKind::Network => "無法連線到伺服器，請稍後再試".to_string(),
            ApiErrorKind::Server => format!("伺服器錯誤：{}", self.message),
            _ => self.message.clone(),
        }
    }
}

fn default_message(kind: ApiErrorKind) -> &'static str {
    match kind {
        ApiErrorKind::Unauthorized => "請重新登入",
        ApiErrorKind::Unprocessable => "憑證格式錯誤",
        ApiErrorKind::NotFound => "資源不存在",
        ApiErrorKind::Rejected => "操作失敗",
        ApiErrorKind::Server => "伺服器發生錯誤",
        ApiErrorKind::Network => "網路錯誤",
        ApiErrorKind::Decode => "回應格式錯誤",
        ApiErrorKind::Invalid => "請求無效",
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<gloo_net::Error> for ApiError {
    fn from(e: gloo_net::Error) -> Self {
        ApiError::network(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::decode(e.to_string())
    }
}

//! 表单字段校验
//!
//! 只做字段级的必填与正则检查，其余业务规则交给后端。

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"));

/// 台湾手机号：09 开头共 10 位
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^09\d{8}$").expect("Invalid regex"));

// =========================================================
// 错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// 一次提交中收集到的全部字段错误（保持表单顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(Vec<FieldError>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    /// 检查结果为 Err 时收集
    pub fn check(&mut self, result: Result<(), FieldError>) {
        if let Err(e) = result {
            self.push(e);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// 字段的第一条错误信息
    pub fn message(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// 没有错误时返回 Ok(value)
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, FormErrors> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "；")?;
            }
            write!(f, "{}", e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FormErrors {}

// =========================================================
// 字段校验函数
// =========================================================

pub fn required(field: &'static str, value: &str, message: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        Err(FieldError::new(field, message))
    } else {
        Ok(())
    }
}

pub fn email(field: &'static str, value: &str) -> Result<(), FieldError> {
    if EMAIL_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(FieldError::new(field, "請輸入有效 Email"))
    }
}

/// 手机号选填：空字符串合法
pub fn optional_phone(field: &'static str, value: &str) -> Result<(), FieldError> {
    let value = value.trim();
    if value.is_empty() || PHONE_RE.is_match(value) {
        Ok(())
    } else {
        Err(FieldError::new(field, "請輸入正確的手機號碼或留空"))
    }
}

pub fn matches(field: &'static str, value: &str, other: &str) -> Result<(), FieldError> {
    if value == other {
        Ok(())
    } else {
        Err(FieldError::new(field, "兩次密碼輸入不一致"))
    }
}

/// 解析非负价格
pub fn price(field: &'static str, value: &str) -> Result<f64, FieldError> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(FieldError::new(field, "請輸入有效價格")),
    }
}

/// 解析正整数数量
pub fn quantity(field: &'static str, value: &str) -> Result<u32, FieldError> {
    match value.trim().parse::<u32>() {
        Ok(v) if v >= 1 => Ok(v),
        _ => Err(FieldError::new(field, "數量至少為 1")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_is_optional_but_must_match_when_present() {
        assert!(optional_phone("phone", "").is_ok());
        assert!(optional_phone("phone", "  ").is_ok());
        assert!(optional_phone("phone", "0912345678").is_ok());
        assert!(optional_phone("phone", "0812345678").is_err());
        assert!(optional_phone("phone", "091234567").is_err());
    }

    #[test]
    fn email_shape() {
        assert!(email("email", "alice@example.com").is_ok());
        assert!(email("email", "alice@example").is_err());
        assert!(email("email", "not an email").is_err());
    }

    #[test]
    fn price_and_quantity_parsing() {
        assert_eq!(price("price", "12.5"), Ok(12.5));
        assert!(price("price", "-1").is_err());
        assert!(price("price", "abc").is_err());
        assert_eq!(quantity("qty", "3"), Ok(3));
        assert!(quantity("qty", "0").is_err());
    }

    #[test]
    fn form_errors_collect_in_order() {
        let mut errors = FormErrors::new();
        errors.check(required("username", "", "請輸入用戶名"));
        errors.check(matches("confirm_password", "a", "b"));
        errors.check(required("email", "x@y.z", "請輸入 Email"));
        assert!(errors.has("username"));
        assert!(errors.has("confirm_password"));
        assert!(!errors.has("email"));
        assert_eq!(errors.to_string(), "請輸入用戶名；兩次密碼輸入不一致");
        assert!(errors.into_result(|| ()).is_err());
    }
}

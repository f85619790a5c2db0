//! 登录与注册流程
//!
//! 表单先在本地校验，校验失败不会发出任何请求。

use std::fmt;

use oms_shared::validate::{self, FormErrors};
use oms_shared::{CartLine, DEFAULT_ROLE, ROLES, RegisterRequest};

use crate::api::OmsApi;
use crate::checkout::{CheckoutError, PendingCheckout};
use crate::error::ApiError;
use crate::session::SessionState;
use crate::web::Transport;

#[derive(Debug, Clone, PartialEq)]
pub enum AccountError {
    Invalid(FormErrors),
    Api(ApiError),
    /// 登录接口成功但没有返回可用的凭证
    MissingToken,
}

impl fmt::Display for AccountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountError::Invalid(errors) => write!(f, "{}", errors),
            AccountError::Api(e) => match e.status {
                Some(status) => write!(f, "{} ({})", e.user_message(), status),
                None => write!(f, "{}", e.user_message()),
            },
            AccountError::MissingToken => write!(f, "登入回應缺少憑證"),
        }
    }
}

impl std::error::Error for AccountError {}

impl From<ApiError> for AccountError {
    fn from(e: ApiError) -> Self {
        AccountError::Api(e)
    }
}

impl From<FormErrors> for AccountError {
    fn from(errors: FormErrors) -> Self {
        AccountError::Invalid(errors)
    }
}

// =========================================================
// 登录
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.check(validate::required("username", &self.username, "請輸入用戶名"));
        errors.check(validate::required("password", &self.password, "請輸入密碼"));
        errors.into_result(|| ())
    }
}

/// 登录并写入凭证
pub async fn sign_in<T: Transport>(
    api: &OmsApi<T>,
    form: &LoginForm,
) -> Result<SessionState, AccountError> {
    form.validate()?;
    let response = api.login(form.username.trim(), &form.password).await?;

    match api.session().sign_in(&response.access_token) {
        SessionState::Authenticated => {
            log_info!("[Auth] signed in as {}", form.username.trim());
            Ok(SessionState::Authenticated)
        }
        SessionState::Unauthenticated => Err(AccountError::MissingToken),
    }
}

// =========================================================
// 注册
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: String,
    pub phone: String,
}

impl Default for RegisterForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            role: DEFAULT_ROLE.to_string(),
            phone: String::new(),
        }
    }
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.check(validate::required("username", &self.username, "請輸入用戶名"));
        errors.check(validate::email("email", &self.email));
        errors.check(validate::required("password", &self.password, "請輸入密碼"));
        errors.check(validate::required(
            "confirm_password",
            &self.confirm_password,
            "請再次輸入密碼",
        ));
        if !self.confirm_password.is_empty() {
            errors.check(validate::matches(
                "confirm_password",
                &self.confirm_password,
                &self.password,
            ));
        }
        if !ROLES.contains(&self.role.as_str()) {
            errors.push(validate::FieldError::new("role", "請選擇角色"));
        }
        errors.check(validate::optional_phone("phone", &self.phone));
        errors.into_result(|| ())
    }

    /// 确认密码不发送给后端，空手机号省略
    pub fn to_request(&self) -> RegisterRequest {
        let phone = self.phone.trim();
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            role: Some(self.role.clone()),
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        }
    }
}

/// 注册成功后的去向
#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    /// 已登录，没有待结账的购物车
    SignedIn,
    /// 已登录，需要弹出结账窗口
    CheckoutPending(Vec<CartLine>),
    /// 已登录，但购物车数据损坏
    CartUnreadable(CheckoutError),
    /// 注册成功但自动登录失败
    AutoLoginFailed(AccountError),
}

/// 注册并用同一组凭证自动登录
///
/// 只把凭证写进存储；会话信号由调用方在结账窗口结束后同步。
pub async fn register_and_sign_in<T: Transport>(
    api: &OmsApi<T>,
    checkout: &PendingCheckout,
    form: &RegisterForm,
) -> Result<RegisterOutcome, AccountError> {
    form.validate()?;
    api.register(&form.to_request()).await?;
    log_info!("[Auth] registered {}", form.username.trim());

    let login = LoginForm {
        username: form.username.clone(),
        password: form.password.clone(),
    };
    if let Err(e) = sign_in(api, &login).await {
        log_warn!("[Auth] auto login after registration failed: {}", e);
        return Ok(RegisterOutcome::AutoLoginFailed(e));
    }

    Ok(match checkout.pending() {
        Ok(Some(cart)) => RegisterOutcome::CheckoutPending(cart),
        Ok(None) => RegisterOutcome::SignedIn,
        Err(e) => {
            log_error!("[Checkout] pending cart unreadable: {:?}", e);
            RegisterOutcome::CartUnreadable(e)
        }
    })
}

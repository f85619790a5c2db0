//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、访问级别以及守卫判定。

use std::fmt::Display;

use crate::session::SessionState;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页（仅访客）
    #[default]
    Home,
    Login,
    Register,
    Products,
    ProductNew,
    ProductEdit { id: i64 },
    Orders,
    OrderNew,
    OrderDetail { id: i64 },
    /// 未知路径
    NotFound,
}

/// 路由访问级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// 仅未登录可见，已登录时离开
    GuestOnly,
    /// 需要认证
    Protected,
    /// 未知路径，总是重定向
    Unmatched,
}

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render,
    Redirect(AppRoute),
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举（忽略 query / hash 和末尾的 `/`）
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["products"] => Self::Products,
            ["products", "new"] => Self::ProductNew,
            ["products", id, "edit"] => parse_id(id)
                .map(|id| Self::ProductEdit { id })
                .unwrap_or(Self::NotFound),
            ["orders"] => Self::Orders,
            ["orders", "new"] => Self::OrderNew,
            ["orders", id] => parse_id(id)
                .map(|id| Self::OrderDetail { id })
                .unwrap_or(Self::NotFound),
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Products => "/products".to_string(),
            Self::ProductNew => "/products/new".to_string(),
            Self::ProductEdit { id } => format!("/products/{}/edit", id),
            Self::Orders => "/orders".to_string(),
            Self::OrderNew => "/orders/new".to_string(),
            Self::OrderDetail { id } => format!("/orders/{}", id),
            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn access(&self) -> Access {
        match self {
            Self::Home | Self::Login | Self::Register => Access::GuestOnly,
            Self::Products
            | Self::ProductNew
            | Self::ProductEdit { .. }
            | Self::Orders
            | Self::OrderNew
            | Self::OrderDetail { .. } => Access::Protected,
            Self::NotFound => Access::Unmatched,
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    pub fn requires_auth(&self) -> bool {
        self.access() == Access::Protected
    }

    /// 定义已认证用户是否应该离开此路由（如登录页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        self.access() == Access::GuestOnly
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功时的重定向目标（从登录页）
    pub fn auth_success_redirect() -> Self {
        Self::Products
    }

    /// 按会话状态判定本次导航。纯函数，不需要任何网络请求。
    pub fn guard(&self, session: SessionState) -> GuardDecision {
        let authenticated = session.is_authenticated();
        match (self.access(), authenticated) {
            (Access::Protected, true) | (Access::GuestOnly, false) => GuardDecision::Render,
            (Access::Protected, false) => GuardDecision::Redirect(Self::auth_failure_redirect()),
            (Access::GuestOnly, true) | (Access::Unmatched, true) => {
                GuardDecision::Redirect(Self::auth_success_redirect())
            }
            (Access::Unmatched, false) => GuardDecision::Redirect(Self::Home),
        }
    }

    /// 收到 401 后的去向：除登录页本身外一律回到登录页。
    ///
    /// 不依赖会话状态，注册后结账期间会话信号仍是未认证，守卫不会自行跳转。
    pub fn after_session_expired(&self) -> Option<AppRoute> {
        let target = Self::auth_failure_redirect();
        (*self != target).then_some(target)
    }

    /// 解析守卫后真正要显示的路由
    pub fn resolve(&self, session: SessionState) -> AppRoute {
        match self.guard(session) {
            GuardDecision::Render => self.clone(),
            GuardDecision::Redirect(target) => target,
        }
    }
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

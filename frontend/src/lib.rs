//! 订单管理系统前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与守卫（领域模型）
//! - `web::router`: 路由服务（核心引擎）
//! - `client` / `api`: HTTP 客户端与类型化接口
//! - `auth`: 会话信号、401 处理与提示
//! - `components`: UI 组件层

// =========================================================
// 日志宏 (Logging)
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (web_sys::console::log_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_warn {
    ($($t:tt)*) => (web_sys::console::warn_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_warn {
    ($($t:tt)*) => (eprintln!($($t)*))
}

#[cfg(target_arch = "wasm32")]
macro_rules! log_error {
    ($($t:tt)*) => (web_sys::console::error_1(&format!($($t)*).into()))
}

#[cfg(not(target_arch = "wasm32"))]
macro_rules! log_error {
    ($($t:tt)*) => (eprintln!($($t)*))
}

mod account;
mod api;
mod auth;
mod checkout;
mod client;
mod config;
mod confirm;
mod draft;
mod error;
mod session;
mod web;
mod components {
    pub mod checkout_modal;
    pub mod create_order;
    pub mod home;
    pub mod icons;
    pub mod login;
    pub mod navbar;
    pub mod notice;
    pub mod order_detail;
    pub mod orders;
    pub mod product_form;
    pub mod products;
    pub mod register;
}

use leptos::prelude::*;

use crate::auth::{AuthContext, init_auth};
use crate::components::create_order::CreateOrderPage;
use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::navbar::Navbar;
use crate::components::notice::{NoticeToast, Notifier};
use crate::components::order_detail::OrderDetailPage;
use crate::components::orders::OrdersPage;
use crate::components::product_form::ProductFormPage;
use crate::components::products::ProductsPage;
use crate::components::register::RegisterPage;
use crate::config::AppConfig;
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Products => view! { <ProductsPage /> }.into_any(),
        AppRoute::ProductNew => view! { <ProductFormPage id=None /> }.into_any(),
        AppRoute::ProductEdit { id } => view! { <ProductFormPage id=Some(id) /> }.into_any(),
        AppRoute::Orders => view! { <OrdersPage /> }.into_any(),
        AppRoute::OrderNew => view! { <CreateOrderPage /> }.into_any(),
        AppRoute::OrderDetail { id } => view! { <OrderDetailPage id=id /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"頁面不存在"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    let config = AppConfig::from_build_env();

    // 1. 全局提示
    let notifier = Notifier::new(config.notice_timeout_ms);
    provide_context(notifier);

    // 2. 创建认证上下文：会话、API 客户端、401 处理器
    let auth_ctx = AuthContext::new(&config, notifier);
    provide_context(auth_ctx);
    init_auth(&auth_ctx);

    // 3. 会话信号与失效事件注入路由服务
    let session = auth_ctx.state();
    let expired = auth_ctx.expired();

    view! {
        <Router session=session expired=expired>
            <NoticeToast />
            <Show when=move || session.get().is_authenticated()>
                <Navbar />
            </Show>
            <main class="min-h-screen bg-base-200">
                <RouterOutlet matcher=route_matcher />
            </main>
        </Router>
    }
}

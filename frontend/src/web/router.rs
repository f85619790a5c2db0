//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 每次导航、浏览器前进后退以及会话状态变化时都执行同一个守卫。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::{AppRoute, GuardDecision};
use crate::session::SessionState;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 写入 History 的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    /// 用户发起的导航
    Push,
    /// 重定向，不留下被拒绝的历史记录
    Replace,
}

fn write_history(path: &str, mode: HistoryMode) {
    let Some(history) = web_sys::window().and_then(|w| w.history().ok()) else {
        return;
    };
    let _ = match mode {
        HistoryMode::Push => history.push_state_with_url(&JsValue::NULL, "", Some(path)),
        HistoryMode::Replace => history.replace_state_with_url(&JsValue::NULL, "", Some(path)),
    };
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入会话信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 会话状态（注入的信号，实现解耦）
    session: Signal<SessionState>,
}

impl RouterService {
    /// 创建新的路由服务，初始路由同样经过守卫
    fn new(session: Signal<SessionState>) -> Self {
        let requested = AppRoute::from_path(&current_path());
        let initial = requested.resolve(session.get_untracked());
        if initial != requested {
            log_info!("[Router] initial {} redirected to {}", requested, initial);
            write_history(&initial.to_path(), HistoryMode::Replace);
        }
        let (current_route, set_route) = signal(initial);

        Self {
            current_route,
            set_route,
            session,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        self.apply(AppRoute::from_path(path), HistoryMode::Push);
    }

    /// 导航到指定路由
    pub fn navigate_to(&self, route: AppRoute) {
        self.apply(route, HistoryMode::Push);
    }

    fn apply(&self, target: AppRoute, mode: HistoryMode) {
        apply_guard(self.set_route, self.session.get_untracked(), target, mode);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let session = self.session;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target = AppRoute::from_path(&current_path());
            // popstate 时地址栏已经变化，只能替换
            apply_guard(set_route, session.get_untracked(), target, HistoryMode::Replace);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 会话失效事件：不论会话信号是否变化都离开当前页面
    fn setup_expiry_redirect(&self, expired: Trigger) {
        let current_route = self.current_route;
        let set_route = self.set_route;

        Effect::new(move |prev: Option<()>| {
            expired.track();
            // 首次运行只建立订阅
            if prev.is_none() {
                return;
            }
            let route = current_route.get_untracked();
            if let Some(target) = route.after_session_expired() {
                log_info!("[Router] session expired, leaving {} for {}", route, target);
                write_history(&target.to_path(), HistoryMode::Replace);
                set_route.set(target);
            }
        });
    }

    /// 会话状态变化时重新判定当前路由
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let session = self.session;

        Effect::new(move |_| {
            let state = session.get();
            let route = current_route.get_untracked();
            if let GuardDecision::Redirect(target) = route.guard(state) {
                log_info!(
                    "[Router] session {:?}, leaving {} for {}",
                    state,
                    route,
                    target
                );
                write_history(&target.to_path(), HistoryMode::Replace);
                set_route.set(target);
            }
        });
    }
}

/// 执行守卫并更新 History 与路由信号
fn apply_guard(
    set_route: WriteSignal<AppRoute>,
    state: SessionState,
    target: AppRoute,
    mode: HistoryMode,
) {
    let resolved = match target.guard(state) {
        GuardDecision::Render => target,
        GuardDecision::Redirect(redirect) => {
            log_info!("[Router] {} denied ({:?}), redirecting to {}", target, state, redirect);
            redirect
        }
    };
    write_history(&resolved.to_path(), mode);
    set_route.set(resolved);
}

/// 提供路由服务到 Context 并初始化
fn provide_router(session: Signal<SessionState>, expired: Trigger) -> RouterService {
    let router = RouterService::new(session);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();
    router.setup_expiry_redirect(expired);

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 会话状态信号
    session: Signal<SessionState>,
    /// 会话失效事件（401）
    expired: Trigger,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(session, expired);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接：拦截点击，交给路由服务导航
#[component]
pub fn Link(
    /// 目标路由
    to: AppRoute,
    #[prop(optional, into)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let href = to.to_path();

    let on_click = move |ev: web_sys::MouseEvent| {
        // 保留 ctrl / cmd 点击在新标签页打开
        if ev.ctrl_key() || ev.meta_key() || ev.shift_key() {
            return;
        }
        ev.prevent_default();
        router.navigate_to(to.clone());
    };

    view! {
        <a href=href class=class on:click=on_click>
            {children()}
        </a>
    }
}

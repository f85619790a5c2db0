//! 认证模块
//!
//! 管理会话信号，与路由系统解耦。
//! 路由服务通过注入的会话信号来判定守卫，这里只负责让信号与存储保持一致：
//! - 登录 / 登出
//! - 任意请求返回 401 时的顶层处理
//! - 其他标签页修改凭证时重新同步

use std::rc::Rc;

use leptos::prelude::*;

use crate::account::{self, AccountError, LoginForm};
use crate::api::{BrowserApi, OmsApi};
use crate::checkout::PendingCheckout;
use crate::client::ApiClient;
use crate::components::notice::Notifier;
use crate::config::{AppConfig, StorageKeys};
use crate::error::ApiError;
use crate::session::{Session, SessionState};
use crate::web::{BrowserStorage, FetchTransport, KeyValueStore, listen_storage_changes};

/// 认证上下文
///
/// 只包含 arena 句柄，可 `Copy` 地在组件与闭包间传递。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 会话状态信号，路由守卫的唯一输入
    state: RwSignal<SessionState>,
    /// API 客户端（`Rc` 不是 `Send`，所以放在本地存储的 StoredValue 中）
    api: StoredValue<Rc<BrowserApi>, LocalStorage>,
    keys: StoredValue<StorageKeys>,
    notifier: Notifier,
    /// 每次 401 触发一次，路由服务据此回到登录页
    expired: Trigger,
}

impl AuthContext {
    /// 创建认证上下文，初始状态从存储中推导
    pub fn new(config: &AppConfig, notifier: Notifier) -> Self {
        let store: Rc<dyn KeyValueStore> = Rc::new(BrowserStorage);
        let session = Session::new(store, &config.keys.token);
        let initial = session.state();
        let client = ApiClient::new(&config.api_base_url, FetchTransport, session);

        log_info!("[Auth] initial session state: {:?}", initial);

        Self {
            state: RwSignal::new(initial),
            api: StoredValue::new_local(Rc::new(OmsApi::new(client))),
            keys: StoredValue::new(config.keys.clone()),
            notifier,
            expired: Trigger::new(),
        }
    }

    /// 会话状态信号（用于路由服务注入）
    pub fn state(&self) -> Signal<SessionState> {
        self.state.into()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.get_untracked().is_authenticated()
    }

    pub fn api(&self) -> Rc<BrowserApi> {
        self.api.get_value()
    }

    pub fn session(&self) -> Session {
        self.api().session().clone()
    }

    /// 注册页使用的自动下单存储
    pub fn checkout(&self) -> PendingCheckout {
        PendingCheckout::new(self.session().store(), self.keys.get_value())
    }

    /// 会话失效事件（用于路由服务注入）
    pub fn expired(&self) -> Trigger {
        self.expired
    }

    pub fn notifier(&self) -> Notifier {
        self.notifier
    }

    /// 从存储重新推导会话状态并写入信号
    pub fn sync(&self) {
        let next = self.session().state();
        if self.state.get_untracked() != next {
            log_info!("[Auth] session state -> {:?}", next);
            self.state.try_set(next);
        }
    }

    /// 登录：写入凭证并立即同步信号，路由服务负责跳转
    pub async fn login(&self, form: &LoginForm) -> Result<(), AccountError> {
        let api = self.api();
        account::sign_in(&api, form).await?;
        self.sync();
        Ok(())
    }

    /// 注销并清除凭证
    ///
    /// 不需要手动导航，路由服务会监听会话状态变化并自动重定向
    pub fn logout(&self) {
        self.session().sign_out();
        log_info!("[Auth] signed out");
        self.sync();
    }

    /// 身份检查确认会话已失效：不提示，直接同步
    pub fn expire_silently(&self) {
        self.session().sign_out();
        self.sync();
    }

    /// 顶层 401 处理：清除凭证、提示用户、翻转会话信号
    fn handle_unauthorized(&self, error: &ApiError) {
        log_warn!("[Auth] unauthorized response, clearing session: {}", error);
        self.session().sign_out();
        self.notifier.error("登入已過期，請重新登入");
        self.sync();
        self.expired.notify();
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证：注册 401 处理器并监听跨标签页的凭证变化
pub fn init_auth(ctx: &AuthContext) {
    let ctx = *ctx;

    ctx.api()
        .client()
        .on_unauthorized(Rc::new(move |error: &ApiError| ctx.handle_unauthorized(error)));

    let token_key = ctx.session().token_key().to_string();
    listen_storage_changes(token_key, move || {
        log_info!("[Auth] token changed in another tab");
        ctx.sync();
    });
}

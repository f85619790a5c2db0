use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::validate::FormErrors;
use oms_shared::{CartLine, DEFAULT_ROLE};

use crate::account::{self, AccountError, RegisterForm, RegisterOutcome};
use crate::auth::use_auth;
use crate::components::checkout_modal::CheckoutModal;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

const ROLE_OPTIONS: [(&str, &str); 3] = [
    ("admin", "管理員"),
    ("seller", "賣家"),
    ("customer", "顧客"),
];

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = auth.notifier();

    let username = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm_password = RwSignal::new(String::new());
    let role = RwSignal::new(DEFAULT_ROLE.to_string());
    let phone = RwSignal::new(String::new());

    let errors = RwSignal::new(FormErrors::new());
    let (is_submitting, set_is_submitting) = signal(false);
    // 有值时显示结账窗口
    let checkout_cart = RwSignal::new(Option::<Vec<CartLine>>::None);

    let field_error = move |field: &'static str| {
        move || {
            errors.with(|e| {
                e.message(field).map(|msg| {
                    view! { <span class="label-text-alt text-error">{msg.to_string()}</span> }
                })
            })
        }
    };

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let form = RegisterForm {
            username: username.get(),
            email: email.get(),
            password: password.get(),
            confirm_password: confirm_password.get(),
            role: role.get(),
            phone: phone.get(),
        };

        // 本地校验失败不发请求
        if let Err(e) = form.validate() {
            errors.set(e);
            return;
        }
        errors.set(FormErrors::new());
        set_is_submitting.set(true);

        spawn_local(async move {
            let api = auth.api();
            let checkout = auth.checkout();
            match account::register_and_sign_in(&api, &checkout, &form).await {
                Ok(RegisterOutcome::SignedIn) => {
                    auth.sync();
                    notifier.success("註冊並登入成功，歡迎！");
                    router.navigate_to(AppRoute::Products);
                }
                Ok(RegisterOutcome::CheckoutPending(cart)) => {
                    // 会话信号在结账窗口结束后才同步，保持当前页面
                    checkout_cart.try_set(Some(cart));
                }
                Ok(RegisterOutcome::CartUnreadable(e)) => {
                    notifier.error(e.to_string());
                    auth.sync();
                }
                Ok(RegisterOutcome::AutoLoginFailed(_)) => {
                    notifier.error("自動登入失敗，請手動登入");
                    router.navigate_to(AppRoute::Login);
                }
                Err(AccountError::Invalid(e)) => {
                    errors.try_set(e);
                }
                Err(e) => {
                    notifier.error(format!("註冊失敗：{}", e));
                }
            }
            set_is_submitting.try_set(false);
        });
    };

    let on_checkout_done = Callback::new(move |order_id: i64| {
        checkout_cart.set(None);
        auth.sync();
        router.navigate_to(AppRoute::OrderDetail { id: order_id });
    });

    let on_checkout_cancel = Callback::new(move |_: ()| {
        checkout_cart.set(None);
        auth.checkout().cancel();
        auth.sync();
        notifier.info("已取消自動下單");
        // `/` 对已登录用户解析为商品列表，直接前往避免重复写入历史
        router.navigate_to(AppRoute::auth_success_redirect());
    });

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"訂單管理系統"</h1>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit novalidate>
                        <h2 class="card-title">"註冊"</h2>

                        <div class="form-control">
                            <label class="label" for="reg-username">
                                <span class="label-text">"用戶名"</span>
                            </label>
                            <input id="reg-username" type="text" class="input input-bordered"
                                on:input=move |ev| username.set(event_target_value(&ev))
                                prop:value=move || username.get()
                            />
                            <label class="label">{field_error("username")}</label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="reg-email">
                                <span class="label-text">"Email"</span>
                            </label>
                            <input id="reg-email" type="email" class="input input-bordered"
                                on:input=move |ev| email.set(event_target_value(&ev))
                                prop:value=move || email.get()
                            />
                            <label class="label">{field_error("email")}</label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="reg-password">
                                <span class="label-text">"密碼"</span>
                            </label>
                            <input id="reg-password" type="password" class="input input-bordered"
                                autocomplete="new-password"
                                on:input=move |ev| password.set(event_target_value(&ev))
                                prop:value=move || password.get()
                            />
                            <label class="label">{field_error("password")}</label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="reg-confirm">
                                <span class="label-text">"確認密碼"</span>
                            </label>
                            <input id="reg-confirm" type="password" class="input input-bordered"
                                autocomplete="new-password"
                                on:input=move |ev| confirm_password.set(event_target_value(&ev))
                                prop:value=move || confirm_password.get()
                            />
                            <label class="label">{field_error("confirm_password")}</label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="reg-role">
                                <span class="label-text">"角色"</span>
                            </label>
                            <select id="reg-role" class="select select-bordered"
                                on:change=move |ev| role.set(event_target_value(&ev))
                            >
                                {ROLE_OPTIONS.into_iter().map(|(value, label)| view! {
                                    <option value=value selected=move || role.get() == value>{label}</option>
                                }).collect_view()}
                            </select>
                            <label class="label">{field_error("role")}</label>
                        </div>

                        <div class="form-control">
                            <label class="label" for="reg-phone">
                                <span class="label-text">"電話 (選填)"</span>
                            </label>
                            <input id="reg-phone" type="tel" maxlength="10" placeholder="09xxxxxxxx"
                                class="input input-bordered"
                                on:input=move |ev| phone.set(event_target_value(&ev))
                                prop:value=move || phone.get()
                            />
                            <label class="label">{field_error("phone")}</label>
                        </div>

                        <div class="form-control mt-4">
                            <button type="submit" class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "註冊中..." }.into_any()
                                } else {
                                    "註冊".into_any()
                                }}
                            </button>
                        </div>
                        <p class="text-sm text-center mt-2">
                            "已有帳號？"
                            <Link to=AppRoute::Login class="link link-primary">"登入"</Link>
                        </p>
                    </form>
                </div>
            </div>
        </div>

        {move || checkout_cart.get().map(|cart| view! {
            <CheckoutModal cart=cart on_done=on_checkout_done on_cancel=on_checkout_cancel />
        })}
    }
}

//! 注册后的结账窗口
//!
//! 收集收件信息，把存储中的购物车提交为一张订单。

use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::CartLine;
use oms_shared::validate::FormErrors;

use crate::auth::use_auth;
use crate::checkout::{CheckoutError, CheckoutForm};

#[component]
pub fn CheckoutModal(
    /// 待结账的购物车（仅用于显示）
    cart: Vec<CartLine>,
    /// 建单成功，参数为新订单 id
    #[prop(into)]
    on_done: Callback<i64>,
    #[prop(into)] on_cancel: Callback<()>,
) -> impl IntoView {
    let auth = use_auth();
    let notifier = auth.notifier();

    let receiver_name = RwSignal::new(String::new());
    let receiver_phone = RwSignal::new(String::new());
    let shipping_address = RwSignal::new(String::new());
    let remark = RwSignal::new(String::new());
    let errors = RwSignal::new(FormErrors::new());
    let (loading, set_loading) = signal(false);

    let line_count = cart.len();
    let total_qty: u32 = cart.iter().map(|line| line.qty).sum();

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
        let form = CheckoutForm {
            receiver_name: receiver_name.get(),
            receiver_phone: receiver_phone.get(),
            shipping_address: shipping_address.get(),
            remark: remark.get(),
        };
        if let Err(e) = form.validate() {
            errors.set(e);
            return;
        }
        errors.set(FormErrors::new());
        set_loading.set(true);

        spawn_local(async move {
            let api = auth.api();
            match auth.checkout().complete(&api, form).await {
                Ok(created) => {
                    notifier.success("訂單建立成功");
                    on_done.run(created.id);
                }
                Err(CheckoutError::Invalid(e)) => {
                    errors.try_set(e);
                }
                // 顶层处理器已提示并回到登录页
                Err(CheckoutError::Api(e)) if e.is_unauthorized() => {}
                Err(e) => {
                    log_error!("[Checkout] order creation failed: {}", e);
                    notifier.error(format!("下單失敗：{}", e));
                }
            }
            set_loading.try_set(false);
        });
    };

    view! {
        <dialog class="modal modal-open">
            <div class="modal-box">
                <h3 class="font-bold text-lg">"填寫收件資訊以完成下單"</h3>
                <p class="py-2 text-base-content/70">
                    {format!("購物車共 {} 項商品，{} 件", line_count, total_qty)}
                </p>

                <form on:submit=on_submit class="space-y-2" novalidate>
                    <div class="form-control">
                        <label class="label" for="receiver_name">
                            <span class="label-text">"收件人"</span>
                        </label>
                        <input id="receiver_name" type="text" class="input input-bordered w-full"
                            on:input=move |ev| receiver_name.set(event_target_value(&ev))
                            prop:value=move || receiver_name.get()
                        />
                        <label class="label">{field_error("receiver_name")}</label>
                    </div>
                    <div class="form-control">
                        <label class="label" for="receiver_phone">
                            <span class="label-text">"電話"</span>
                        </label>
                        <input id="receiver_phone" type="tel" class="input input-bordered w-full"
                            on:input=move |ev| receiver_phone.set(event_target_value(&ev))
                            prop:value=move || receiver_phone.get()
                        />
                        <label class="label">{field_error("receiver_phone")}</label>
                    </div>
                    <div class="form-control">
                        <label class="label" for="shipping_address">
                            <span class="label-text">"地址"</span>
                        </label>
                        <input id="shipping_address" type="text" class="input input-bordered w-full"
                            on:input=move |ev| shipping_address.set(event_target_value(&ev))
                            prop:value=move || shipping_address.get()
                        />
                        <label class="label">{field_error("shipping_address")}</label>
                    </div>
                    <div class="form-control">
                        <label class="label" for="remark">
                            <span class="label-text">"備註"</span>
                        </label>
                        <textarea id="remark" class="textarea textarea-bordered w-full"
                            on:input=move |ev| remark.set(event_target_value(&ev))
                            prop:value=move || remark.get()
                        ></textarea>
                    </div>

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| on_cancel.run(())>
                            "取消"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || loading.get()>
                            {move || if loading.get() {
                                view! { <span class="loading loading-spinner"></span> "送出中..." }.into_any()
                            } else {
                                "送出訂單".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </dialog>
    }
}

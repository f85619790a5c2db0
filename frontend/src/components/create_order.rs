//! 建立订单

use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::Product;
use oms_shared::validate::FormErrors;

use crate::api::Loaded;
use crate::auth::use_auth;
use crate::components::icons::{Plus, Trash2};
use crate::draft::OrderDraft;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

#[component]
pub fn CreateOrderPage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = auth.notifier();

    let (products, set_products) = signal(Vec::<Product>::new());
    let (ready, set_ready) = signal(false);
    let (submitting, set_submitting) = signal(false);
    let draft = RwSignal::new(OrderDraft::new());
    let errors = RwSignal::new(FormErrors::new());

    // 初始化：商品与身份并发加载
    spawn_local(async move {
        match auth.api().load_order_form().await {
            Ok(Loaded::Ready(data)) => {
                set_products.try_set(data.products);
                set_ready.try_set(true);
            }
            Ok(Loaded::SessionExpired) => auth.expire_silently(),
            Err(e) => {
                log_error!("[Orders] order form init failed: {}", e);
                notifier.error("初始化時發生錯誤，請稍後再試");
            }
        }
    });

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
        let request = match draft.with_untracked(OrderDraft::to_request) {
            Ok(request) => request,
            Err(e) => {
                errors.set(e);
                return;
            }
        };
        errors.set(FormErrors::new());
        set_submitting.set(true);

        spawn_local(async move {
            match auth.api().create_order(&request).await {
                Ok(created) => {
                    notifier.success(format!("訂單 #{} 建立成功", created.id));
                    router.navigate_to(AppRoute::Orders);
                }
                Err(e) => notifier.error(format!("建立訂單失敗：{}", e.user_message())),
            }
            set_submitting.try_set(false);
        });
    };

    let line_count = move || draft.with(|d| d.lines().len());

    view! {
        <div class="max-w-3xl mx-auto p-4 md:p-8">
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body space-y-2" on:submit=on_submit novalidate>
                    <h3 class="card-title">"建立新訂單"</h3>

                    <Show when=move || ready.get() fallback=|| view! {
                        <div class="flex justify-center py-8">
                            <span class="loading loading-spinner loading-lg text-primary"></span>
                        </div>
                    }>
                        // 商品明细
                        <div class="space-y-2">
                            <For
                                each=move || 0..line_count()
                                key=|index| *index
                                children=move |index| {
                                    let line = move || draft.with(|d| d.lines().get(index).cloned().unwrap_or_default());
                                    view! {
                                        <div class="flex flex-wrap items-center gap-2">
                                            <select class="select select-bordered flex-1 min-w-48"
                                                on:change=move |ev| {
                                                    let id = event_target_value(&ev).parse::<i64>().ok();
                                                    products.with_untracked(|catalog| {
                                                        draft.update(|d| d.set_product(index, id, catalog));
                                                    });
                                                }
                                            >
                                                <option value="" selected=move || line().product_id.is_none()>"選擇商品"</option>
                                                {move || products.get().into_iter().map(|p| {
                                                    let pid = p.id;
                                                    view! {
                                                        <option value=pid.to_string() selected=move || line().product_id == Some(pid)>
                                                            {format!("{}（${:.2}）", p.name, p.price)}
                                                        </option>
                                                    }
                                                }).collect_view()}
                                            </select>
                                            <input type="number" min="1" class="input input-bordered w-24"
                                                prop:value=move || line().quantity.to_string()
                                                on:input=move |ev| {
                                                    if let Ok(qty) = event_target_value(&ev).parse::<u32>() {
                                                        draft.update(|d| d.set_quantity(index, qty));
                                                    }
                                                }
                                            />
                                            <span class="text-sm opacity-70 w-28">
                                                {move || format!("單價：{:.2}", line().price)}
                                            </span>
                                            <Show when=move || draft.with(|d| d.can_remove())>
                                                <button type="button" class="btn btn-ghost btn-sm text-error"
                                                    on:click=move |_| draft.update(|d| d.remove_line(index))
                                                >
                                                    <Trash2 attr:class="h-4 w-4" />
                                                </button>
                                            </Show>
                                        </div>
                                    }
                                }
                            />
                            <label class="label">{field_error("items")}</label>
                            <button type="button" class="btn btn-outline btn-sm gap-2" on:click=move |_| draft.update(|d| d.add_line())>
                                <Plus attr:class="h-4 w-4" /> "新增商品項目"
                            </button>
                        </div>

                        <div class="flex justify-end gap-6 font-bold">
                            <span>{move || format!("總數量：{}", draft.with(|d| d.total_quantity()))}</span>
                            <span>{move || format!("總金額：{:.2}", draft.with(|d| d.total_amount()))}</span>
                        </div>

                        // 收件信息
                        <div class="divider">"收件資訊"</div>
                        <div class="grid grid-cols-1 md:grid-cols-2 gap-4">
                            <div class="form-control">
                                <label class="label" for="order-receiver">
                                    <span class="label-text">"收件人"</span>
                                </label>
                                <input id="order-receiver" type="text" class="input input-bordered w-full"
                                    prop:value=move || draft.with(|d| d.receiver.receiver_name.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        draft.update(|d| d.receiver.receiver_name = value);
                                    }
                                />
                                <label class="label">{field_error("receiver_name")}</label>
                            </div>
                            <div class="form-control">
                                <label class="label" for="order-phone">
                                    <span class="label-text">"電話"</span>
                                </label>
                                <input id="order-phone" type="tel" class="input input-bordered w-full"
                                    prop:value=move || draft.with(|d| d.receiver.receiver_phone.clone())
                                    on:input=move |ev| {
                                        let value = event_target_value(&ev);
                                        draft.update(|d| d.receiver.receiver_phone = value);
                                    }
                                />
                                <label class="label">{field_error("receiver_phone")}</label>
                            </div>
                        </div>
                        <div class="form-control">
                            <label class="label" for="order-address">
                                <span class="label-text">"地址"</span>
                            </label>
                            <input id="order-address" type="text" class="input input-bordered w-full"
                                prop:value=move || draft.with(|d| d.receiver.shipping_address.clone())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    draft.update(|d| d.receiver.shipping_address = value);
                                }
                            />
                            <label class="label">{field_error("shipping_address")}</label>
                        </div>
                        <div class="form-control">
                            <label class="label" for="order-remark">
                                <span class="label-text">"備註"</span>
                            </label>
                            <textarea id="order-remark" rows="4" class="textarea textarea-bordered w-full"
                                prop:value=move || draft.with(|d| d.receiver.remark.clone())
                                on:input=move |ev| {
                                    let value = event_target_value(&ev);
                                    draft.update(|d| d.receiver.remark = value);
                                }
                            ></textarea>
                        </div>
                    </Show>

                    <div class="card-actions justify-end mt-4">
                        <Link to=AppRoute::Orders class="btn btn-ghost">"取消"</Link>
                        <button type="submit" class="btn btn-primary" disabled=move || submitting.get() || !ready.get()>
                            {move || if submitting.get() {
                                view! { <span class="loading loading-spinner"></span> "提交中..." }.into_any()
                            } else {
                                "提交訂單".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

use std::collections::HashSet;

use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::{Order, Product};

use crate::api::Loaded;
use crate::auth::use_auth;
use crate::components::icons::{ChevronDown, Plus, Trash2};
use crate::confirm::{BrowserConfirm, Deletion, confirm_delete};
use crate::web::route::AppRoute;
use crate::web::router::Link;

const UNKNOWN_PRODUCT: &str = "未知商品";

#[component]
pub fn OrdersPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = auth.notifier();

    let (orders, set_orders) = signal(Vec::<Order>::new());
    let (products, set_products) = signal(Vec::<Product>::new());
    let (loading, set_loading) = signal(true);
    let expanded = RwSignal::new(HashSet::<i64>::new());

    // 初始化：身份、订单、商品并发加载，任一失败整体失败
    spawn_local(async move {
        match auth.api().load_orders_overview().await {
            Ok(Loaded::Ready(overview)) => {
                set_orders.try_set(overview.orders);
                set_products.try_set(overview.products);
            }
            Ok(Loaded::SessionExpired) => auth.expire_silently(),
            Err(e) => {
                log_error!("[Orders] initial load failed: {}", e);
                notifier.error("載入訂單或商品資料時發生錯誤，請稍候再試");
            }
        }
        set_loading.try_set(false);
    });

    let reload_orders = move || {
        spawn_local(async move {
            match auth.api().list_orders().await {
                Ok(data) => {
                    set_orders.try_set(data);
                }
                Err(e) => log_error!("[Orders] reload failed: {}", e),
            }
        });
    };

    let handle_delete = move |id: i64| {
        spawn_local(async move {
            let api = auth.api();
            let message = format!("確定要刪除訂單 #{}？", id);
            match confirm_delete(&BrowserConfirm, &message, || api.delete_order(id)).await {
                Ok(Deletion::Deleted) => {
                    notifier.success(format!("訂單 #{} 已刪除", id));
                    reload_orders();
                }
                Ok(Deletion::Declined) => {}
                Err(e) => notifier.error(format!("刪除訂單失敗：{}", e.user_message())),
            }
        });
    };

    let toggle = move |id: i64| {
        expanded.update(|set| {
            if !set.remove(&id) {
                set.insert(id);
            }
        });
    };

    let is_empty = move || orders.with(|o| o.is_empty());

    view! {
        <div class="max-w-5xl mx-auto p-4 md:p-8 space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-2xl font-bold">"訂單管理"</h2>
                <Link to=AppRoute::OrderNew class="btn btn-primary gap-2">
                    <Plus attr:class="h-4 w-4" /> "建立訂單"
                </Link>
            </div>

            <Show when=move || loading.get()>
                <div class="flex justify-center py-8">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            </Show>
            <Show when=move || is_empty() && !loading.get()>
                <div class="text-center py-8 text-base-content/50">"尚無訂單。"</div>
            </Show>

            <For
                each=move || orders.get()
                key=|o| o.id
                children=move |order| {
                    let id = order.id;
                    let is_open = move || expanded.with(|set| set.contains(&id));
                    let order = StoredValue::new(order);
                    view! {
                        <div class="card bg-base-100 shadow">
                            <div class="card-body py-4">
                                <div class="flex items-center justify-between">
                                    <div class="flex items-center gap-3">
                                        <Link to=AppRoute::OrderDetail { id } class="font-bold link link-hover">
                                            {format!("訂單 #{}", id)}
                                        </Link>
                                        <span class="badge badge-outline">
                                            {order.with_value(|o| o.status.clone())}
                                        </span>
                                    </div>
                                    <div class="flex gap-2">
                                        <button class="btn btn-ghost btn-sm gap-1" on:click=move |_| toggle(id)>
                                            <ChevronDown attr:class=move || if is_open() { "h-4 w-4 rotate-180" } else { "h-4 w-4" } />
                                            {move || if is_open() { "收合" } else { "顯示詳細" }}
                                        </button>
                                        <button class="btn btn-ghost btn-sm text-error gap-1" on:click=move |_| handle_delete(id)>
                                            <Trash2 attr:class="h-4 w-4" /> "刪除"
                                        </button>
                                    </div>
                                </div>

                                <Show when=is_open>
                                    {move || order.with_value(|o| {
                                        products.with(|catalog| view! { <OrderItems order=o.clone() products=catalog.clone() /> })
                                    })}
                                </Show>
                            </div>
                        </div>
                    }
                }
            />
        </div>
    }
}

/// 订单明细表与合计
#[component]
pub fn OrderItems(order: Order, products: Vec<Product>) -> impl IntoView {
    let total_quantity = order.total_quantity();
    let total_amount = order.total_amount();

    let rows = order
        .items
        .iter()
        .map(|item| {
            let name = order
                .item_name(item, &products)
                .unwrap_or(UNKNOWN_PRODUCT)
                .to_string();
            view! {
                <tr>
                    <td>{name}</td>
                    <td>{item.quantity}</td>
                    <td>{format!("{:.2}", item.price)}</td>
                    <td>{format!("{:.2}", item.subtotal())}</td>
                </tr>
            }
        })
        .collect_view();

    view! {
        <div class="mt-2 bg-base-200 rounded-lg p-3">
            <h4 class="font-semibold mb-2">"商品明細"</h4>
            <table class="table table-sm w-full">
                <thead>
                    <tr>
                        <th>"商品名稱"</th>
                        <th>"數量"</th>
                        <th>"單價"</th>
                        <th>"小計"</th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
            <div class="flex justify-end gap-6 mt-2 font-bold">
                <span>{format!("總數量：{}", total_quantity)}</span>
                <span>{format!("總金額：{:.2}", total_amount)}</span>
            </div>
        </div>
    }
}

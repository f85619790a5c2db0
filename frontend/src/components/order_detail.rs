use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::date::display_timestamp;

use crate::api::OrderDetail;
use crate::auth::use_auth;
use crate::components::orders::OrderItems;
use crate::web::route::AppRoute;
use crate::web::router::Link;

fn or_dash(value: &Option<String>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

#[component]
pub fn OrderDetailPage(id: i64) -> impl IntoView {
    let auth = use_auth();
    let notifier = auth.notifier();

    let (detail, set_detail) = signal(Option::<OrderDetail>::None);
    let (loading, set_loading) = signal(true);

    spawn_local(async move {
        match auth.api().load_order_detail(id).await {
            Ok(data) => {
                set_detail.try_set(Some(data));
            }
            Err(e) => notifier.error(format!("載入訂單失敗：{}", e.user_message())),
        }
        set_loading.try_set(false);
    });

    view! {
        <div class="max-w-3xl mx-auto p-4 md:p-8 space-y-4">
            <div class="flex items-center justify-between">
                <h2 class="text-2xl font-bold">{format!("訂單 #{}", id)}</h2>
                <Link to=AppRoute::Orders class="btn btn-ghost">"返回訂單列表"</Link>
            </div>

            <Show when=move || loading.get()>
                <div class="flex justify-center py-8">
                    <span class="loading loading-spinner loading-lg text-primary"></span>
                </div>
            </Show>

            {move || detail.get().map(|OrderDetail { order, products }| {
                let created = order
                    .created_at
                    .as_deref()
                    .map(display_timestamp)
                    .unwrap_or_else(|| "-".to_string());
                let status = order.status.clone();
                let order_sn = order.order_sn.clone();
                let receiver_name = or_dash(&order.receiver_name);
                let receiver_phone = or_dash(&order.receiver_phone);
                let shipping_address = or_dash(&order.shipping_address);
                let remark = or_dash(&order.remark);
                view! {
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body">
                            <div class="flex flex-wrap gap-2 items-center">
                                <span class="badge badge-outline">{status}</span>
                                {order_sn.map(|sn| view! {
                                    <span class="font-mono text-sm opacity-70">{sn}</span>
                                })}
                            </div>
                            <div class="grid grid-cols-1 md:grid-cols-2 gap-2 mt-2">
                                <div><span class="opacity-70">"收件人："</span>{receiver_name}</div>
                                <div><span class="opacity-70">"電話："</span>{receiver_phone}</div>
                                <div class="md:col-span-2"><span class="opacity-70">"地址："</span>{shipping_address}</div>
                                <div class="md:col-span-2"><span class="opacity-70">"備註："</span>{remark}</div>
                                <div><span class="opacity-70">"建立時間："</span>{created}</div>
                            </div>
                            <OrderItems order=order products=products />
                        </div>
                    </div>
                }
            })}
        </div>
    }
}

use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::Product;

use crate::auth::use_auth;
use crate::components::icons::{Pencil, Plus, RefreshCw, Trash2};
use crate::confirm::{BrowserConfirm, Deletion, confirm_delete};
use crate::web::route::AppRoute;
use crate::web::router::Link;

#[component]
pub fn ProductsPage() -> impl IntoView {
    let auth = use_auth();
    let notifier = auth.notifier();

    let (products, set_products) = signal(Vec::<Product>::new());
    let (loading, set_loading) = signal(true);

    let load_products = move || {
        set_loading.set(true);
        spawn_local(async move {
            match auth.api().list_products().await {
                Ok(data) => {
                    set_products.try_set(data);
                }
                Err(e) => notifier.error(format!("載入商品失敗：{}", e.user_message())),
            }
            set_loading.try_set(false);
        });
    };

    // 初始加载
    load_products();

    let handle_delete = move |id: i64| {
        spawn_local(async move {
            let api = auth.api();
            let message = format!("確定要刪除商品 #{}？", id);
            match confirm_delete(&BrowserConfirm, &message, || api.delete_product(id)).await {
                Ok(Deletion::Deleted) => {
                    notifier.success(format!("商品 #{} 已刪除", id));
                    load_products();
                }
                Ok(Deletion::Declined) => {}
                Err(e) => notifier.error(format!("刪除商品失敗：{}", e.user_message())),
            }
        });
    };

    let is_empty = move || products.with(|p| p.is_empty());

    view! {
        <div class="max-w-5xl mx-auto p-4 md:p-8">
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="flex items-center justify-between p-6 pb-2">
                        <div>
                            <h3 class="card-title">"商品列表"</h3>
                            <p class="text-base-content/70 text-sm">"建立、編輯或刪除商品。"</p>
                        </div>
                        <div class="flex gap-2">
                            <button on:click=move |_| load_products() disabled=move || loading.get() class="btn btn-ghost btn-circle">
                                <RefreshCw attr:class=move || if loading.get() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
                            </button>
                            <Link to=AppRoute::ProductNew class="btn btn-primary gap-2">
                                <Plus attr:class="h-4 w-4" /> "新增商品"
                            </Link>
                        </div>
                    </div>

                    <div class="overflow-x-auto w-full">
                        <table class="table table-zebra w-full">
                            <thead>
                                <tr>
                                    <th>"ID"</th>
                                    <th>"名稱"</th>
                                    <th>"價格"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || is_empty() && !loading.get()>
                                    <tr>
                                        <td colspan="4" class="text-center py-8 text-base-content/50">
                                            "尚無商品。"
                                        </td>
                                    </tr>
                                </Show>
                                <Show when=move || is_empty() && loading.get()>
                                    <tr>
                                        <td colspan="4" class="text-center py-8 text-base-content/50">
                                            <span class="loading loading-spinner loading-md"></span> " 載入中..."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=move || products.get()
                                    key=|p| p.id
                                    children=move |product| {
                                        let id = product.id;
                                        view! {
                                            <tr>
                                                <td class="font-mono">{id}</td>
                                                <td>{product.name}</td>
                                                <td>{format!("{:.2}", product.price)}</td>
                                                <td class="text-right">
                                                    <Link to=AppRoute::ProductEdit { id } class="btn btn-ghost btn-sm gap-1">
                                                        <Pencil attr:class="h-4 w-4" /> "編輯"
                                                    </Link>
                                                    <button on:click=move |_| handle_delete(id) class="btn btn-ghost btn-sm text-error gap-1">
                                                        <Trash2 attr:class="h-4 w-4" /> "刪除"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </div>
    }
}

//! 新增 / 编辑商品

use leptos::prelude::*;
use leptos::task::spawn_local;
use oms_shared::ProductInput;
use oms_shared::validate::{self, FormErrors};

use crate::auth::use_auth;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};

/// 表单状态
///
/// 价格保留原始输入，提交时才解析。
#[derive(Clone, Copy)]
struct ProductFormState {
    name: RwSignal<String>,
    price: RwSignal<String>,
}

impl ProductFormState {
    fn new() -> Self {
        Self {
            name: RwSignal::new(String::new()),
            price: RwSignal::new(String::new()),
        }
    }

    fn to_input(&self) -> Result<ProductInput, FormErrors> {
        let name = self.name.get_untracked();
        let mut errors = FormErrors::new();
        errors.check(validate::required("name", &name, "請輸入商品名稱"));
        let price = match validate::price("price", &self.price.get_untracked()) {
            Ok(price) => Some(price),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        match price {
            Some(price) if errors.is_empty() => Ok(ProductInput {
                name: name.trim().to_string(),
                price,
            }),
            _ => Err(errors),
        }
    }
}

#[component]
pub fn ProductFormPage(
    /// 编辑模式下的商品 id
    id: Option<i64>,
) -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let notifier = auth.notifier();

    let state = ProductFormState::new();
    let errors = RwSignal::new(FormErrors::new());
    let (loading, set_loading) = signal(id.is_some());
    let (saving, set_saving) = signal(false);

    // 编辑模式：预填
    if let Some(id) = id {
        spawn_local(async move {
            match auth.api().get_product(id).await {
                Ok(product) => {
                    state.name.try_set(product.name);
                    state.price.try_set(product.price.to_string());
                }
                Err(e) => notifier.error(format!("載入商品失敗：{}", e.user_message())),
            }
            set_loading.try_set(false);
        });
    }

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
        let input = match state.to_input() {
            Ok(input) => input,
            Err(e) => {
                errors.set(e);
                return;
            }
        };
        errors.set(FormErrors::new());
        set_saving.set(true);

        spawn_local(async move {
            let api = auth.api();
            let result = match id {
                Some(id) => api.update_product(id, input).await,
                None => api.create_product(&input).await,
            };
            match result {
                Ok(()) => {
                    notifier.success(if id.is_some() { "商品已更新" } else { "商品已新增" });
                    router.navigate_to(AppRoute::Products);
                }
                Err(e) => notifier.error(format!("儲存失敗：{}", e.user_message())),
            }
            set_saving.try_set(false);
        });
    };

    let title = if id.is_some() { "編輯商品" } else { "新增商品" };

    view! {
        <div class="max-w-xl mx-auto p-4 md:p-8">
            <div class="card bg-base-100 shadow-xl">
                <form class="card-body" on:submit=on_submit novalidate>
                    <h3 class="card-title">{title}</h3>

                    <Show when=move || !loading.get() fallback=|| view! {
                        <div class="flex justify-center py-8">
                            <span class="loading loading-spinner loading-lg text-primary"></span>
                        </div>
                    }>
                        <div class="form-control">
                            <label class="label" for="product-name">
                                <span class="label-text">"名稱"</span>
                            </label>
                            <input id="product-name" type="text" class="input input-bordered w-full"
                                on:input=move |ev| state.name.set(event_target_value(&ev))
                                prop:value=move || state.name.get()
                            />
                            <label class="label">{field_error("name")}</label>
                        </div>
                        <div class="form-control">
                            <label class="label" for="product-price">
                                <span class="label-text">"價格"</span>
                            </label>
                            <input id="product-price" type="number" min="0" step="0.01"
                                class="input input-bordered w-full"
                                on:input=move |ev| state.price.set(event_target_value(&ev))
                                prop:value=move || state.price.get()
                            />
                            <label class="label">{field_error("price")}</label>
                        </div>
                    </Show>

                    <div class="card-actions justify-end mt-4">
                        <Link to=AppRoute::Products class="btn btn-ghost">"取消"</Link>
                        <button type="submit" class="btn btn-primary" disabled=move || saving.get() || loading.get()>
                            {move || if saving.get() {
                                view! { <span class="loading loading-spinner"></span> "儲存中..." }.into_any()
                            } else {
                                "儲存".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
        </div>
    }
}

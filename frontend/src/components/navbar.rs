use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::use_auth;
use crate::components::icons::{ClipboardList, LogOut, Package, Plus};
use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 已登录时的顶部导航
#[component]
pub fn Navbar() -> impl IntoView {
    let auth = use_auth();
    let (username, set_username) = signal(String::new());

    // 问候语只是装饰，失败时保持空白
    spawn_local(async move {
        match auth.api().current_user().await {
            Ok(Some(identity)) => {
                set_username.try_set(identity.username);
            }
            Ok(None) => auth.expire_silently(),
            Err(e) => log_warn!("[Auth] failed to fetch current user: {}", e),
        }
    });

    let on_logout = move |_| auth.logout();

    view! {
        <div class="navbar bg-base-100 shadow-md px-4">
            <div class="flex-1 gap-2">
                <Link to=AppRoute::Products class="btn btn-ghost text-xl">"訂單系統"</Link>
                <ul class="menu menu-horizontal px-1 hidden md:flex">
                    <li>
                        <Link to=AppRoute::Products>
                            <Package attr:class="h-4 w-4" /> "商品列表"
                        </Link>
                    </li>
                    <li>
                        <Link to=AppRoute::ProductNew>
                            <Plus attr:class="h-4 w-4" /> "新增商品"
                        </Link>
                    </li>
                    <li>
                        <Link to=AppRoute::Orders>
                            <ClipboardList attr:class="h-4 w-4" /> "訂單管理"
                        </Link>
                    </li>
                    <li>
                        <Link to=AppRoute::OrderNew>
                            <Plus attr:class="h-4 w-4" /> "建立訂單"
                        </Link>
                    </li>
                </ul>
            </div>
            <div class="flex-none gap-3">
                <span class="text-sm text-base-content/70">
                    {move || {
                        let name = username.get();
                        if name.is_empty() { String::new() } else { format!("你好，{}", name) }
                    }}
                </span>
                <button on:click=on_logout class="btn btn-outline btn-sm gap-2">
                    <LogOut attr:class="h-4 w-4" /> "登出"
                </button>
            </div>
        </div>
    }
}

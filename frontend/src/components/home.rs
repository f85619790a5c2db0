use leptos::prelude::*;

use crate::web::route::AppRoute;
use crate::web::router::Link;

/// 访客首页
#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col text-center max-w-2xl">
                <h1 class="text-4xl font-bold">"歡迎使用訂單管理系統"</h1>
                <p class="py-4 text-base-content/70">
                    "這是一個簡易的後台管理介面，您可以在此建立、編輯商品，並管理訂單。"
                </p>

                <div class="card w-full shadow-xl bg-base-100">
                    <div class="card-body items-center">
                        <h2 class="card-title">"請先登入或註冊"</h2>
                        <p class="text-base-content/70">
                            "請使用以下按鈕進行登入或註冊，之後即可進入系統開始管理商品與訂單。"
                        </p>
                        <div class="card-actions mt-4">
                            <Link to=AppRoute::Login class="btn btn-primary">"前往登入"</Link>
                            <Link to=AppRoute::Register class="btn btn-outline">"立即註冊"</Link>
                        </div>
                    </div>
                </div>

                <p class="mt-6 text-sm text-base-content/50">
                    "還沒有帳號？請點擊「立即註冊」來建立新帳戶。"
                </p>
            </div>
        </div>
    }
}

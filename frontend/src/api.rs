use oms_shared::protocol::{
    CurrentUserRequest, DeleteOrderRequest, DeleteProductRequest, GetOrderRequest,
    GetProductRequest, ListOrdersRequest, ListProductsRequest, UpdateProductRequest,
};
use oms_shared::{
    CreateOrderRequest, CreatedOrder, Identity, LoginRequest, LoginResponse, Order, Product,
    ProductInput, RegisterRequest, RegisterResponse,
};

use crate::client::{ApiClient, Reporting};
use crate::error::ApiResult;
use crate::session::Session;
use crate::web::{FetchTransport, Transport};

/// 浏览器中使用的 API 实例
pub type BrowserApi = OmsApi<FetchTransport>;

/// 订单列表页的初始数据
#[derive(Debug, Clone, PartialEq)]
pub struct OrdersOverview {
    pub identity: Identity,
    pub orders: Vec<Order>,
    pub products: Vec<Product>,
}

/// 建单页的初始数据
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFormData {
    pub identity: Identity,
    pub products: Vec<Product>,
}

/// 订单详情页的数据
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order: Order,
    pub products: Vec<Product>,
}

/// 需要身份的页面初始化结果
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded<T> {
    Ready(T),
    /// 身份检查返回 401/422，会话已被静默清除
    SessionExpired,
}

/// 订单管理后端的类型化接口
pub struct OmsApi<T: Transport> {
    client: ApiClient<T>,
}

impl<T: Transport> OmsApi<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn session(&self) -> &Session {
        self.client.session()
    }

    // ===== 认证 =====

    /// 登录失败的 401 表示账号密码错误，由表单自行提示
    pub async fn login(&self, username: &str, password: &str) -> ApiResult<LoginResponse> {
        let request = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.client.send_with(&request, Reporting::Quiet).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<RegisterResponse> {
        self.client.send_with(request, Reporting::Quiet).await
    }

    /// 身份检查：401/422 视为“没有会话”，返回 `None`
    ///
    /// 不修改存储，清除凭证并同步会话信号由调用方（`AuthContext::expire_silently`）负责。
    pub async fn current_user(&self) -> ApiResult<Option<Identity>> {
        match self
            .client
            .send_with(&CurrentUserRequest, Reporting::Quiet)
            .await
        {
            Ok(identity) => Ok(Some(identity)),
            Err(e) if e.is_auth_failure() => {
                log_info!("[Auth] identity check rejected ({}), session expired", e.error_code());
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ===== 商品 =====

    pub async fn list_products(&self) -> ApiResult<Vec<Product>> {
        self.client.send(&ListProductsRequest).await
    }

    pub async fn get_product(&self, id: i64) -> ApiResult<Product> {
        self.client.send(&GetProductRequest { id }).await
    }

    pub async fn create_product(&self, input: &ProductInput) -> ApiResult<()> {
        self.client.send(input).await?;
        Ok(())
    }

    pub async fn update_product(&self, id: i64, input: ProductInput) -> ApiResult<()> {
        self.client
            .send(&UpdateProductRequest { id, input })
            .await?;
        Ok(())
    }

    pub async fn delete_product(&self, id: i64) -> ApiResult<()> {
        self.client.send(&DeleteProductRequest { id }).await?;
        Ok(())
    }

    // ===== 订单 =====

    pub async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        self.client.send(&ListOrdersRequest).await
    }

    pub async fn get_order(&self, id: i64) -> ApiResult<Order> {
        self.client.send(&GetOrderRequest { id }).await
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> ApiResult<CreatedOrder> {
        self.client.send(request).await
    }

    pub async fn delete_order(&self, id: i64) -> ApiResult<()> {
        self.client.send(&DeleteOrderRequest { id }).await?;
        Ok(())
    }

    // ===== 页面初始化（任一请求失败则整体失败） =====

    /// 先确认身份，会话有效才并发拉取订单与商品，
    /// 失效的凭证因此不会触发顶层 401 提示。
    pub async fn load_orders_overview(&self) -> ApiResult<Loaded<OrdersOverview>> {
        let Some(identity) = self.current_user().await? else {
            return Ok(Loaded::SessionExpired);
        };
        let (orders, products) = futures::try_join!(self.list_orders(), self.list_products())?;

        Ok(Loaded::Ready(OrdersOverview {
            identity,
            orders,
            products,
        }))
    }

    /// 商品与身份并发请求；商品请求静默发送，身份检查的结论优先
    pub async fn load_order_form(&self) -> ApiResult<Loaded<OrderFormData>> {
        let (identity, products) = futures::join!(
            self.current_user(),
            self.client
                .send_with(&ListProductsRequest, Reporting::Quiet)
        );

        let Some(identity) = identity? else {
            return Ok(Loaded::SessionExpired);
        };
        // 会话仍有效时商品请求的 401 照常上报
        let products = products.inspect_err(|e| self.client.report(e))?;

        Ok(Loaded::Ready(OrderFormData { identity, products }))
    }

    pub async fn load_order_detail(&self, id: i64) -> ApiResult<OrderDetail> {
        let (order, products) = futures::try_join!(self.get_order(id), self.list_products())?;
        Ok(OrderDetail { order, products })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use oms_shared::NewOrderItem;
    use oms_shared::protocol::HttpMethod;
    use serde_json::json;

    use super::*;
    use crate::error::{ApiError, ApiErrorKind};
    use crate::web::{MemoryStore, MockTransport};

    fn setup(token: Option<&str>) -> (OmsApi<Rc<MockTransport>>, Rc<MockTransport>) {
        let store = match token {
            Some(token) => MemoryStore::with(&[("token", token)]),
            None => MemoryStore::new(),
        };
        let transport = MockTransport::new();
        let session = Session::new(Rc::new(store), "token");
        let api = OmsApi::new(ApiClient::new("", transport.clone(), session));
        (api, transport)
    }

    /// 注册计数用的 401 处理器
    fn count_unauthorized(api: &OmsApi<Rc<MockTransport>>) -> Rc<Cell<u32>> {
        let count = Rc::new(Cell::new(0));
        let counter = count.clone();
        api.client()
            .on_unauthorized(Rc::new(move |_: &ApiError| counter.set(counter.get() + 1)));
        count
    }

    fn mock_catalog(transport: &MockTransport) {
        transport.mock(
            HttpMethod::Get,
            "/products",
            200,
            json!([{"id": 1, "name": "鉛筆", "price": 10.0}, {"id": 2, "name": "橡皮擦", "price": 5.5}]),
        );
    }

    #[tokio::test]
    async fn login_posts_credentials() {
        let (api, transport) = setup(None);
        transport.mock(HttpMethod::Post, "/auth/login", 200, json!({"access_token": "jwt"}));

        let response = api.login("alice", "secret").await.unwrap();

        assert_eq!(response.access_token, "jwt");
        let body: serde_json::Value =
            serde_json::from_str(transport.last_request().unwrap().body.as_deref().unwrap())
                .unwrap();
        assert_eq!(body, json!({"username": "alice", "password": "secret"}));
    }

    #[tokio::test]
    async fn identity_check_reports_no_session_without_touching_storage() {
        let (api, transport) = setup(Some("stale"));
        transport.mock(HttpMethod::Get, "/auth/me", 422, json!({"msg": "Not enough segments"}));

        assert_eq!(api.current_user().await.unwrap(), None);
        // 凭证由 AuthContext 清除，以便同时翻转会话信号
        assert_eq!(api.session().token().as_deref(), Some("stale"));
    }

    #[tokio::test]
    async fn identity_check_propagates_server_errors() {
        let (api, transport) = setup(Some("jwt"));
        transport.mock(HttpMethod::Get, "/auth/me", 500, json!({}));

        let err = api.current_user().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Server);
        assert!(api.session().is_authenticated());
    }

    #[tokio::test]
    async fn orders_overview_joins_three_requests() {
        let (api, transport) = setup(Some("jwt"));
        mock_catalog(&transport);
        transport.mock(HttpMethod::Get, "/auth/me", 200, json!({"id": 7, "username": "alice"}));
        transport.mock(
            HttpMethod::Get,
            "/orders",
            200,
            json!([{"id": 3, "status": "pending", "items": [{"product_id": 1, "qty": 2, "price": 10.0}]}]),
        );

        let Loaded::Ready(overview) = api.load_orders_overview().await.unwrap() else {
            panic!("expected loaded overview");
        };

        assert_eq!(transport.request_count(), 3);
        assert_eq!(overview.identity.username, "alice");
        let order = &overview.orders[0];
        assert_eq!(order.total_quantity(), 2);
        assert_eq!(order.item_name(&order.items[0], &overview.products), Some("鉛筆"));
    }

    #[tokio::test]
    async fn orders_overview_fails_when_any_request_fails() {
        let (api, transport) = setup(Some("jwt"));
        mock_catalog(&transport);
        transport.mock(HttpMethod::Get, "/auth/me", 200, json!({"id": 7, "username": "alice"}));
        transport.mock(HttpMethod::Get, "/orders", 500, json!({"message": "db down"}));

        let err = api.load_orders_overview().await.unwrap_err();
        assert_eq!(err.message(), "db down");
    }

    #[tokio::test]
    async fn order_form_reports_expired_session() {
        let (api, transport) = setup(Some("stale"));
        let reported = count_unauthorized(&api);
        transport.mock(HttpMethod::Get, "/auth/me", 401, json!({}));
        transport.mock(HttpMethod::Get, "/products", 401, json!({"msg": "Token has expired"}));

        assert_eq!(api.load_order_form().await.unwrap(), Loaded::SessionExpired);
        assert_eq!(reported.get(), 0);
    }

    #[tokio::test]
    async fn order_form_reports_product_401_when_identity_is_valid() {
        let (api, transport) = setup(Some("jwt"));
        let reported = count_unauthorized(&api);
        transport.mock(HttpMethod::Get, "/auth/me", 200, json!({"id": 7, "username": "alice"}));
        transport.mock(HttpMethod::Get, "/products", 401, json!({}));

        let err = api.load_order_form().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(reported.get(), 1);
    }

    #[tokio::test]
    async fn orders_overview_with_stale_token_expires_quietly() {
        for status in [401, 422] {
            let (api, transport) = setup(Some("stale"));
            let reported = count_unauthorized(&api);
            let body = json!({"msg": "Not enough segments"});
            transport.mock(HttpMethod::Get, "/auth/me", status, body.clone());
            transport.mock(HttpMethod::Get, "/orders", status, body.clone());
            transport.mock(HttpMethod::Get, "/products", status, body);

            assert_eq!(api.load_orders_overview().await.unwrap(), Loaded::SessionExpired);
            assert_eq!(reported.get(), 0, "status {}", status);
            // 身份检查失败后不再请求订单与商品
            assert_eq!(transport.request_count(), 1);
        }
    }

    #[tokio::test]
    async fn create_order_uses_qty_on_the_wire() {
        let (api, transport) = setup(Some("jwt"));
        transport.mock(HttpMethod::Post, "/orders", 201, json!({"id": 42, "order_sn": "X1"}));

        let created = api
            .create_order(&CreateOrderRequest {
                receiver_name: "王小明".to_string(),
                receiver_phone: "0912345678".to_string(),
                shipping_address: "台北市".to_string(),
                remark: String::new(),
                items: vec![NewOrderItem { product_id: 1, qty: 3 }],
            })
            .await
            .unwrap();

        assert_eq!(created.id, 42);
        let body: serde_json::Value =
            serde_json::from_str(transport.last_request().unwrap().body.as_deref().unwrap())
                .unwrap();
        assert_eq!(body["items"], json!([{"product_id": 1, "qty": 3}]));
    }

    #[tokio::test]
    async fn update_product_puts_to_resource_path() {
        let (api, transport) = setup(Some("jwt"));
        transport.mock(HttpMethod::Put, "/products/5", 200, json!({"id": 5}));

        api.update_product(
            5,
            ProductInput {
                name: "筆記本".to_string(),
                price: 45.0,
            },
        )
        .await
        .unwrap();

        let req = transport.last_request().unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"name": "筆記本", "price": 45.0}));
    }

    #[tokio::test]
    async fn order_detail_joins_order_and_catalog() {
        let (api, transport) = setup(Some("jwt"));
        mock_catalog(&transport);
        transport.mock(
            HttpMethod::Get,
            "/orders/9",
            200,
            json!({
                "id": 9,
                "status": "paid",
                "receiver_name": "王小明",
                "items": [
                    {"product_id": 2, "quantity": 3, "price": 5.5},
                    {"product_id": 99, "qty": 1, "price": 1.0}
                ]
            }),
        );

        let detail = api.load_order_detail(9).await.unwrap();

        assert_eq!(detail.order.total_quantity(), 4);
        let names: Vec<_> = detail
            .order
            .items
            .iter()
            .map(|item| detail.order.item_name(item, &detail.products))
            .collect();
        assert_eq!(names, vec![Some("橡皮擦"), None]);
    }
}

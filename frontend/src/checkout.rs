//! 注册后自动下单
//!
//! 其他页面把购物车（`[{"id":1,"qty":2}]`）和自动下单标记写进存储，
//! 注册并自动登录后由这里把购物车转换成一次建单请求。

use std::fmt;
use std::rc::Rc;

use oms_shared::validate::{self, FormErrors};
use oms_shared::{CartLine, CreateOrderRequest, CreatedOrder, NewOrderItem};

use crate::api::OmsApi;
use crate::config::StorageKeys;
use crate::error::ApiError;
use crate::web::{KeyValueStore, Transport};

// =========================================================
// 错误类型
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutError {
    /// 存储中没有购物车或购物车为空
    EmptyCart,
    /// 购物车不是合法的 JSON 数组
    MalformedCart(String),
    /// 收件信息未通过校验
    Invalid(FormErrors),
    Api(ApiError),
}

impl fmt::Display for CheckoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutError::EmptyCart => write!(f, "購物車是空的"),
            CheckoutError::MalformedCart(_) => write!(f, "購物車資料錯誤"),
            CheckoutError::Invalid(errors) => write!(f, "{}", errors),
            CheckoutError::Api(e) => write!(f, "{}", e.user_message()),
        }
    }
}

impl std::error::Error for CheckoutError {}

impl From<ApiError> for CheckoutError {
    fn from(e: ApiError) -> Self {
        CheckoutError::Api(e)
    }
}

impl From<FormErrors> for CheckoutError {
    fn from(errors: FormErrors) -> Self {
        CheckoutError::Invalid(errors)
    }
}

// =========================================================
// 收件信息表单
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutForm {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub shipping_address: String,
    pub remark: String,
}

impl CheckoutForm {
    pub fn validate(&self) -> Result<(), FormErrors> {
        let mut errors = FormErrors::new();
        errors.check(validate::required(
            "receiver_name",
            &self.receiver_name,
            "請輸入收件人",
        ));
        errors.check(validate::required(
            "receiver_phone",
            &self.receiver_phone,
            "請輸入電話",
        ));
        errors.check(validate::required(
            "shipping_address",
            &self.shipping_address,
            "請輸入地址",
        ));
        errors.into_result(|| ())
    }

    fn into_request(self, items: Vec<NewOrderItem>) -> CreateOrderRequest {
        CreateOrderRequest {
            receiver_name: self.receiver_name.trim().to_string(),
            receiver_phone: self.receiver_phone.trim().to_string(),
            shipping_address: self.shipping_address.trim().to_string(),
            remark: self.remark.trim().to_string(),
            items,
        }
    }
}

// =========================================================
// 待结账的购物车
// =========================================================

pub struct PendingCheckout {
    store: Rc<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl PendingCheckout {
    pub fn new(store: Rc<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { store, keys }
    }

    /// 自动下单标记是否存在（任意非空值）
    pub fn is_requested(&self) -> bool {
        self.store
            .get(&self.keys.auto_checkout)
            .is_some_and(|flag| !flag.is_empty())
    }

    /// 读取购物车；不存在或为空数组时返回 `EmptyCart`
    pub fn cart(&self) -> Result<Vec<CartLine>, CheckoutError> {
        let raw = self
            .store
            .get(&self.keys.cart)
            .ok_or(CheckoutError::EmptyCart)?;
        let cart: Vec<CartLine> = serde_json::from_str(&raw)
            .map_err(|e| CheckoutError::MalformedCart(e.to_string()))?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        Ok(cart)
    }

    /// 注册并登录后是否应该弹出结账窗口
    ///
    /// 标记存在且购物车非空时为 `Ok(Some(cart))`；购物车损坏时返回错误。
    pub fn pending(&self) -> Result<Option<Vec<CartLine>>, CheckoutError> {
        if !self.is_requested() {
            return Ok(None);
        }
        match self.cart() {
            Ok(cart) => Ok(Some(cart)),
            Err(CheckoutError::EmptyCart) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// 把购物车与收件信息组合为建单请求
    pub fn build_order(&self, form: CheckoutForm) -> Result<CreateOrderRequest, CheckoutError> {
        form.validate()?;
        let items = self.cart()?.into_iter().map(NewOrderItem::from).collect();
        Ok(form.into_request(items))
    }

    /// 提交订单：恰好一次建单请求，成功后删除购物车与标记
    pub async fn complete<T: Transport>(
        &self,
        api: &OmsApi<T>,
        form: CheckoutForm,
    ) -> Result<CreatedOrder, CheckoutError> {
        let request = self.build_order(form)?;
        let created = api.create_order(&request).await?;

        self.store.delete(&self.keys.cart);
        self.store.delete(&self.keys.auto_checkout);
        log_info!(
            "[Checkout] order #{} created from {} cart line(s)",
            created.id,
            request.items.len()
        );
        Ok(created)
    }

    /// 取消自动下单：只删除标记，保留购物车
    pub fn cancel(&self) {
        self.store.delete(&self.keys.auto_checkout);
        log_info!("[Checkout] auto checkout cancelled");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use oms_shared::protocol::HttpMethod;
    use serde_json::json;

    use super::*;
    use crate::client::ApiClient;
    use crate::session::Session;
    use crate::web::{MemoryStore, MockTransport};

    const CART: &str = r#"[{"id":1,"qty":2},{"id":2,"qty":1}]"#;

    fn store(entries: &[(&str, &str)]) -> Rc<dyn KeyValueStore> {
        Rc::new(MemoryStore::with(entries))
    }

    fn form() -> CheckoutForm {
        CheckoutForm {
            receiver_name: "王小明".to_string(),
            receiver_phone: "0912345678".to_string(),
            shipping_address: "台北市信義區".to_string(),
            remark: String::new(),
        }
    }

    #[test]
    fn pending_requires_flag_and_non_empty_cart() {
        let keys = StorageKeys::default();

        let no_flag = PendingCheckout::new(store(&[("oms-cart", CART)]), keys.clone());
        assert_eq!(no_flag.pending(), Ok(None));

        let empty = PendingCheckout::new(
            store(&[("oms-cart", "[]"), ("oms-auto-checkout", "1")]),
            keys.clone(),
        );
        assert_eq!(empty.pending(), Ok(None));

        let ready = PendingCheckout::new(
            store(&[("oms-cart", CART), ("oms-auto-checkout", "1")]),
            keys,
        );
        assert_eq!(ready.pending().unwrap().map(|c| c.len()), Some(2));
    }

    #[test]
    fn malformed_cart_is_reported() {
        let checkout = PendingCheckout::new(
            store(&[("oms-cart", "{not json"), ("oms-auto-checkout", "true")]),
            StorageKeys::default(),
        );
        assert!(matches!(
            checkout.pending(),
            Err(CheckoutError::MalformedCart(_))
        ));
    }

    #[test]
    fn missing_receiver_fields_block_order() {
        let checkout = PendingCheckout::new(store(&[("oms-cart", CART)]), StorageKeys::default());
        let err = checkout
            .build_order(CheckoutForm {
                shipping_address: " ".to_string(),
                ..form()
            })
            .unwrap_err();

        let CheckoutError::Invalid(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.has("shipping_address"));
        assert!(!errors.has("receiver_name"));
    }

    #[tokio::test]
    async fn completing_checkout_creates_one_order_and_clears_cart() {
        let shared = store(&[
            ("token", "jwt"),
            ("oms-cart", CART),
            ("oms-auto-checkout", "1"),
        ]);
        let transport = MockTransport::new();
        transport.mock(HttpMethod::Post, "/orders", 201, json!({"id": 17}));
        let api = OmsApi::new(ApiClient::new(
            "",
            transport.clone(),
            Session::new(shared.clone(), "token"),
        ));
        let checkout = PendingCheckout::new(shared.clone(), StorageKeys::default());

        let created = checkout.complete(&api, form()).await.unwrap();

        assert_eq!(created.id, 17);
        assert_eq!(transport.request_count(), 1);
        let req = transport.last_request().unwrap();
        assert_eq!(req.header("Authorization"), Some("Bearer jwt"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(
            body["items"],
            json!([{"product_id": 1, "qty": 2}, {"product_id": 2, "qty": 1}])
        );
        assert_eq!(shared.get("oms-cart"), None);
        assert_eq!(shared.get("oms-auto-checkout"), None);
    }

    #[tokio::test]
    async fn failed_order_keeps_cart_and_flag() {
        let shared = store(&[
            ("token", "jwt"),
            ("oms-cart", CART),
            ("oms-auto-checkout", "1"),
        ]);
        let transport = MockTransport::new();
        transport.mock(HttpMethod::Post, "/orders", 400, json!({"description": "庫存不足"}));
        let api = OmsApi::new(ApiClient::new(
            "",
            transport.clone(),
            Session::new(shared.clone(), "token"),
        ));
        let checkout = PendingCheckout::new(shared.clone(), StorageKeys::default());

        let err = checkout.complete(&api, form()).await.unwrap_err();

        assert_eq!(err.to_string(), "庫存不足");
        assert!(shared.contains("oms-cart"));
        assert!(shared.contains("oms-auto-checkout"));
    }

    #[tokio::test]
    async fn expired_token_during_checkout_is_reported_once() {
        let shared = store(&[
            ("token", "stale"),
            ("oms-cart", CART),
            ("oms-auto-checkout", "1"),
        ]);
        let transport = MockTransport::new();
        transport.mock(HttpMethod::Post, "/orders", 401, json!({"msg": "Token has expired"}));
        let api = OmsApi::new(ApiClient::new(
            "",
            transport.clone(),
            Session::new(shared.clone(), "token"),
        ));
        let reported = Rc::new(Cell::new(0));
        let counter = reported.clone();
        api.client()
            .on_unauthorized(Rc::new(move |_: &ApiError| counter.set(counter.get() + 1)));
        let checkout = PendingCheckout::new(shared.clone(), StorageKeys::default());

        let err = checkout.complete(&api, form()).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Api(ref e) if e.is_unauthorized()));
        assert_eq!(reported.get(), 1);
        // 购物车保留，重新登录后仍可下单
        assert!(shared.contains("oms-cart"));
    }

    #[test]
    fn cancel_removes_only_the_flag() {
        let shared = store(&[("oms-cart", CART), ("oms-auto-checkout", "1")]);
        let checkout = PendingCheckout::new(shared.clone(), StorageKeys::default());

        checkout.cancel();

        assert!(!checkout.is_requested());
        assert_eq!(shared.get("oms-cart").as_deref(), Some(CART));
    }
}

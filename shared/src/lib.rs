use serde::{Deserialize, Serialize};

pub mod date;
pub mod protocol;
pub mod validate;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const BEARER_PREFIX: &str = "Bearer ";

/// 注册时可选的角色
pub const ROLES: [&str; 3] = ["admin", "seller", "customer"];
pub const DEFAULT_ROLE: &str = "customer";

// =========================================================
// 认证 (Auth)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    // 空字符串不发送给后端
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// 注册接口的返回值，流程本身只关心成功与否
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub access_token: Option<String>,
}

/// `GET /auth/me` 返回的当前用户
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

// =========================================================
// 商品 (Products)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
}

/// 新增 / 编辑商品的请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub price: f64,
}

/// 按 id 在商品列表中查找
pub fn find_product(products: &[Product], id: i64) -> Option<&Product> {
    products.iter().find(|p| p.id == id)
}

// =========================================================
// 订单 (Orders)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: i64,
    #[serde(alias = "qty")]
    pub quantity: u32,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl OrderItem {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub receiver_phone: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_sn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Order {
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|it| it.quantity).sum()
    }

    /// 明细合计；列表接口不带明细时退回服务端的 total_amount
    pub fn total_amount(&self) -> f64 {
        if self.items.is_empty() {
            return self.total_amount.unwrap_or(0.0);
        }
        self.items.iter().map(OrderItem::subtotal).sum()
    }

    /// 明细中的商品名称：优先用订单自带的 product_name，其次查商品列表
    pub fn item_name<'a>(&'a self, item: &'a OrderItem, products: &'a [Product]) -> Option<&'a str> {
        item.product_name
            .as_deref()
            .or_else(|| find_product(products, item.product_id).map(|p| p.name.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub qty: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub receiver_name: String,
    pub receiver_phone: String,
    pub shipping_address: String,
    pub remark: String,
    pub items: Vec<NewOrderItem>,
}

/// 建单成功后只需要新订单的 id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedOrder {
    pub id: i64,
}

// =========================================================
// 购物车 (Cart)
// =========================================================

/// 本地存储中的购物车条目，形如 `{"id":1,"qty":2}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: i64,
    pub qty: u32,
}

impl From<CartLine> for NewOrderItem {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.id,
            qty: line.qty,
        }
    }
}

// =========================================================
// 错误响应体 (Error Body)
// =========================================================

/// 后端错误的几种写法：`{description}`、`{message}`、`{msg}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<&str> {
        [&self.description, &self.message, &self.msg]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .find(|s| !s.trim().is_empty())
    }

    /// 从原始响应体中提取错误文本，非 JSON 时返回 None
    pub fn extract(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.text().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_item_accepts_qty_alias() {
        let item: OrderItem =
            serde_json::from_str(r#"{"product_id":3,"qty":4,"price":2.5}"#).unwrap();
        assert_eq!(item.quantity, 4);
        assert_eq!(item.subtotal(), 10.0);
    }

    #[test]
    fn order_totals_sum_items() {
        let order: Order = serde_json::from_str(
            r#"{"id":7,"status":"pending","items":[
                {"product_id":1,"quantity":2,"price":10.0},
                {"product_id":2,"quantity":1,"price":5.5}
            ]}"#,
        )
        .unwrap();
        assert_eq!(order.total_quantity(), 3);
        assert_eq!(order.total_amount(), 25.5);
    }

    #[test]
    fn order_without_items_falls_back_to_server_total() {
        let order: Order =
            serde_json::from_str(r#"{"id":1,"status":"paid","total_amount":99.0}"#).unwrap();
        assert!(order.items.is_empty());
        assert_eq!(order.total_amount(), 99.0);
    }

    #[test]
    fn item_name_resolves_from_product_list() {
        let products = vec![Product {
            id: 2,
            name: "Tea".to_string(),
            price: 3.0,
            promo_price: None,
            stock: None,
        }];
        let order: Order = serde_json::from_str(
            r#"{"id":1,"items":[{"product_id":2,"qty":1,"price":3.0},{"product_id":9,"qty":1,"price":1.0}]}"#,
        )
        .unwrap();
        assert_eq!(order.item_name(&order.items[0], &products), Some("Tea"));
        assert_eq!(order.item_name(&order.items[1], &products), None);
    }

    #[test]
    fn error_body_prefers_description() {
        let text = ErrorBody::extract(r#"{"message":"m","description":"d"}"#);
        assert_eq!(text.as_deref(), Some("d"));
        assert_eq!(ErrorBody::extract(r#"{"msg":"Token has expired"}"#).as_deref(), Some("Token has expired"));
        assert_eq!(ErrorBody::extract("<html>"), None);
        assert_eq!(ErrorBody::extract(r#"{"message":"  "}"#), None);
    }

    #[test]
    fn register_request_skips_empty_optionals() {
        let req = RegisterRequest {
            username: "alice".to_string(),
            email: "a@example.com".to_string(),
            password: "pw".to_string(),
            role: None,
            phone: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("phone").is_none());
        assert!(json.get("role").is_none());
    }
}

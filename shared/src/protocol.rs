use crate::{
    CreateOrderRequest, CreatedOrder, Identity, LoginRequest, LoginResponse, Order, Product,
    ProductInput, RegisterRequest, RegisterResponse,
};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// 只有 POST / PUT 携带请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// 路径可能包含资源 id（如 `/products/3`），所以用方法而不是常量。
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path relative to the API base.
    fn path(&self) -> String;
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/login".to_string()
    }
}

impl ApiRequest for RegisterRequest {
    type Response = RegisterResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/register".to_string()
    }
}

/// Current user identity
#[derive(Debug, Serialize, Deserialize)]
pub struct CurrentUserRequest;

impl ApiRequest for CurrentUserRequest {
    type Response = Identity;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/auth/me".to_string()
    }
}

// =========================================================
// Products
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListProductsRequest;

impl ApiRequest for ListProductsRequest {
    type Response = Vec<Product>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/products".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetProductRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for GetProductRequest {
    type Response = Product;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/products/{}", self.id)
    }
}

/// Create a product. The echoed product is not needed by the form.
impl ApiRequest for ProductInput {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/products".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub input: ProductInput,
}

impl ApiRequest for UpdateProductRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("/products/{}", self.id)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteProductRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for DeleteProductRequest {
    // 204 or a `{message}` body, both treated as success
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/products/{}", self.id)
    }
}

// =========================================================
// Orders
// =========================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ListOrdersRequest;

impl ApiRequest for ListOrdersRequest {
    type Response = Vec<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/orders".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetOrderRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for GetOrderRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/orders/{}", self.id)
    }
}

impl ApiRequest for CreateOrderRequest {
    type Response = CreatedOrder;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/orders".to_string()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteOrderRequest {
    #[serde(skip)]
    pub id: i64,
}

impl ApiRequest for DeleteOrderRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/orders/{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_embed_resource_ids() {
        assert_eq!(GetProductRequest { id: 4 }.path(), "/products/4");
        assert_eq!(DeleteOrderRequest { id: 12 }.path(), "/orders/12");
        assert_eq!(CurrentUserRequest.path(), "/auth/me");
    }

    #[test]
    fn update_body_carries_only_input_fields() {
        let req = UpdateProductRequest {
            id: 9,
            input: ProductInput {
                name: "Pen".to_string(),
                price: 12.0,
            },
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, serde_json::json!({"name": "Pen", "price": 12.0}));
    }

    #[test]
    fn only_writes_carry_a_body() {
        assert!(HttpMethod::Post.has_body());
        assert!(HttpMethod::Put.has_body());
        assert!(!HttpMethod::Get.has_body());
        assert!(!HttpMethod::Delete.has_body());
    }
}

//! 建单页的可编辑订单草稿

use oms_shared::validate::{FieldError, FormErrors};
use oms_shared::{CreateOrderRequest, NewOrderItem, Product, find_product};

use crate::checkout::CheckoutForm;

/// 草稿中的一行商品
#[derive(Debug, Clone, PartialEq)]
pub struct DraftLine {
    /// 尚未选择商品时为 None
    pub product_id: Option<i64>,
    pub quantity: u32,
    /// 选择商品时带出的单价
    pub price: f64,
}

impl Default for DraftLine {
    fn default() -> Self {
        Self {
            product_id: None,
            quantity: 1,
            price: 0.0,
        }
    }
}

impl DraftLine {
    pub fn subtotal(&self) -> f64 {
        f64::from(self.quantity) * self.price
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    lines: Vec<DraftLine>,
    pub receiver: CheckoutForm,
}

impl Default for OrderDraft {
    fn default() -> Self {
        Self {
            lines: vec![DraftLine::default()],
            receiver: CheckoutForm::default(),
        }
    }
}

impl OrderDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn add_line(&mut self) {
        self.lines.push(DraftLine::default());
    }

    /// 至少保留一行
    pub fn remove_line(&mut self, index: usize) {
        if self.lines.len() > 1 && index < self.lines.len() {
            self.lines.remove(index);
        }
    }

    pub fn can_remove(&self) -> bool {
        self.lines.len() > 1
    }

    /// 选择商品并带出单价；商品不在列表中时单价归零
    pub fn set_product(&mut self, index: usize, product_id: Option<i64>, products: &[Product]) {
        if let Some(line) = self.lines.get_mut(index) {
            line.product_id = product_id;
            line.price = product_id
                .and_then(|id| find_product(products, id))
                .map_or(0.0, |p| p.price);
        }
    }

    pub fn set_quantity(&mut self, index: usize, quantity: u32) {
        if let Some(line) = self.lines.get_mut(index) {
            line.quantity = quantity.max(1);
        }
    }

    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    pub fn total_amount(&self) -> f64 {
        self.lines.iter().map(DraftLine::subtotal).sum()
    }

    pub fn to_request(&self) -> Result<CreateOrderRequest, FormErrors> {
        let mut errors = match self.receiver.validate() {
            Ok(()) => FormErrors::new(),
            Err(errors) => errors,
        };

        let mut items = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            match line.product_id {
                Some(product_id) => items.push(NewOrderItem {
                    product_id,
                    qty: line.quantity,
                }),
                None => {
                    errors.push(FieldError::new("items", "請選擇商品"));
                    break;
                }
            }
        }

        let receiver = &self.receiver;
        errors.into_result(|| CreateOrderRequest {
            receiver_name: receiver.receiver_name.trim().to_string(),
            receiver_phone: receiver.receiver_phone.trim().to_string(),
            shipping_address: receiver.shipping_address.trim().to_string(),
            remark: receiver.remark.trim().to_string(),
            items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: 1,
                name: "鉛筆".to_string(),
                price: 10.0,
                promo_price: None,
                stock: None,
            },
            Product {
                id: 2,
                name: "橡皮擦".to_string(),
                price: 5.5,
                promo_price: None,
                stock: Some(3),
            },
        ]
    }

    fn receiver() -> CheckoutForm {
        CheckoutForm {
            receiver_name: "王小明".to_string(),
            receiver_phone: "0912345678".to_string(),
            shipping_address: "台北市".to_string(),
            remark: " 下午送 ".to_string(),
        }
    }

    #[test]
    fn keeps_at_least_one_line() {
        let mut draft = OrderDraft::new();
        assert!(!draft.can_remove());
        draft.remove_line(0);
        assert_eq!(draft.lines().len(), 1);

        draft.add_line();
        draft.remove_line(0);
        assert_eq!(draft.lines().len(), 1);
    }

    #[test]
    fn selecting_product_sets_price_and_totals() {
        let products = catalog();
        let mut draft = OrderDraft::new();
        draft.set_product(0, Some(1), &products);
        draft.set_quantity(0, 3);
        draft.add_line();
        draft.set_product(1, Some(2), &products);
        draft.set_quantity(1, 0);

        assert_eq!(draft.lines()[1].quantity, 1);
        assert_eq!(draft.total_quantity(), 4);
        assert_eq!(draft.total_amount(), 35.5);

        draft.set_product(1, Some(99), &products);
        assert_eq!(draft.lines()[1].price, 0.0);
    }

    #[test]
    fn unselected_line_blocks_submission() {
        let mut draft = OrderDraft::new();
        draft.receiver = receiver();
        let errors = draft.to_request().unwrap_err();
        assert!(errors.has("items"));
    }

    #[test]
    fn builds_request_with_qty_items() {
        let products = catalog();
        let mut draft = OrderDraft::new();
        draft.receiver = receiver();
        draft.set_product(0, Some(2), &products);
        draft.set_quantity(0, 2);

        let request = draft.to_request().unwrap();
        assert_eq!(request.items, vec![NewOrderItem { product_id: 2, qty: 2 }]);
        assert_eq!(request.remark, "下午送");
    }
}

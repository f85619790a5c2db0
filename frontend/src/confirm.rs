//! 删除前的确认步骤

use std::future::Future;

use crate::error::ApiResult;

/// 向用户确认一次破坏性操作
pub trait Confirm {
    fn confirm(&self, message: &str) -> bool;
}

/// 浏览器 `window.confirm`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConfirm;

impl Confirm for BrowserConfirm {
    fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }
}

/// 确认后的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// 用户取消，没有发出任何请求
    Declined,
}

/// 先确认再执行删除；取消时 `action` 不会被调用
pub async fn confirm_delete<C, F, Fut>(confirm: &C, message: &str, action: F) -> ApiResult<Deletion>
where
    C: Confirm + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = ApiResult<()>>,
{
    if !confirm.confirm(message) {
        return Ok(Deletion::Declined);
    }
    action().await?;
    Ok(Deletion::Deleted)
}

#[cfg(test)]
pub use fixed::FixedConfirm;

#[cfg(test)]
mod fixed {
    use std::cell::RefCell;

    use super::Confirm;

    /// 固定回答的确认框，记录被询问的消息
    pub struct FixedConfirm {
        answer: bool,
        pub asked: RefCell<Vec<String>>,
    }

    impl FixedConfirm {
        pub fn new(answer: bool) -> Self {
            Self {
                answer,
                asked: RefCell::new(Vec::new()),
            }
        }
    }

    impl Confirm for FixedConfirm {
        fn confirm(&self, message: &str) -> bool {
            self.asked.borrow_mut().push(message.to_string());
            self.answer
        }
    }
}

//! 键值存储模块
//!
//! `KeyValueStore` 抽象出浏览器 localStorage，会话与结账流程只依赖这个 trait，
//! 测试时注入 `MemoryStore` 即可，不触碰真实存储。

use std::cell::RefCell;
use std::collections::HashMap;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

/// 字符串键值存储
pub trait KeyValueStore {
    /// 获取存储的字符串值，键不存在或出错时返回 `None`
    fn get(&self, key: &str) -> Option<String>;

    /// 设置存储值，返回操作是否成功
    fn set(&self, key: &str, value: &str) -> bool;

    /// 删除键值对，返回操作是否成功
    fn delete(&self, key: &str) -> bool;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

// =========================================================
// 实现层: 浏览器 localStorage
// =========================================================

/// 浏览器 localStorage，值按原样读写（不做 JSON 包装），
/// 与站内其他页面写入的购物车保持兼容。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn set(&self, key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    fn delete(&self, key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

// =========================================================
// 实现层: 内存存储
// =========================================================

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        for (k, v) in entries {
            store.set(k, v);
        }
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> bool {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        true
    }

    fn delete(&self, key: &str) -> bool {
        self.entries.borrow_mut().remove(key);
        true
    }
}

// =========================================================
// 跨标签页同步
// =========================================================

/// 监听其他标签页对 `key` 的修改（`storage` 事件只在其他标签页触发）。
///
/// `localStorage.clear()` 产生的事件 key 为空，同样视为相关。
pub fn listen_storage_changes<F>(key: String, callback: F)
where
    F: Fn() + 'static,
{
    let closure = Closure::<dyn Fn(web_sys::StorageEvent)>::new(move |ev: web_sys::StorageEvent| {
        match ev.key() {
            Some(changed) if changed != key => {}
            _ => callback(),
        }
    });

    if let Some(window) = web_sys::window() {
        let _ = window
            .add_event_listener_with_callback("storage", closure.as_ref().unchecked_ref());
    }

    // 泄漏闭包以保持监听器存活（应用生命周期内只注册一次）
    closure.forget();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(!store.contains("token"));
        assert!(store.set("token", "abc"));
        assert_eq!(store.get("token").as_deref(), Some("abc"));
        assert!(store.delete("token"));
        assert_eq!(store.get("token"), None);
    }

    #[test]
    fn memory_store_seeded_entries() {
        let store = MemoryStore::with(&[("a", "1"), ("b", "2")]);
        assert_eq!(store.get("b").as_deref(), Some("2"));
    }
}

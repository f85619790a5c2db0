//! 会话模块
//!
//! 会话只有一个事实来源：存储中是否有凭证 token。
//! `Session` 显式地传给 HTTP 客户端、守卫与各页面，底层存储可注入。

use std::rc::Rc;

use crate::web::KeyValueStore;

/// 二元会话状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    Authenticated,
    #[default]
    Unauthenticated,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }

    fn from_token(token: Option<&str>) -> Self {
        match token {
            Some(t) if !t.trim().is_empty() => SessionState::Authenticated,
            _ => SessionState::Unauthenticated,
        }
    }
}

/// 会话句柄，可廉价克隆，所有克隆共享同一个存储
#[derive(Clone)]
pub struct Session {
    store: Rc<dyn KeyValueStore>,
    token_key: Rc<str>,
}

impl Session {
    pub fn new(store: Rc<dyn KeyValueStore>, token_key: &str) -> Self {
        Self {
            store,
            token_key: Rc::from(token_key),
        }
    }

    pub fn store(&self) -> Rc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// 当前凭证，空白字符串视为不存在
    pub fn token(&self) -> Option<String> {
        self.store
            .get(&self.token_key)
            .filter(|t| !t.trim().is_empty())
    }

    /// 从存储重新推导状态（启动时与跨标签页通知时调用）
    pub fn state(&self) -> SessionState {
        SessionState::from_token(self.token().as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// 登录成功：Unauthenticated -> Authenticated
    pub fn sign_in(&self, token: &str) -> SessionState {
        self.store.set(&self.token_key, token);
        self.state()
    }

    /// 登出或收到 401：Authenticated -> Unauthenticated
    pub fn sign_out(&self) -> SessionState {
        self.store.delete(&self.token_key);
        SessionState::Unauthenticated
    }

    pub fn token_key(&self) -> &str {
        &self.token_key
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token_key", &self.token_key)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::MemoryStore;

    fn session_with(entries: &[(&str, &str)]) -> Session {
        Session::new(Rc::new(MemoryStore::with(entries)), "token")
    }

    #[test]
    fn state_is_derived_from_token_presence() {
        assert_eq!(session_with(&[]).state(), SessionState::Unauthenticated);
        assert_eq!(session_with(&[("token", "")]).state(), SessionState::Unauthenticated);
        assert_eq!(session_with(&[("token", "jwt")]).state(), SessionState::Authenticated);
    }

    #[test]
    fn sign_in_and_out_transitions() {
        let session = session_with(&[]);
        assert_eq!(session.sign_in("jwt"), SessionState::Authenticated);
        assert_eq!(session.token().as_deref(), Some("jwt"));
        assert_eq!(session.sign_out(), SessionState::Unauthenticated);
        assert_eq!(session.token(), None);
    }

    #[test]
    fn clones_share_storage() {
        let session = session_with(&[]);
        let other = session.clone();
        session.sign_in("jwt");
        assert!(other.is_authenticated());
    }
}

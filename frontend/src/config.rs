//! 应用配置
//!
//! 静态 CSR 包没有运行时环境变量，覆盖值在编译期通过 `option_env!` 读取，
//! 未设置时使用下面的默认值。

/// 默认同源请求，由开发服务器代理到后端
const DEFAULT_API_BASE_URL: &str = "";
const DEFAULT_TOKEN_KEY: &str = "token";
const DEFAULT_CART_KEY: &str = "oms-cart";
const DEFAULT_AUTO_CHECKOUT_KEY: &str = "oms-auto-checkout";
const DEFAULT_NOTICE_TIMEOUT_MS: u32 = 3_000;

/// 存储键名
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub token: String,
    pub cart: String,
    pub auto_checkout: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN_KEY.to_string(),
            cart: DEFAULT_CART_KEY.to_string(),
            auto_checkout: DEFAULT_AUTO_CHECKOUT_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub keys: StorageKeys,
    pub notice_timeout_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            keys: StorageKeys::default(),
            notice_timeout_ms: DEFAULT_NOTICE_TIMEOUT_MS,
        }
    }
}

impl AppConfig {
    /// 读取编译期覆盖值
    pub fn from_build_env() -> Self {
        Self::from_overrides(
            option_env!("OMS_API_BASE_URL"),
            option_env!("OMS_TOKEN_KEY"),
            option_env!("OMS_CART_KEY"),
            option_env!("OMS_AUTO_CHECKOUT_KEY"),
        )
    }

    fn from_overrides(
        api_base_url: Option<&str>,
        token_key: Option<&str>,
        cart_key: Option<&str>,
        auto_checkout_key: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        let pick = |value: Option<&str>, fallback: String| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .unwrap_or(fallback)
        };

        Self {
            api_base_url: normalize_base_url(&pick(api_base_url, defaults.api_base_url)),
            keys: StorageKeys {
                token: pick(token_key, defaults.keys.token),
                cart: pick(cart_key, defaults.keys.cart),
                auto_checkout: pick(auto_checkout_key, defaults.keys.auto_checkout),
            },
            notice_timeout_ms: defaults.notice_timeout_ms,
        }
    }
}

/// 去掉末尾的 `/`，拼接路径时统一由路径提供前导 `/`
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = AppConfig::from_overrides(None, None, None, Some("  "));
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.keys.cart, "oms-cart");
    }

    #[test]
    fn overrides_are_applied_and_base_url_trimmed() {
        let config =
            AppConfig::from_overrides(Some("https://api.example.com/"), Some("jwt"), None, None);
        assert_eq!(config.api_base_url, "https://api.example.com");
        assert_eq!(config.keys.token, "jwt");
        assert_eq!(config.keys.auto_checkout, "oms-auto-checkout");
    }
}

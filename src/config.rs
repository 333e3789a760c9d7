//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `TYPER_ADMIN__*` 覆盖（双下划线表示嵌套，如 `TYPER_ADMIN__API__BASE_URL=...`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub auth: AuthSection,
    #[serde(default)]
    pub ui: UiSection,
}

/// [api] 段：后端地址与请求超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    /// 后端基础地址，开发环境默认本机
    pub base_url: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// [auth] 段：令牌持久化位置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    /// 单一令牌字符串的存放文件，登出或过期时清除
    pub token_file: PathBuf,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from("config/auth_token"),
        }
    }
}

/// [ui] 段：界面相关
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// 横幅自动消失时间（秒）
    pub banner_ttl_secs: u64,
}

impl Default for UiSection {
    fn default() -> Self {
        Self {
            banner_ttl_secs: default_banner_ttl(),
        }
    }
}

fn default_banner_ttl() -> u64 {
    5
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiSection::default(),
            auth: AuthSection::default(),
            ui: UiSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 TYPER_ADMIN__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 TYPER_ADMIN__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("TYPER_ADMIN")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.api.base_url, "http://localhost:8080");
        assert_eq!(cfg.api.request_timeout_secs, 30);
        assert_eq!(cfg.ui.banner_ttl_secs, 5);
        assert_eq!(cfg.auth.token_file, PathBuf::from("config/auth_token"));
    }
}

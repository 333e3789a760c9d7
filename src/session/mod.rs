//! 会话与令牌持久化
//!
//! Session 持有内存中的 Bearer 令牌；TokenStore 抽象持久化（文件 / 内存）。
//! 文件实现承担浏览器 localStorage 的角色：单一令牌字符串，登出或过期时清除，
//! 存在时每次启动静默复用。

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::AdminError;

/// 已认证管理员的会话：令牌在内存中的唯一落点
#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear(&mut self) {
        self.token = None;
    }
}

/// 令牌持久化接口
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// 读取持久化令牌；不存在或为空返回 None
    async fn load(&self) -> Option<String>;

    async fn save(&self, token: &str) -> Result<(), AdminError>;

    async fn clear(&self) -> Result<(), AdminError>;
}

/// 文件令牌存储：应用专属的单一令牌文件
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<String> {
        let raw = tokio::fs::read_to_string(&self.path).await.ok()?;
        let token = raw.trim();
        if token.is_empty() {
            return None;
        }
        Some(token.to_string())
    }

    async fn save(&self, token: &str) -> Result<(), AdminError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        tokio::fs::write(&self.path, token).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), AdminError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// 内存令牌存储（测试用）
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<Option<String>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Option<String> {
        self.inner.lock().unwrap().clone()
    }

    async fn save(&self, token: &str) -> Result<(), AdminError> {
        *self.inner.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), AdminError> {
        *self.inner.lock().unwrap() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("auth_token"));

        assert!(store.load().await.is_none());

        store.save("tok-123").await.unwrap();
        assert_eq!(store.load().await.as_deref(), Some("tok-123"));

        store.clear().await.unwrap();
        assert!(store.load().await.is_none());
        // 再次清除不报错
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_ignores_blank_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_token");
        tokio::fs::write(&path, "  \n").await.unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.load().await.is_none());
    }

    #[test]
    fn test_session_lifecycle() {
        let mut session = Session::new();
        assert!(!session.is_authenticated());

        session.set_token("tok".to_string());
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("tok"));

        session.clear();
        assert!(!session.is_authenticated());
        assert!(session.token().is_none());
    }
}

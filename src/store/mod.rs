//! 会话/集合状态容器
//!
//! AdminStore 取代环境全局量：令牌与两张集合缓存都挂在这里，更新只通过
//! 定义好的方法进行。缓存不是数据源：每次声明成功的变更调用之后列表
//! 整体重载替换，绝不做局部/乐观更新。

mod phrases;
mod stages;

use std::sync::Arc;

use crate::api::{AdminApi, LoginRequest, Theme, ROLE_ADMIN};
use crate::core::AdminError;
use crate::session::{Session, TokenStore};

pub use phrases::PhraseRow;
pub use stages::StageRow;

/// 管理控制台的状态容器：会话 + 主题/关卡/短语缓存
pub struct AdminStore {
    api: Arc<dyn AdminApi>,
    tokens: Arc<dyn TokenStore>,
    session: Session,
    themes: Vec<Theme>,
    stages: Vec<StageRow>,
    phrases: Vec<PhraseRow>,
    phrase_filter: Option<String>,
}

impl AdminStore {
    pub fn new(api: Arc<dyn AdminApi>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            api,
            tokens,
            session: Session::new(),
            themes: Vec::new(),
            stages: Vec::new(),
            phrases: Vec::new(),
            phrase_filter: None,
        }
    }

    /// 登录：凭证换令牌后立即取 profile 并要求 admin 角色（二次准入）。
    /// 凭证有效但角色不符同样以 Auth 失败；令牌只在门禁通过后才落内存与持久化。
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), AdminError> {
        let auth = self
            .api
            .login(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .await?;

        let is_admin = matches!(
            self.api.profile(&auth.access_token).await,
            Ok(profile) if profile.role == ROLE_ADMIN
        );
        if !is_admin {
            return Err(AdminError::Auth("Admin access required".to_string()));
        }

        self.session.set_token(auth.access_token.clone());
        if let Err(e) = self.tokens.save(&auth.access_token).await {
            // 持久化失败不阻断登录，仅丢掉跨次启动的免登录
            tracing::warn!("failed to persist token: {}", e);
        }
        Ok(())
    }

    /// 启动时静默复用持久化令牌：取 profile 校验有效性与角色；
    /// 失效或非管理员则隐式登出（清掉令牌文件），不产生错误
    pub async fn restore_session(&mut self) -> bool {
        let Some(token) = self.tokens.load().await else {
            return false;
        };
        match self.api.profile(&token).await {
            Ok(profile) if profile.role == ROLE_ADMIN => {
                tracing::info!("restored persisted admin session");
                self.session.set_token(token);
                true
            }
            _ => {
                tracing::info!("persisted token invalid, clearing");
                if let Err(e) = self.tokens.clear().await {
                    tracing::warn!("failed to clear token file: {}", e);
                }
                false
            }
        }
    }

    /// 登出：清内存令牌、清持久化文件、废弃缓存
    pub async fn logout(&mut self) {
        self.session.clear();
        if let Err(e) = self.tokens.clear().await {
            tracing::warn!("failed to clear token file: {}", e);
        }
        self.themes.clear();
        self.stages.clear();
        self.phrases.clear();
        self.phrase_filter = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn themes(&self) -> &[Theme] {
        &self.themes
    }

    pub fn stages(&self) -> &[StageRow] {
        &self.stages
    }

    pub fn phrases(&self) -> &[PhraseRow] {
        &self.phrases
    }

    pub fn phrase_filter(&self) -> Option<&String> {
        self.phrase_filter.as_ref()
    }

    pub fn set_phrase_filter(&mut self, filter: Option<String>) {
        self.phrase_filter = filter;
    }

    /// 当前令牌；未认证视作会话过期（走同一条回登录页的路径）
    pub(crate) fn bearer(&self) -> Result<String, AdminError> {
        self.session
            .token()
            .map(str::to_string)
            .ok_or(AdminError::SessionExpired)
    }

    pub(crate) fn api(&self) -> &Arc<dyn AdminApi> {
        &self.api
    }

    pub(crate) fn set_themes(&mut self, themes: Vec<Theme>) {
        self.themes = themes;
    }

    pub(crate) fn set_stages(&mut self, stages: Vec<StageRow>) {
        self.stages = stages;
    }

    pub(crate) fn set_phrases(&mut self, phrases: Vec<PhraseRow>) {
        self.phrases = phrases;
    }
}

//! Mock 后端（用于测试，无需真实服务）
//!
//! 内存中的单管理员账号与三张集合表；令牌为登录时签发的 uuid，
//! expire_session 置位后所有认证调用返回 401 语义（SessionExpired）。

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::api::traits::AdminApi;
use crate::api::types::{
    AuthResponse, Difficulty, LoginRequest, Phrase, PhraseDraft, Profile, Stage, StageDraft,
    Theme,
};
use crate::core::AdminError;

struct MockState {
    password: String,
    role: String,
    token: Option<String>,
    expired: bool,
    themes: Vec<Theme>,
    stages: Vec<Stage>,
    phrases: Vec<Phrase>,
}

/// Mock 客户端：固定用户名 admin，密码与 profile 角色可配置
pub struct MockAdminApi {
    state: Mutex<MockState>,
}

impl MockAdminApi {
    pub fn new(password: &str) -> Self {
        Self {
            state: Mutex::new(MockState {
                password: password.to_string(),
                role: "admin".to_string(),
                token: None,
                expired: false,
                themes: Vec::new(),
                stages: Vec::new(),
                phrases: Vec::new(),
            }),
        }
    }

    /// 设置 profile 返回的角色（验证二次准入时设为非 admin）
    pub fn set_role(&self, role: &str) {
        self.state.lock().unwrap().role = role.to_string();
    }

    /// 令当前令牌失效：后续所有认证调用返回 SessionExpired
    pub fn expire_session(&self) {
        self.state.lock().unwrap().expired = true;
    }

    /// 预置一个后端接受的令牌（模拟此前登录留下的持久化令牌）
    pub fn accept_token(&self, token: &str) {
        self.state.lock().unwrap().token = Some(token.to_string());
    }

    /// 最近签发的令牌
    pub fn issued_token(&self) -> Option<String> {
        self.state.lock().unwrap().token.clone()
    }

    pub fn seed_theme(&self, id: &str, name: &str) {
        self.state.lock().unwrap().themes.push(Theme {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
        });
    }

    pub fn seed_stage(
        &self,
        id: &str,
        name: &str,
        theme_id: &str,
        difficulty: Difficulty,
        is_active: bool,
    ) {
        self.state.lock().unwrap().stages.push(Stage {
            id: id.to_string(),
            name: name.to_string(),
            theme_id: theme_id.to_string(),
            difficulty,
            is_active,
        });
    }

    pub fn seed_phrase(&self, id: &str, stage_id: &str, text: &str, seq: i32, multiplier: f64) {
        self.state.lock().unwrap().phrases.push(Phrase {
            id: id.to_string(),
            stage_id: stage_id.to_string(),
            text: text.to_string(),
            sequence_number: seq,
            multiplier,
        });
    }

    fn check_token(state: &MockState, token: &str) -> Result<(), AdminError> {
        if state.expired || state.token.as_deref() != Some(token) {
            return Err(AdminError::SessionExpired);
        }
        Ok(())
    }
}

#[async_trait]
impl AdminApi for MockAdminApi {
    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, AdminError> {
        let mut state = self.state.lock().unwrap();
        if req.username != "admin" || req.password != state.password {
            return Err(AdminError::Auth("invalid credentials".to_string()));
        }
        let token = Uuid::new_v4().to_string();
        state.token = Some(token.clone());
        state.expired = false;
        Ok(AuthResponse {
            user_id: "u-admin".to_string(),
            username: Some("admin".to_string()),
            role: Some(state.role.clone()),
            access_token: token,
            token_expires_at: "2099-01-01T00:00:00Z".to_string(),
        })
    }

    async fn profile(&self, token: &str) -> Result<Profile, AdminError> {
        let state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        Ok(Profile {
            user_id: "u-admin".to_string(),
            username: "admin".to_string(),
            role: state.role.clone(),
        })
    }

    async fn list_themes(&self, token: &str) -> Result<Vec<Theme>, AdminError> {
        let state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        Ok(state.themes.clone())
    }

    async fn list_stages(&self, token: &str) -> Result<Vec<Stage>, AdminError> {
        let state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        Ok(state.stages.clone())
    }

    async fn create_stage(&self, token: &str, draft: &StageDraft) -> Result<(), AdminError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        let stage = Stage {
            id: Uuid::new_v4().to_string(),
            name: draft.name.clone(),
            theme_id: draft.theme_id.clone(),
            difficulty: draft.difficulty,
            is_active: draft.is_active,
        };
        state.stages.push(stage);
        Ok(())
    }

    async fn update_stage(
        &self,
        token: &str,
        id: &str,
        draft: &StageDraft,
    ) -> Result<(), AdminError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        let stage = state
            .stages
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AdminError::Api("stage not found".to_string()))?;
        stage.name = draft.name.clone();
        stage.theme_id = draft.theme_id.clone();
        stage.difficulty = draft.difficulty;
        stage.is_active = draft.is_active;
        Ok(())
    }

    async fn delete_stage(&self, token: &str, id: &str) -> Result<(), AdminError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        let pos = state
            .stages
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| AdminError::Api("stage not found".to_string()))?;
        state.stages.remove(pos);
        Ok(())
    }

    async fn list_phrases(&self, token: &str, stage_id: &str) -> Result<Vec<Phrase>, AdminError> {
        let state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        if stage_id.is_empty() {
            return Err(AdminError::Api("stage_id is required".to_string()));
        }
        Ok(state
            .phrases
            .iter()
            .filter(|p| p.stage_id == stage_id)
            .cloned()
            .collect())
    }

    async fn create_phrase(&self, token: &str, draft: &PhraseDraft) -> Result<(), AdminError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        let phrase = Phrase {
            id: Uuid::new_v4().to_string(),
            stage_id: draft.stage_id.clone(),
            text: draft.text.clone(),
            sequence_number: draft.sequence_number,
            multiplier: draft.base_multiplier,
        };
        state.phrases.push(phrase);
        Ok(())
    }

    async fn update_phrase(
        &self,
        token: &str,
        id: &str,
        draft: &PhraseDraft,
    ) -> Result<(), AdminError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        let phrase = state
            .phrases
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AdminError::Api("phrase not found".to_string()))?;
        phrase.stage_id = draft.stage_id.clone();
        phrase.text = draft.text.clone();
        phrase.sequence_number = draft.sequence_number;
        phrase.multiplier = draft.base_multiplier;
        Ok(())
    }

    async fn delete_phrase(&self, token: &str, id: &str) -> Result<(), AdminError> {
        let mut state = self.state.lock().unwrap();
        Self::check_token(&state, token)?;
        let pos = state
            .phrases
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| AdminError::Api("phrase not found".to_string()))?;
        state.phrases.remove(pos);
        Ok(())
    }
}

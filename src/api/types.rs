//! 数据传输对象：与后端 REST API 的请求 / 响应结构一一对应

use std::fmt;

use serde::{Deserialize, Serialize};

/// 管理界面要求的角色
pub const ROLE_ADMIN: &str = "admin";

/// POST /api/auth/login 请求体
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// 登录响应；客户端只消费 access_token，其余字段照后端契约建模
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub token_expires_at: String,
}

/// GET /api/auth/profile 响应：role 决定管理界面准入
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: String,
}

/// 主题：只读，用于关卡的归类与名称显示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 关卡难度：后端的固定取值集合
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// 表单里循环切换难度
    pub fn next(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            Difficulty::Hard => Difficulty::Easy,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Hard,
            Difficulty::Medium => Difficulty::Easy,
            Difficulty::Hard => Difficulty::Medium,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 关卡：theme_name 不在此结构上，列表重载时由客户端在内存中连接
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub theme_id: String,
    pub difficulty: Difficulty,
    pub is_active: bool,
}

/// 短语；服务端正在重命名乘数字段：列表/创建响应用 multiplier，存储名是
/// base_multiplier，解码两者都接受（优先 multiplier）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phrase {
    pub id: String,
    #[serde(default)]
    pub stage_id: String,
    pub text: String,
    pub sequence_number: i32,
    #[serde(alias = "base_multiplier")]
    pub multiplier: f64,
}

/// 关卡创建 / 更新请求体
#[derive(Debug, Clone, Serialize)]
pub struct StageDraft {
    pub name: String,
    pub theme_id: String,
    pub difficulty: Difficulty,
    pub is_active: bool,
}

/// 短语创建 / 更新请求体；请求侧后端绑定的字段名仍是 base_multiplier
#[derive(Debug, Clone, Serialize)]
pub struct PhraseDraft {
    pub stage_id: String,
    pub text: String,
    pub sequence_number: i32,
    pub base_multiplier: f64,
}

/// 错误响应体：error 字段原文作为用户可见消息
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phrase_accepts_both_multiplier_names() {
        let canonical: Phrase = serde_json::from_str(
            r#"{"id":"p1","stage_id":"s1","text":"hello","sequence_number":1,"multiplier":1.5}"#,
        )
        .unwrap();
        let legacy: Phrase = serde_json::from_str(
            r#"{"id":"p1","stage_id":"s1","text":"hello","sequence_number":1,"base_multiplier":1.5}"#,
        )
        .unwrap();
        assert_eq!(canonical.multiplier, 1.5);
        assert_eq!(legacy.multiplier, 1.5);
        assert_eq!(canonical, legacy);
    }

    #[test]
    fn test_phrase_draft_sends_numbers_under_request_names() {
        let draft = PhraseDraft {
            stage_id: "s1".to_string(),
            text: "hello".to_string(),
            sequence_number: 1,
            base_multiplier: 1.5,
        };
        let v = serde_json::to_value(&draft).unwrap();
        assert_eq!(v["sequence_number"], serde_json::json!(1));
        assert_eq!(v["base_multiplier"], serde_json::json!(1.5));
        assert!(v.get("multiplier").is_none());
    }

    #[test]
    fn test_difficulty_wire_format() {
        assert_eq!(
            serde_json::to_value(Difficulty::Easy).unwrap(),
            serde_json::json!("easy")
        );
        let d: Difficulty = serde_json::from_str("\"hard\"").unwrap();
        assert_eq!(d, Difficulty::Hard);
    }

    #[test]
    fn test_stage_tolerates_server_side_annotations() {
        // 列表响应可能带 theme_name / phrases 等附加字段，客户端忽略并自行连接
        let s: Stage = serde_json::from_str(
            r#"{"id":"s1","name":"One","theme_id":"t1","theme_name":"Space","difficulty":"easy","is_active":true}"#,
        )
        .unwrap();
        assert_eq!(s.theme_id, "t1");
        assert!(s.is_active);
    }
}

//! 视图模型：状态 → 可渲染数据的纯函数与表单状态机
//!
//! 这里不依赖任何终端类型，表格行、下拉标签、横幅可见性与表单
//! 预填/解析全部可以脱离 TUI 做快照测试；render 层只负责把这些
//! 数据画出来。

use std::time::Instant;

use crate::api::{Difficulty, PhraseDraft, StageDraft, Theme};
use crate::core::{Banner, UiState};
use crate::store::{PhraseRow, StageRow};

pub const NO_STAGES: &str = "No stages found";
pub const NO_PHRASES: &str = "No phrases found";

/// 横幅可见性：超过 banner_ttl 自动不再渲染
pub fn active_banner(state: &UiState, now: Instant) -> Option<&Banner> {
    state
        .banner
        .as_ref()
        .filter(|b| now.duration_since(b.shown_at) < state.banner_ttl)
}

/// 关卡表格行：名称 / 主题名 / 难度 / 启用状态
pub fn stage_rows(state: &UiState) -> Vec<[String; 4]> {
    state
        .stages
        .iter()
        .map(|row| {
            [
                row.stage.name.clone(),
                row.theme_name.clone(),
                row.stage.difficulty.to_string(),
                if row.stage.is_active {
                    "Active".to_string()
                } else {
                    "Inactive".to_string()
                },
            ]
        })
        .collect()
}

/// 短语表格行：关卡名 / 文本 / 序号 / 乘数
pub fn phrase_rows(state: &UiState) -> Vec<[String; 4]> {
    state
        .phrases
        .iter()
        .map(|row| {
            [
                row.stage_name.clone(),
                row.phrase.text.clone(),
                row.phrase.sequence_number.to_string(),
                row.phrase.multiplier.to_string(),
            ]
        })
        .collect()
}

/// 主题下拉选项
pub fn theme_options(themes: &[Theme]) -> Vec<String> {
    themes.iter().map(|t| t.name.clone()).collect()
}

/// 关卡下拉选项：`名称 (难度)`
pub fn stage_options(stages: &[StageRow]) -> Vec<String> {
    stages
        .iter()
        .map(|r| format!("{} ({})", r.stage.name, r.stage.difficulty))
        .collect()
}

/// 当前短语过滤的显示标签
pub fn phrase_filter_label(state: &UiState) -> String {
    match &state.phrase_filter {
        None => "All Stages".to_string(),
        Some(id) => state
            .stages
            .iter()
            .find(|r| r.stage.id == *id)
            .map(|r| r.stage.name.clone())
            .unwrap_or_else(|| id.clone()),
    }
}

/// f 键循环过滤：全部 → 第一个关卡 → … → 最后一个关卡 → 全部
pub fn next_phrase_filter(state: &UiState) -> Option<String> {
    let ids: Vec<&str> = state.stages.iter().map(|r| r.stage.id.as_str()).collect();
    match &state.phrase_filter {
        None => ids.first().map(|id| id.to_string()),
        Some(cur) => match ids.iter().position(|id| id == cur) {
            Some(i) if i + 1 < ids.len() => Some(ids[i + 1].to_string()),
            _ => None,
        },
    }
}

/// 表单模式：显式的判别变体，取代「当前编辑 id」一类的散落标志
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Create,
    Edit {
        target_id: String,
    },
}

impl FormMode {
    pub fn target(&self) -> Option<String> {
        match self {
            FormMode::Create => None,
            FormMode::Edit { target_id } => Some(target_id.clone()),
        }
    }
}

fn cycle_index(cur: Option<usize>, len: usize, dir: i32) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as i32;
    let cur = cur.unwrap_or(0) as i32;
    Some((((cur + dir) % len + len) % len) as usize)
}

/// 登录表单焦点
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginField {
    #[default]
    Username,
    Password,
    Submit,
}

/// 登录表单：两个文本缓冲 + 焦点
#[derive(Clone, Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
}

impl LoginForm {
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Submit,
            LoginField::Submit => LoginField::Username,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            LoginField::Username => LoginField::Submit,
            LoginField::Password => LoginField::Username,
            LoginField::Submit => LoginField::Password,
        };
    }

    pub fn input(&mut self, c: char) {
        match self.focus {
            LoginField::Username => self.username.push(c),
            LoginField::Password => self.password.push(c),
            LoginField::Submit => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            LoginField::Username => {
                self.username.pop();
            }
            LoginField::Password => {
                self.password.pop();
            }
            LoginField::Submit => {}
        }
    }
}

/// 关卡表单焦点
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StageField {
    #[default]
    Name,
    Theme,
    Difficulty,
    Active,
    Submit,
}

/// 关卡表单：创建与编辑共用，Edit 模式预填目标行
#[derive(Clone, Debug)]
pub struct StageForm {
    pub mode: FormMode,
    pub name: String,
    /// 指向 UiState.themes 的下标；主题列表为空时为 None
    pub theme_index: Option<usize>,
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub focus: StageField,
}

impl StageForm {
    pub fn create(themes: &[Theme]) -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            theme_index: if themes.is_empty() { None } else { Some(0) },
            difficulty: Difficulty::Easy,
            is_active: true,
            focus: StageField::Name,
        }
    }

    pub fn edit(row: &StageRow, themes: &[Theme]) -> Self {
        Self {
            mode: FormMode::Edit {
                target_id: row.stage.id.clone(),
            },
            name: row.stage.name.clone(),
            theme_index: themes.iter().position(|t| t.id == row.stage.theme_id),
            difficulty: row.stage.difficulty,
            is_active: row.stage.is_active,
            focus: StageField::Name,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Stage",
            FormMode::Edit { .. } => "Edit Stage",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create Stage",
            FormMode::Edit { .. } => "Update Stage",
        }
    }

    pub fn target(&self) -> Option<String> {
        self.mode.target()
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            StageField::Name => StageField::Theme,
            StageField::Theme => StageField::Difficulty,
            StageField::Difficulty => StageField::Active,
            StageField::Active => StageField::Submit,
            StageField::Submit => StageField::Name,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            StageField::Name => StageField::Submit,
            StageField::Theme => StageField::Name,
            StageField::Difficulty => StageField::Theme,
            StageField::Active => StageField::Difficulty,
            StageField::Submit => StageField::Active,
        };
    }

    /// 文本字段收字符；选择字段上空格等同向右调整
    pub fn input(&mut self, c: char, themes_len: usize) {
        match self.focus {
            StageField::Name => self.name.push(c),
            _ if c == ' ' => self.adjust(1, themes_len),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        if self.focus == StageField::Name {
            self.name.pop();
        }
    }

    /// 左右键调整选择字段
    pub fn adjust(&mut self, dir: i32, themes_len: usize) {
        match self.focus {
            StageField::Theme => self.theme_index = cycle_index(self.theme_index, themes_len, dir),
            StageField::Difficulty => {
                self.difficulty = if dir >= 0 {
                    self.difficulty.next()
                } else {
                    self.difficulty.prev()
                };
            }
            StageField::Active => self.is_active = !self.is_active,
            _ => {}
        }
    }

    pub fn draft(&self, themes: &[Theme]) -> Result<StageDraft, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("Name is required".to_string());
        }
        let theme = self
            .theme_index
            .and_then(|i| themes.get(i))
            .ok_or_else(|| "Select a theme".to_string())?;
        Ok(StageDraft {
            name: name.to_string(),
            theme_id: theme.id.clone(),
            difficulty: self.difficulty,
            is_active: self.is_active,
        })
    }
}

/// 短语表单焦点
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PhraseField {
    #[default]
    Stage,
    Text,
    Sequence,
    Multiplier,
    Submit,
}

/// 短语表单：数字字段保持文本缓冲，提交时解析为数字发送
#[derive(Clone, Debug)]
pub struct PhraseForm {
    pub mode: FormMode,
    /// 指向 UiState.stages 的下标；关卡列表为空时为 None
    pub stage_index: Option<usize>,
    pub text: String,
    pub sequence: String,
    pub multiplier: String,
    pub focus: PhraseField,
}

impl PhraseForm {
    pub fn create(stages: &[StageRow]) -> Self {
        Self {
            mode: FormMode::Create,
            stage_index: if stages.is_empty() { None } else { Some(0) },
            text: String::new(),
            sequence: String::new(),
            multiplier: String::new(),
            focus: PhraseField::Stage,
        }
    }

    pub fn edit(row: &PhraseRow, stages: &[StageRow]) -> Self {
        Self {
            mode: FormMode::Edit {
                target_id: row.phrase.id.clone(),
            },
            stage_index: stages
                .iter()
                .position(|r| r.stage.id == row.phrase.stage_id),
            text: row.phrase.text.clone(),
            sequence: row.phrase.sequence_number.to_string(),
            multiplier: row.phrase.multiplier.to_string(),
            focus: PhraseField::Text,
        }
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Phrase",
            FormMode::Edit { .. } => "Edit Phrase",
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create Phrase",
            FormMode::Edit { .. } => "Update Phrase",
        }
    }

    pub fn target(&self) -> Option<String> {
        self.mode.target()
    }

    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            PhraseField::Stage => PhraseField::Text,
            PhraseField::Text => PhraseField::Sequence,
            PhraseField::Sequence => PhraseField::Multiplier,
            PhraseField::Multiplier => PhraseField::Submit,
            PhraseField::Submit => PhraseField::Stage,
        };
    }

    pub fn focus_prev(&mut self) {
        self.focus = match self.focus {
            PhraseField::Stage => PhraseField::Submit,
            PhraseField::Text => PhraseField::Stage,
            PhraseField::Sequence => PhraseField::Text,
            PhraseField::Multiplier => PhraseField::Sequence,
            PhraseField::Submit => PhraseField::Multiplier,
        };
    }

    pub fn input(&mut self, c: char, stages_len: usize) {
        match self.focus {
            PhraseField::Text => self.text.push(c),
            PhraseField::Sequence => self.sequence.push(c),
            PhraseField::Multiplier => self.multiplier.push(c),
            PhraseField::Stage if c == ' ' => self.adjust(1, stages_len),
            _ => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            PhraseField::Text => {
                self.text.pop();
            }
            PhraseField::Sequence => {
                self.sequence.pop();
            }
            PhraseField::Multiplier => {
                self.multiplier.pop();
            }
            _ => {}
        }
    }

    pub fn adjust(&mut self, dir: i32, stages_len: usize) {
        if self.focus == PhraseField::Stage {
            self.stage_index = cycle_index(self.stage_index, stages_len, dir);
        }
    }

    pub fn draft(&self, stages: &[StageRow]) -> Result<PhraseDraft, String> {
        let stage = self
            .stage_index
            .and_then(|i| stages.get(i))
            .ok_or_else(|| "Select a stage".to_string())?;
        let text = self.text.trim();
        if text.is_empty() {
            return Err("Text is required".to_string());
        }
        let sequence_number: i32 = self
            .sequence
            .trim()
            .parse()
            .map_err(|_| "Sequence must be a whole number".to_string())?;
        let base_multiplier: f64 = self
            .multiplier
            .trim()
            .parse()
            .map_err(|_| "Multiplier must be a number".to_string())?;
        Ok(PhraseDraft {
            stage_id: stage.stage.id.clone(),
            text: text.to_string(),
            sequence_number,
            base_multiplier,
        })
    }
}

/// 删除确认的目标
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeleteTarget {
    Stage(String),
    Phrase(String),
}

/// 主界面交互模式：浏览 / 关卡表单 / 短语表单 / 删除确认
#[derive(Clone, Debug, Default)]
pub enum Mode {
    #[default]
    Browse,
    StageForm(StageForm),
    PhraseForm(PhraseForm),
    Confirm(DeleteTarget),
}

/// UI 本地状态：登录表单、交互模式与表格选中行（数据状态都在 UiState）
#[derive(Debug, Default)]
pub struct LocalUi {
    pub login: LoginForm,
    pub mode: Mode,
    pub stage_sel: usize,
    pub phrase_sel: usize,
}

/// 确认框文案
pub fn confirm_text(target: &DeleteTarget) -> &'static str {
    match target {
        DeleteTarget::Stage(_) => "Are you sure you want to delete this stage?",
        DeleteTarget::Phrase(_) => "Are you sure you want to delete this phrase?",
    }
}

//! 状态定义：UiState 投影
//!
//! UI 只持有轻量的投影状态（屏幕、标签页、缓存行、横幅、登录错误、请求中标记）；
//! 完整状态由控制循环维护并在每条命令处理后投影到 UiState。

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::api::Theme;
use crate::store::{PhraseRow, StageRow};

/// 当前屏幕：登录页或主界面
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Screen {
    Login,
    Main,
}

/// 主界面的标签页，同一时刻恰有一个激活
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Tab {
    Stages,
    Phrases,
}

impl Tab {
    /// Tab 键在两个标签页之间切换
    pub fn other(self) -> Self {
        match self {
            Tab::Stages => Tab::Phrases,
            Tab::Phrases => Tab::Stages,
        }
    }
}

/// 横幅：操作结果的瞬态提示，超过 banner_ttl 后不再渲染
#[derive(Clone, Debug, Serialize)]
pub struct Banner {
    pub text: String,
    pub is_error: bool,
    #[serde(skip)]
    pub shown_at: Instant,
}

impl Banner {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        }
    }
}

/// UI 看到的「投影」状态，轻量且易于渲染
#[derive(Clone, Debug, Serialize)]
pub struct UiState {
    pub screen: Screen,
    pub tab: Tab,
    /// 主题缓存（只读，用于关卡表单的主题选择与名称连接）
    pub themes: Vec<Theme>,
    /// 关卡缓存，每次列表重载整体替换
    pub stages: Vec<StageRow>,
    /// 短语缓存，每次列表重载整体替换
    pub phrases: Vec<PhraseRow>,
    /// 短语列表的关卡过滤（None 表示全部关卡）
    pub phrase_filter: Option<String>,
    pub banner: Option<Banner>,
    pub banner_ttl: Duration,
    /// 登录表单内联错误（含会话过期提示）
    pub login_error: Option<String>,
    /// 正在处理命令时锁定输入
    pub pending: bool,
    /// 每处理完一条命令递增，UI 以此判断提交是否已完成
    pub op_seq: u64,
    /// 最近一次操作是否成功（决定表单提交后是否关闭表单）
    pub last_op_ok: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            screen: Screen::Login,
            tab: Tab::Stages,
            themes: Vec::new(),
            stages: Vec::new(),
            phrases: Vec::new(),
            phrase_filter: None,
            banner: None,
            banner_ttl: Duration::from_secs(5),
            login_error: None,
            pending: false,
            op_seq: 0,
            last_op_ok: true,
        }
    }
}

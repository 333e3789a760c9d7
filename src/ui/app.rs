//! TUI 应用主循环
//!
//! 进入全屏/原始模式，轮询 state_rx 与键盘事件，按屏幕与交互模式把按键
//! 转为 Command 发送给控制循环，每帧用 draw 渲染 UiState 与本地输入状态。
//! 数据状态全部在 UiState；本地只保留表单缓冲与表格选中行。

use std::io::{self, Stdout};

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};

use crate::core::{Command, Screen, Tab, UiState};
use crate::store::PhraseRow;
use crate::ui::event::{AppEvent, EventHandler};
use crate::ui::render::draw;
use crate::ui::view::{self, DeleteTarget, LocalUi, Mode, PhraseForm, StageForm};

/// 运行 TUI：启用原始模式与全屏，循环 poll 事件 + 渲染，退出时恢复终端
pub async fn run_app(
    state_rx: watch::Receiver<UiState>,
    cmd_tx: mpsc::UnboundedSender<Command>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new(cmd_tx);
    let mut local = LocalUi::default();
    let mut prev_screen = Screen::Login;
    // 已发送、等待控制循环处理完的表单提交（op_seq 快照）
    let mut pending_submit: Option<u64> = None;

    loop {
        let state = state_rx.borrow().clone();

        // 屏幕切换（登录成功 / 登出 / 会话过期）时重置本地输入状态
        if state.screen != prev_screen {
            prev_screen = state.screen;
            local = LocalUi::default();
            pending_submit = None;
        }

        // 表单提交完成：成功关闭表单，失败保留输入供修正
        if let Some(seq) = pending_submit {
            if state.op_seq > seq {
                if state.last_op_ok {
                    local.mode = Mode::Browse;
                }
                pending_submit = None;
            }
        }

        local.stage_sel = local.stage_sel.min(state.stages.len().saturating_sub(1));
        local.phrase_sel = local.phrase_sel.min(state.phrases.len().saturating_sub(1));

        if let Ok(Some(ev)) = events.poll() {
            match ev {
                AppEvent::Command(cmd) => {
                    if matches!(cmd, Command::Quit) {
                        break;
                    }
                }
                AppEvent::Key(key) if !state.pending && pending_submit.is_none() => {
                    match state.screen {
                        Screen::Login => handle_login_key(key, &mut local, &events),
                        Screen::Main => {
                            if handle_main_key(key, &state, &mut local, &events) {
                                pending_submit = Some(state.op_seq);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        terminal.draw(|f| draw(f, &state, &local))?;
        tokio::task::yield_now().await;
    }

    restore_terminal(&mut terminal)?;
    Ok(())
}

fn handle_login_key(key: KeyEvent, local: &mut LocalUi, events: &EventHandler) {
    match key.code {
        KeyCode::Tab => local.login.focus_next(),
        KeyCode::BackTab => local.login.focus_prev(),
        KeyCode::Enter => {
            let username = local.login.username.trim().to_string();
            if username.is_empty() {
                return;
            }
            events.send(Command::Login {
                username,
                password: local.login.password.clone(),
            });
        }
        KeyCode::Backspace => local.login.backspace(),
        KeyCode::Char(c) => local.login.input(c),
        _ => {}
    }
}

/// 主界面按键分发；返回是否发送了需要等待结果的表单提交
fn handle_main_key(
    key: KeyEvent,
    state: &UiState,
    local: &mut LocalUi,
    events: &EventHandler,
) -> bool {
    // Esc 统一取消表单 / 确认框：只恢复创建模式，不发任何请求
    if key.code == KeyCode::Esc {
        local.mode = Mode::Browse;
        return false;
    }

    let mut submitted = false;
    let mut next_mode: Option<Mode> = None;

    match &mut local.mode {
        Mode::Browse => match key.code {
            KeyCode::Char('1') => events.send(Command::SwitchTab(Tab::Stages)),
            KeyCode::Char('2') => events.send(Command::SwitchTab(Tab::Phrases)),
            KeyCode::Tab => events.send(Command::SwitchTab(state.tab.other())),
            KeyCode::Up => match state.tab {
                Tab::Stages => local.stage_sel = local.stage_sel.saturating_sub(1),
                Tab::Phrases => local.phrase_sel = local.phrase_sel.saturating_sub(1),
            },
            KeyCode::Down => match state.tab {
                Tab::Stages => {
                    local.stage_sel =
                        (local.stage_sel + 1).min(state.stages.len().saturating_sub(1));
                }
                Tab::Phrases => {
                    local.phrase_sel =
                        (local.phrase_sel + 1).min(state.phrases.len().saturating_sub(1));
                }
            },
            KeyCode::Char('n') => {
                next_mode = Some(match state.tab {
                    Tab::Stages => Mode::StageForm(StageForm::create(&state.themes)),
                    Tab::Phrases => Mode::PhraseForm(PhraseForm::create(&state.stages)),
                });
            }
            KeyCode::Char('e') => {
                next_mode = match state.tab {
                    Tab::Stages => state
                        .stages
                        .get(local.stage_sel)
                        .map(|row| Mode::StageForm(StageForm::edit(row, &state.themes))),
                    Tab::Phrases => state
                        .phrases
                        .get(local.phrase_sel)
                        .map(|row| begin_phrase_edit(row, state, events)),
                };
            }
            KeyCode::Char('d') => {
                next_mode = match state.tab {
                    Tab::Stages => state
                        .stages
                        .get(local.stage_sel)
                        .map(|row| Mode::Confirm(DeleteTarget::Stage(row.stage.id.clone()))),
                    Tab::Phrases => state
                        .phrases
                        .get(local.phrase_sel)
                        .map(|row| Mode::Confirm(DeleteTarget::Phrase(row.phrase.id.clone()))),
                };
            }
            KeyCode::Char('r') => events.send(Command::Reload),
            KeyCode::Char('f') if state.tab == Tab::Phrases => {
                events.send(Command::SetPhraseFilter(view::next_phrase_filter(state)));
            }
            KeyCode::Char('o') => events.send(Command::Logout),
            _ => {}
        },

        Mode::StageForm(form) => match key.code {
            KeyCode::Tab => form.focus_next(),
            KeyCode::BackTab => form.focus_prev(),
            KeyCode::Enter => match form.draft(&state.themes) {
                Ok(draft) => {
                    events.send(Command::SaveStage {
                        target: form.target(),
                        draft,
                    });
                    submitted = true;
                }
                Err(msg) => events.send(Command::ShowError(msg)),
            },
            KeyCode::Backspace => form.backspace(),
            KeyCode::Left => form.adjust(-1, state.themes.len()),
            KeyCode::Right => form.adjust(1, state.themes.len()),
            KeyCode::Char(c) => form.input(c, state.themes.len()),
            _ => {}
        },

        Mode::PhraseForm(form) => match key.code {
            KeyCode::Tab => form.focus_next(),
            KeyCode::BackTab => form.focus_prev(),
            KeyCode::Enter => match form.draft(&state.stages) {
                Ok(draft) => {
                    events.send(Command::SavePhrase {
                        target: form.target(),
                        draft,
                    });
                    submitted = true;
                }
                Err(msg) => events.send(Command::ShowError(msg)),
            },
            KeyCode::Backspace => form.backspace(),
            KeyCode::Left => form.adjust(-1, state.stages.len()),
            KeyCode::Right => form.adjust(1, state.stages.len()),
            KeyCode::Char(c) => form.input(c, state.stages.len()),
            _ => {}
        },

        Mode::Confirm(target) => match key.code {
            KeyCode::Char('y') => {
                match target {
                    DeleteTarget::Stage(id) => events.send(Command::DeleteStage(id.clone())),
                    DeleteTarget::Phrase(id) => events.send(Command::DeletePhrase(id.clone())),
                }
                next_mode = Some(Mode::Browse);
            }
            KeyCode::Char('n') => next_mode = Some(Mode::Browse),
            _ => {}
        },
    }

    if let Some(mode) = next_mode {
        local.mode = mode;
    }
    submitted
}

/// 进入短语编辑：无论从何处发起都把视图切到短语标签页
fn begin_phrase_edit(row: &PhraseRow, state: &UiState, events: &EventHandler) -> Mode {
    if state.tab != Tab::Phrases {
        events.send(Command::SwitchTab(Tab::Phrases));
    }
    Mode::PhraseForm(PhraseForm::edit(row, &state.stages))
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

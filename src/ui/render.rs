//! 界面渲染
//!
//! 把 view 层给出的视图模型画到终端：登录页为居中表单；主界面为
//! 标签栏 + 横幅 + 表格/侧栏 + 快捷键提示，删除确认以浮层显示。
//! 错误横幅与登录错误用红色边框/文字，与加载中状态一同反映在标题栏。

use std::time::Instant;

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame,
};

use crate::core::{Screen, Tab, UiState};
use crate::ui::view::{self, LocalUi, LoginField, Mode, PhraseField, StageField};

/// 绘制一帧：按屏幕分发
pub fn draw(f: &mut Frame, state: &UiState, local: &LocalUi) {
    match state.screen {
        Screen::Login => draw_login(f, state, local),
        Screen::Main => draw_main(f, state, local),
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);
    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1])[1]
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn draw_login(f: &mut Frame, state: &UiState, local: &LocalUi) {
    let area = centered_rect(52, 62, f.area());
    let outer = Block::default()
        .title(" Typer Admin │ 管理员登录 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .split(inner);

    let form = &local.login;

    let username = Paragraph::new(form.username.as_str()).block(
        Block::default()
            .title(" 用户名 ")
            .borders(Borders::ALL)
            .border_style(focus_style(form.focus == LoginField::Username)),
    );
    f.render_widget(username, chunks[0]);

    let masked: String = "•".repeat(form.password.chars().count());
    let password = Paragraph::new(masked).block(
        Block::default()
            .title(" 密码 ")
            .borders(Borders::ALL)
            .border_style(focus_style(form.focus == LoginField::Password)),
    );
    f.render_widget(password, chunks[1]);

    let submit_text = if state.pending { "  登录中…" } else { "  [ Login ]" };
    let submit = Paragraph::new(submit_text).style(focus_style(form.focus == LoginField::Submit));
    f.render_widget(submit, chunks[2]);

    // 凭证错误 / 非管理员 / 会话过期的内联提示
    if let Some(err) = &state.login_error {
        let error = Paragraph::new(err.as_str())
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(error, chunks[3]);
    }

    let hint = Paragraph::new(" Tab 切换 │ Enter 登录 │ Ctrl+Q 退出 ")
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, chunks[5]);
}

fn draw_main(f: &mut Frame, state: &UiState, local: &LocalUi) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
    ])
    .split(f.area());

    draw_tabs(f, chunks[0], state);
    draw_banner(f, chunks[1], state);

    let body = Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(chunks[2]);
    match state.tab {
        Tab::Stages => draw_stage_table(f, body[0], state, local.stage_sel),
        Tab::Phrases => draw_phrase_table(f, body[0], state, local.phrase_sel),
    }
    draw_side_panel(f, body[1], state, local);

    let hint = Paragraph::new(hint_for(state, local)).style(Style::default().fg(Color::DarkGray));
    f.render_widget(hint, chunks[3]);

    if let Mode::Confirm(target) = &local.mode {
        draw_confirm(f, target);
    }
}

fn draw_tabs(f: &mut Frame, area: Rect, state: &UiState) {
    let status = if state.pending { "请求中…" } else { "就绪" };
    let tabs = Tabs::new(vec!["关卡", "短语"])
        .select(match state.tab {
            Tab::Stages => 0,
            Tab::Phrases => 1,
        })
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .title(format!(" Typer Admin │ {} ", status))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
    f.render_widget(tabs, area);
}

fn draw_banner(f: &mut Frame, area: Rect, state: &UiState) {
    if let Some(banner) = view::active_banner(state, Instant::now()) {
        let color = if banner.is_error { Color::Red } else { Color::Green };
        let line = Paragraph::new(format!(" {} ", banner.text))
            .style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        f.render_widget(line, area);
    }
}

fn draw_stage_table(f: &mut Frame, area: Rect, state: &UiState, selected: usize) {
    let block = Block::default().title(" 关卡 ").borders(Borders::ALL);
    let rows = view::stage_rows(state);
    if rows.is_empty() {
        f.render_widget(Paragraph::new(view::NO_STAGES).block(block), area);
        return;
    }

    let table = Table::new(
        rows.into_iter().map(Row::new),
        [
            Constraint::Percentage(32),
            Constraint::Percentage(28),
            Constraint::Percentage(20),
            Constraint::Percentage(20),
        ],
    )
    .header(
        Row::new(["Name", "Theme", "Difficulty", "Status"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("› ");

    let mut table_state = TableState::default();
    table_state.select(Some(selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_phrase_table(f: &mut Frame, area: Rect, state: &UiState, selected: usize) {
    let title = format!(" 短语 │ 过滤: {} ", view::phrase_filter_label(state));
    let block = Block::default().title(title).borders(Borders::ALL);
    let rows = view::phrase_rows(state);
    if rows.is_empty() {
        f.render_widget(Paragraph::new(view::NO_PHRASES).block(block), area);
        return;
    }

    let table = Table::new(
        rows.into_iter().map(Row::new),
        [
            Constraint::Percentage(24),
            Constraint::Percentage(44),
            Constraint::Percentage(14),
            Constraint::Percentage(18),
        ],
    )
    .header(
        Row::new(["Stage", "Text", "Seq", "Multiplier"])
            .style(Style::default().add_modifier(Modifier::BOLD)),
    )
    .block(block)
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("› ");

    let mut table_state = TableState::default();
    table_state.select(Some(selected));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn draw_side_panel(f: &mut Frame, area: Rect, state: &UiState, local: &LocalUi) {
    match &local.mode {
        Mode::StageForm(form) => {
            let themes = view::theme_options(&state.themes);
            let theme_value = form
                .theme_index
                .and_then(|i| themes.get(i).cloned())
                .unwrap_or_else(|| "—".to_string());
            let lines = vec![
                field_line("名称", form.name.clone(), form.focus == StageField::Name),
                field_line("主题", theme_value, form.focus == StageField::Theme),
                field_line(
                    "难度",
                    form.difficulty.to_string(),
                    form.focus == StageField::Difficulty,
                ),
                field_line(
                    "启用",
                    if form.is_active { "[x] Active" } else { "[ ] Inactive" }.to_string(),
                    form.focus == StageField::Active,
                ),
                Line::from(""),
                submit_line(form.submit_label(), form.focus == StageField::Submit),
            ];
            let block = Block::default()
                .title(format!(" {} ", form.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue));
            f.render_widget(Paragraph::new(lines).block(block), area);
        }
        Mode::PhraseForm(form) => {
            let stages = view::stage_options(&state.stages);
            let stage_value = form
                .stage_index
                .and_then(|i| stages.get(i).cloned())
                .unwrap_or_else(|| "—".to_string());
            let lines = vec![
                field_line("关卡", stage_value, form.focus == PhraseField::Stage),
                field_line("文本", form.text.clone(), form.focus == PhraseField::Text),
                field_line(
                    "序号",
                    form.sequence.clone(),
                    form.focus == PhraseField::Sequence,
                ),
                field_line(
                    "乘数",
                    form.multiplier.clone(),
                    form.focus == PhraseField::Multiplier,
                ),
                Line::from(""),
                submit_line(form.submit_label(), form.focus == PhraseField::Submit),
            ];
            let block = Block::default()
                .title(format!(" {} ", form.title()))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue));
            f.render_widget(Paragraph::new(lines).block(block), area);
        }
        Mode::Browse | Mode::Confirm(_) => {
            let lines = vec![
                Line::from("n  新建记录"),
                Line::from("e  编辑选中行"),
                Line::from("d  删除选中行（需确认）"),
                Line::from("r  重新加载当前列表"),
            ];
            let block = Block::default().title(" 操作 ").borders(Borders::ALL);
            f.render_widget(
                Paragraph::new(lines)
                    .style(Style::default().fg(Color::Gray))
                    .block(block),
                area,
            );
        }
    }
}

fn field_line(label: &str, value: String, focused: bool) -> Line<'static> {
    let style = focus_style(focused);
    Line::from(vec![
        Span::styled(if focused { "▸ " } else { "  " }.to_string(), style),
        Span::styled(format!("{}: ", label), style),
        Span::styled(value, style),
    ])
}

fn submit_line(label: &str, focused: bool) -> Line<'static> {
    Line::from(Span::styled(
        format!("  [ {} ]", label),
        focus_style(focused),
    ))
}

fn draw_confirm(f: &mut Frame, target: &view::DeleteTarget) {
    let area = centered_rect(46, 20, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(" 确认删除 ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red));
    let text = format!("{}\n\n  y 确认 │ n/Esc 取消", view::confirm_text(target));
    f.render_widget(
        Paragraph::new(text).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

fn hint_for(state: &UiState, local: &LocalUi) -> &'static str {
    match &local.mode {
        Mode::Browse => match state.tab {
            Tab::Stages => {
                " 1/2 或 Tab 切换标签 │ ↑↓ 选择 │ n 新建 │ e 编辑 │ d 删除 │ r 刷新 │ o 退出登录 │ Ctrl+Q 退出 "
            }
            Tab::Phrases => {
                " 1/2 或 Tab 切换标签 │ ↑↓ 选择 │ n 新建 │ e 编辑 │ d 删除 │ f 过滤 │ r 刷新 │ o 退出登录 │ Ctrl+Q 退出 "
            }
        },
        Mode::StageForm(_) | Mode::PhraseForm(_) => {
            " Tab 切换字段 │ ←→/空格 调整选项 │ Enter 提交 │ Esc 取消 "
        }
        Mode::Confirm(_) => " y 确认删除 │ n/Esc 取消 ",
    }
}

// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use folio_app::{
    CatalogCommand, CatalogEvent, CatalogState, Column, Page, PreselectOutcome, RequestId,
    SourceUnavailable,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const CHECKED: &str = "[x]";
const UNCHECKED: &str = "[ ]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    PageFetched {
        request_id: RequestId,
        result: Result<Page, SourceUnavailable>,
    },
    PreselectFinished {
        request_id: RequestId,
        outcome: PreselectOutcome,
    },
    ClearStatus {
        token: u64,
    },
}

/// Where page fetches and preselect walks actually run. The default spawn
/// methods run inline and report through the channel; runtimes backed by a
/// network source override them to run on worker threads.
pub trait CatalogRuntime {
    fn fetch_page(&mut self, page: u32) -> Result<Page, SourceUnavailable>;
    fn collect_first(&mut self, target: i64) -> PreselectOutcome;

    fn spawn_fetch(
        &mut self,
        request_id: RequestId,
        page: u32,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let result = self.fetch_page(page);
        tx.send(InternalEvent::PageFetched { request_id, result })
            .map_err(|_| anyhow::anyhow!("catalog event channel closed"))?;
        Ok(())
    }

    fn spawn_preselect(
        &mut self,
        request_id: RequestId,
        target: i64,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let outcome = self.collect_first(target);
        tx.send(InternalEvent::PreselectFinished {
            request_id,
            outcome,
        })
        .map_err(|_| anyhow::anyhow!("catalog event channel closed"))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct BulkPromptState {
    visible: bool,
    input: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ViewData {
    cursor: usize,
    prompt: BulkPromptState,
    help_visible: bool,
    status_token: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    MoveCursor(isize),
    ToggleRow,
    SelectPage,
    DeselectPage,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    Reload,
    OpenBulkPrompt,
    ClearSelection,
    ToggleHelp,
}

pub fn run_app<R: CatalogRuntime>(
    state: &mut CatalogState,
    runtime: &mut R,
    start_page: u32,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    apply_command(
        state,
        runtime,
        &mut view_data,
        &internal_tx,
        CatalogCommand::RequestPage(start_page.max(1)),
    );

    let mut result = Ok(());
    loop {
        process_internal_events(state, runtime, &mut view_data, &internal_tx, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(error).context("draw frame");
            break;
        }

        let has_event = match event::poll(Duration::from_millis(120)).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if has_event {
            match event::read().context("read event") {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                    if handle_key_event(state, runtime, &mut view_data, &internal_tx, key) {
                        break;
                    }
                }
                Ok(_) => {}
                Err(error) => {
                    result = Err(error);
                    break;
                }
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn process_internal_events<R: CatalogRuntime>(
    state: &mut CatalogState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        let command = match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                CatalogCommand::ClearStatus
            }
            InternalEvent::ClearStatus { .. } => continue,
            InternalEvent::PageFetched { request_id, result } => {
                CatalogCommand::PageLoaded { request_id, result }
            }
            InternalEvent::PreselectFinished {
                request_id,
                outcome,
            } => CatalogCommand::PreselectFinished {
                request_id,
                outcome,
            },
        };
        apply_command(state, runtime, view_data, tx, command);
    }
}

fn apply_command<R: CatalogRuntime>(
    state: &mut CatalogState,
    runtime: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    command: CatalogCommand,
) {
    for event in state.dispatch(command) {
        match event {
            CatalogEvent::FetchPage { request_id, page } => {
                if let Err(error) = runtime.spawn_fetch(request_id, page, tx.clone()) {
                    warn!(page, error = %error, "could not start page fetch");
                    emit_status(state, view_data, tx, format!("load failed: {error}"));
                }
            }
            CatalogEvent::PreselectStarted { request_id, target } => {
                if let Err(error) = runtime.spawn_preselect(request_id, target, tx.clone()) {
                    warn!(wanted = target, error = %error, "could not start preselect");
                    emit_status(state, view_data, tx, format!("bulk select failed: {error}"));
                }
            }
            CatalogEvent::PageChanged { page, total_count } => {
                debug!(page, total_count, "page displayed");
                view_data.cursor = 0;
            }
            CatalogEvent::StatusUpdated(_) => {
                view_data.status_token = view_data.status_token.saturating_add(1);
                schedule_status_clear(tx, view_data.status_token);
            }
            _ => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    state: &mut CatalogState,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    state.dispatch(CatalogCommand::SetStatus(message.into()));
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn handle_key_event<R: CatalogRuntime>(
    state: &mut CatalogState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if view_data.help_visible {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            view_data.help_visible = false;
        }
        return false;
    }

    if view_data.prompt.visible {
        handle_prompt_key(state, runtime, view_data, internal_tx, key);
        return false;
    }

    if key.code == KeyCode::Char('q') && key.modifiers == KeyModifiers::NONE {
        return true;
    }

    let Some(action) = action_for_key(key) else {
        return false;
    };
    apply_key_action(state, runtime, view_data, internal_tx, action);
    false
}

fn action_for_key(key: KeyEvent) -> Option<KeyAction> {
    match (key.code, key.modifiers) {
        (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(KeyAction::MoveCursor(1)),
        (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(KeyAction::MoveCursor(-1)),
        (KeyCode::Char(' '), _) | (KeyCode::Enter, _) => Some(KeyAction::ToggleRow),
        (KeyCode::Char('a'), _) => Some(KeyAction::SelectPage),
        (KeyCode::Char('A'), _) => Some(KeyAction::DeselectPage),
        (KeyCode::Char('n'), _)
        | (KeyCode::Char('l'), _)
        | (KeyCode::Right, _)
        | (KeyCode::PageDown, _) => Some(KeyAction::NextPage),
        (KeyCode::Char('p'), _)
        | (KeyCode::Char('h'), _)
        | (KeyCode::Left, _)
        | (KeyCode::PageUp, _) => Some(KeyAction::PrevPage),
        (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(KeyAction::FirstPage),
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(KeyAction::LastPage),
        (KeyCode::Char('r'), _) => Some(KeyAction::Reload),
        (KeyCode::Char('s'), _) | (KeyCode::Char('#'), _) => Some(KeyAction::OpenBulkPrompt),
        (KeyCode::Char('c'), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::ClearSelection)
        }
        (KeyCode::Char('?'), _) => Some(KeyAction::ToggleHelp),
        _ => None,
    }
}

fn apply_key_action<R: CatalogRuntime>(
    state: &mut CatalogState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    action: KeyAction,
) {
    match action {
        KeyAction::MoveCursor(delta) => {
            let rows = state.records().len();
            if rows == 0 {
                view_data.cursor = 0;
                return;
            }
            let next = view_data.cursor as isize + delta;
            view_data.cursor = next.clamp(0, rows as isize - 1) as usize;
        }
        KeyAction::ToggleRow => {
            let Some(record) = state.records().get(view_data.cursor) else {
                return;
            };
            let id = record.id;
            apply_command(
                state,
                runtime,
                view_data,
                internal_tx,
                CatalogCommand::ToggleRecord(id),
            );
        }
        KeyAction::SelectPage => {
            apply_command(state, runtime, view_data, internal_tx, CatalogCommand::SelectPage);
        }
        KeyAction::DeselectPage => {
            apply_command(state, runtime, view_data, internal_tx, CatalogCommand::DeselectPage);
        }
        KeyAction::NextPage | KeyAction::PrevPage | KeyAction::FirstPage | KeyAction::LastPage => {
            match target_page(state, action) {
                Some(page) => apply_command(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    CatalogCommand::RequestPage(page),
                ),
                None => {
                    let edge = if matches!(action, KeyAction::NextPage | KeyAction::LastPage) {
                        "already on last page"
                    } else {
                        "already on first page"
                    };
                    emit_status(state, view_data, internal_tx, edge);
                }
            }
        }
        KeyAction::Reload => {
            let page = state
                .requested_page()
                .unwrap_or_else(|| state.current_page())
                .max(1);
            apply_command(
                state,
                runtime,
                view_data,
                internal_tx,
                CatalogCommand::RequestPage(page),
            );
        }
        KeyAction::OpenBulkPrompt => {
            view_data.prompt = BulkPromptState {
                visible: true,
                input: String::new(),
            };
        }
        KeyAction::ClearSelection => {
            apply_command(
                state,
                runtime,
                view_data,
                internal_tx,
                CatalogCommand::ClearSelection,
            );
        }
        KeyAction::ToggleHelp => {
            view_data.help_visible = !view_data.help_visible;
        }
    }
}

/// Page a navigation key should request, or `None` when it would not move.
/// Navigation counts from the page most recently asked for, so repeated
/// presses during a slow load keep advancing.
fn target_page(state: &CatalogState, action: KeyAction) -> Option<u32> {
    let origin = state
        .requested_page()
        .unwrap_or_else(|| state.current_page())
        .max(1);
    let last = state.page_count();
    let target = match action {
        KeyAction::NextPage => origin.saturating_add(1),
        KeyAction::PrevPage => origin.saturating_sub(1).max(1),
        KeyAction::FirstPage => 1,
        KeyAction::LastPage => last.max(1),
        _ => return None,
    };
    let target = if last > 0 { target.min(last) } else { target };
    (target != origin).then_some(target)
}

fn handle_prompt_key<R: CatalogRuntime>(
    state: &mut CatalogState,
    runtime: &mut R,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    match key.code {
        KeyCode::Esc => {
            view_data.prompt = BulkPromptState::default();
        }
        KeyCode::Backspace => {
            view_data.prompt.input.pop();
        }
        KeyCode::Char(ch) if ch.is_ascii_digit() => {
            view_data.prompt.input.push(ch);
        }
        KeyCode::Char('-') if view_data.prompt.input.is_empty() => {
            view_data.prompt.input.push('-');
        }
        KeyCode::Enter => match view_data.prompt.input.parse::<i64>() {
            Ok(target) => {
                view_data.prompt = BulkPromptState::default();
                apply_command(
                    state,
                    runtime,
                    view_data,
                    internal_tx,
                    CatalogCommand::BulkSelect(target),
                );
            }
            Err(_) => {
                emit_status(state, view_data, internal_tx, "enter a whole number of rows");
            }
        },
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame<'_>, state: &CatalogState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let header = Paragraph::new(header_text(state))
        .block(Block::default().title("folio").borders(Borders::ALL))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(header, layout[0]);

    render_table(frame, layout[1], state, view_data);

    let status = Paragraph::new(status_text(state, view_data))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status, layout[2]);

    if view_data.prompt.visible {
        let area = centered_rect(40, 24, frame.area());
        frame.render_widget(Clear, area);
        let prompt = Paragraph::new(prompt_overlay_text(&view_data.prompt))
            .block(Block::default().title("select rows").borders(Borders::ALL));
        frame.render_widget(prompt, area);
    }

    if view_data.help_visible {
        let area = centered_rect(70, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn render_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &CatalogState,
    view_data: &ViewData,
) {
    let mut widths = vec![Constraint::Length(3)];
    widths.extend(Column::ALL.iter().map(|column| column_width(*column)));

    let mut header_cells = vec![Cell::from(header_checkbox(state))];
    header_cells.extend(Column::ALL.iter().map(|column| Cell::from(column.label())));
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows = state.records().iter().enumerate().map(|(index, record)| {
        let selected = state.is_selected(record.id);
        let mut style = Style::default();
        if selected {
            style = style.fg(Color::Cyan);
        }
        if index == view_data.cursor {
            style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
        }

        let mut cells = vec![Cell::from(if selected { CHECKED } else { UNCHECKED })];
        cells.extend(
            Column::ALL
                .iter()
                .map(|column| Cell::from(record.cell(*column))),
        );
        Row::new(cells).style(style)
    });

    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(table_title(state))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn column_width(column: Column) -> Constraint {
    match column {
        Column::Title => Constraint::Percentage(26),
        Column::Origin => Constraint::Percentage(12),
        Column::Artist => Constraint::Percentage(26),
        Column::Inscriptions => Constraint::Percentage(18),
        Column::StartDate | Column::EndDate => Constraint::Length(10),
    }
}

fn header_checkbox(state: &CatalogState) -> &'static str {
    let rows = state.records().len();
    if rows > 0 && state.materialized_selection().len() == rows {
        CHECKED
    } else {
        UNCHECKED
    }
}

fn header_text(state: &CatalogState) -> String {
    let current = state.current_page();
    if current == 0 {
        return if state.is_loading() {
            "loading...".to_owned()
        } else {
            "no page loaded".to_owned()
        };
    }
    let mut text = format!(
        "page {current} of {} | {} records",
        state.page_count().max(current),
        state.total_count()
    );
    if let Some(requested) = state.requested_page()
        && requested != current
    {
        text.push_str(&format!(" | opening page {requested}"));
    }
    text
}

fn table_title(state: &CatalogState) -> String {
    let Some(page) = state.page() else {
        return "records".to_owned();
    };
    if page.is_empty() {
        return "records (none on this page)".to_owned();
    }
    let first = page.first_index(state.page_size()) + 1;
    let last = first + page.len() as u64 - 1;
    format!("records {first}-{last} of {}", page.total_count)
}

fn status_text(state: &CatalogState, view_data: &ViewData) -> String {
    if view_data.prompt.visible || view_data.help_visible {
        return String::new();
    }

    let mut parts = vec![format!("selected: {}", state.selected_count())];
    if state.is_loading() {
        parts.push("loading...".to_owned());
    }
    if let Some(target) = state.preselect_target() {
        parts.push(format!("selecting {target}..."));
    }
    if let Some(status) = &state.status_line {
        parts.push(status.clone());
    }
    parts.push("space toggle | a/A page | n/p page | s select N | c clear | ? help".to_owned());
    parts.join(" | ")
}

fn prompt_overlay_text(prompt: &BulkPromptState) -> String {
    format!(
        "select the first N records across pages\n\n> {}_\n\nenter apply | esc cancel",
        prompt.input
    )
}

fn help_overlay_text() -> &'static str {
    "rows: j/k or up/down move | space/enter toggle | a select page | A deselect page\n\
pages: n/l/right/pgdn next | p/h/left/pgup prev | g/G first/last | r reload\n\
selection: s or # select first N records | c clear selection\n\
global: ? help | q or ctrl+q quit"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

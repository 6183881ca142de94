//! Ratatui form backend implementation for the `FormBackend` trait.
//!
//! Displays all controls at once in a scrollable form with keyboard
//! navigation and a result panel that is refreshed on every submit.

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use quote_form::{
    ControlState, Field, FieldKind, FormBackend, FormDefinition, FormError, FormState,
    Presentation, SubmitHandler,
};
use ratatui::{
    Frame, Terminal,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    prelude::CrosstermBackend,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, LineGauge, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Wrap,
    },
};
use std::io::{self, Stdout};
use thiserror::Error;

/// Error type for the Ratatui form backend.
#[derive(Debug, Error)]
pub enum RatatuiFormError {
    /// User cancelled the form (Ctrl+C, or Esc before any submit).
    #[error("Form cancelled by user")]
    Cancelled,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal setup/restore error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// The submit pipeline failed.
    #[error(transparent)]
    Submit(#[from] FormError),
}

/// Color theme for the TUI form.
#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color,
    pub text: Color,
    pub muted: Color,
    pub highlight: Color,
    pub error: Color,
    pub success: Color,
    pub border: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color::Cyan,
            text: Color::White,
            muted: Color::DarkGray,
            highlight: Color::Yellow,
            error: Color::Red,
            success: Color::Green,
            border: Color::Gray,
        }
    }
}

/// Ratatui form backend that displays all controls at once.
#[derive(Debug, Clone, Default)]
pub struct RatatuiFormBackend {
    /// Overrides the form title shown at the top.
    title: Option<String>,
    /// Color theme for the UI.
    theme: Theme,
}

impl RatatuiFormBackend {
    /// Create a new Ratatui form backend with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Show this title instead of the form's own.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set a custom color theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>, RatatuiFormError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend).map_err(|e| RatatuiFormError::Terminal(e.to_string()))
    }

    fn restore_terminal(
        &self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> Result<(), RatatuiFormError> {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        Ok(())
    }
}

/// What the event loop does after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Leave,
    Cancel,
}

/// Rows taken by one control (bordered block with a single content line).
const FIELD_HEIGHT: u16 = 3;

const HELP: &str = "Tab/↑↓: Navigate  ←/→: Adjust  Space: Toggle  F10: Submit  Esc: Leave";

/// Interactive state of the terminal form on top of the shared `FormState`.
struct FormView<'a> {
    definition: &'a FormDefinition,
    state: FormState,
    theme: Theme,
    title: String,
    focused_idx: usize,
    submit_focused: bool,
    /// Cursor position in characters within the focused text control.
    cursor: usize,
    scroll_offset: u16,
    /// Control flagged by the last refused submit.
    invalid_idx: Option<usize>,
    message: Option<String>,
    result: Option<Presentation>,
}

impl<'a> FormView<'a> {
    fn new(definition: &'a FormDefinition, state: FormState, theme: Theme, title: String) -> Self {
        let mut view = Self {
            definition,
            state,
            theme,
            title,
            focused_idx: 0,
            submit_focused: definition.is_empty(),
            cursor: 0,
            scroll_offset: 0,
            invalid_idx: None,
            message: None,
            result: None,
        };
        if !view.submit_focused {
            view.focus(0);
        }
        view
    }

    fn fields(&self) -> &'a [Field] {
        self.definition.fields()
    }

    fn focused_field(&self) -> Option<&'a Field> {
        if self.submit_focused {
            return None;
        }
        self.fields().get(self.focused_idx)
    }

    fn control(&self, field: &Field) -> Option<&ControlState> {
        self.state.get(field.name().as_str())
    }

    fn focus(&mut self, idx: usize) {
        self.focused_idx = idx;
        self.submit_focused = false;
        self.cursor = self
            .focused_text_mut()
            .map(|text| text.chars().count())
            .unwrap_or(0);
    }

    fn next_field(&mut self) {
        if self.submit_focused {
            return;
        }
        if self.focused_idx + 1 < self.fields().len() {
            self.focus(self.focused_idx + 1);
        } else {
            self.submit_focused = true;
        }
    }

    fn prev_field(&mut self) {
        if self.submit_focused {
            if let Some(last) = self.fields().len().checked_sub(1) {
                self.focus(last);
            }
        } else if self.focused_idx > 0 {
            self.focus(self.focused_idx - 1);
        }
    }

    fn clear_error(&mut self) {
        self.invalid_idx = None;
        self.message = None;
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        let field = self.focused_field()?;
        match self.state.get_mut(field.name().as_str())? {
            ControlState::Text(text) | ControlState::Number(text) => Some(text),
            _ => None,
        }
    }

    fn insert_char(&mut self, c: char) {
        let numeric = self
            .focused_field()
            .is_some_and(|f| matches!(f.kind(), FieldKind::Number(_)));
        if numeric && !is_number_char(c) {
            return;
        }
        let cursor = self.cursor;
        if let Some(text) = self.focused_text_mut() {
            let at = byte_index(text, cursor);
            text.insert(at, c);
            self.cursor += 1;
            self.clear_error();
        }
    }

    fn backspace(&mut self) {
        let cursor = self.cursor;
        if cursor == 0 {
            return;
        }
        if let Some(text) = self.focused_text_mut() {
            let at = byte_index(text, cursor - 1);
            text.remove(at);
            self.cursor -= 1;
            self.clear_error();
        }
    }

    fn delete(&mut self) {
        let cursor = self.cursor;
        if let Some(text) = self.focused_text_mut()
            && cursor < text.chars().count()
        {
            let at = byte_index(text, cursor);
            text.remove(at);
            self.clear_error();
        }
    }

    fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    fn cursor_end(&mut self) {
        self.cursor = self
            .focused_text_mut()
            .map(|text| text.chars().count())
            .unwrap_or(0);
    }

    /// Left/Right: move a slider by one step, cycle a select or move the cursor.
    fn step(&mut self, delta: i32) {
        let Some(field) = self.focused_field() else {
            return;
        };
        match field.kind() {
            FieldKind::Range(range) => {
                if let Some(ControlState::Range(value)) = self.state.get_mut(field.name().as_str())
                {
                    *value = range.nudge(*value, delta);
                    self.clear_error();
                }
            }
            FieldKind::Select(_) => self.cycle_option(delta),
            FieldKind::Text(_) | FieldKind::Number(_) => {
                let len = self
                    .focused_text_mut()
                    .map(|text| text.chars().count())
                    .unwrap_or(0);
                self.cursor = if delta < 0 {
                    self.cursor.saturating_sub(1)
                } else {
                    (self.cursor + 1).min(len)
                };
            }
            FieldKind::Checkbox(_) => {}
        }
    }

    fn cycle_option(&mut self, delta: i32) {
        let Some(field) = self.focused_field() else {
            return;
        };
        let FieldKind::Select(select) = field.kind() else {
            return;
        };
        let len = select.options.len();
        if len == 0 {
            return;
        }
        if let Some(ControlState::Select(selected)) = self.state.get_mut(field.name().as_str()) {
            let next = match *selected {
                Some(idx) => (idx as i64 + i64::from(delta)).rem_euclid(len as i64) as usize,
                None if delta < 0 => len - 1,
                None => 0,
            };
            *selected = Some(next);
            self.clear_error();
        }
    }

    fn toggle_checkbox(&mut self) {
        let Some(field) = self.focused_field() else {
            return;
        };
        if let Some(ControlState::Checkbox(checked)) = self.state.get_mut(field.name().as_str()) {
            *checked = !*checked;
            self.clear_error();
        }
    }

    /// Submit unless a native constraint is violated, in which case the
    /// offending control is focused and the message shown instead.
    fn submit(&mut self, handler: &mut SubmitHandler<'_>) -> Result<(), FormError> {
        let fields = self.fields();
        if let Some(violation) = self.state.violations(fields).into_iter().next() {
            tracing::debug!(field = %violation.name, "submit refused");
            if let Some(idx) = fields.iter().position(|f| f.name() == &violation.name) {
                self.focus(idx);
                self.invalid_idx = Some(idx);
                self.message = Some(format!("{}: {}", fields[idx].label(), violation.message));
            } else {
                self.message = Some(violation.message);
            }
            return Ok(());
        }

        let presentation = handler(&self.state)?;
        self.clear_error();
        self.result = Some(presentation);
        Ok(())
    }

    fn handle_key(
        &mut self,
        key: KeyEvent,
        handler: &mut SubmitHandler<'_>,
    ) -> Result<Flow, FormError> {
        if key.kind != KeyEventKind::Press {
            return Ok(Flow::Continue);
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => return Ok(Flow::Cancel),
            KeyCode::Esc => {
                return Ok(if self.result.is_some() {
                    Flow::Leave
                } else {
                    Flow::Cancel
                });
            }
            KeyCode::F(10) => self.submit(handler)?,
            KeyCode::Enter if ctrl => self.submit(handler)?,
            KeyCode::Enter => {
                if self.submit_focused {
                    self.submit(handler)?;
                } else {
                    self.next_field();
                }
            }
            KeyCode::BackTab => self.prev_field(),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => self.prev_field(),
            KeyCode::Tab | KeyCode::Down => self.next_field(),
            KeyCode::Up => self.prev_field(),
            KeyCode::PageDown => {
                for _ in 0..5 {
                    self.next_field();
                }
            }
            KeyCode::PageUp => {
                for _ in 0..5 {
                    self.prev_field();
                }
            }
            KeyCode::Left => self.step(-1),
            KeyCode::Right => self.step(1),
            KeyCode::Char(' ') => match self.focused_field().map(Field::kind) {
                Some(FieldKind::Checkbox(_)) => self.toggle_checkbox(),
                Some(FieldKind::Select(_)) => self.cycle_option(1),
                Some(FieldKind::Range(_)) => self.step(1),
                _ => self.insert_char(' '),
            },
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Home => self.cursor_home(),
            KeyCode::End => self.cursor_end(),
            _ => {}
        }
        Ok(Flow::Continue)
    }

    /// Adjust scroll offset to ensure the focused control is visible.
    fn adjust_scroll(&mut self, viewport_height: u16) {
        if self.submit_focused {
            return;
        }
        let field_y = self.focused_idx as u16 * FIELD_HEIGHT;
        if field_y < self.scroll_offset {
            self.scroll_offset = field_y;
        }
        let field_bottom = field_y + FIELD_HEIGHT;
        if field_bottom > self.scroll_offset + viewport_height {
            self.scroll_offset = field_bottom.saturating_sub(viewport_height);
        }
    }
}

fn is_number_char(c: char) -> bool {
    c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E')
}

fn byte_index(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

fn result_height(result: Option<&Presentation>, available: u16) -> u16 {
    let Some(presentation) = result else {
        return 0;
    };
    let lines = presentation.to_text().lines().count() as u16 + 2;
    lines.min(available / 2)
}

fn draw_form(frame: &mut Frame, view: &mut FormView) {
    let area = frame.area();
    let theme = view.theme.clone();

    let header_height = if view.definition.description.is_empty() {
        2
    } else {
        3
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(header_height),
            Constraint::Min(FIELD_HEIGHT),
            Constraint::Length(3),
            Constraint::Length(result_height(view.result.as_ref(), area.height)),
            Constraint::Length(1),
        ])
        .split(area);

    // Header
    let mut header = vec![Line::from(Span::styled(
        view.title.clone(),
        Style::default()
            .fg(theme.primary)
            .add_modifier(Modifier::BOLD),
    ))];
    if !view.definition.description.is_empty() {
        header.push(Line::from(Span::styled(
            view.definition.description.clone(),
            Style::default().fg(theme.text),
        )));
    }
    let header = Paragraph::new(header).block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(theme.border)),
    );
    frame.render_widget(header, chunks[0]);

    // Controls, scrolled to keep the focused one visible
    let form_area = chunks[1];
    let viewport_height = form_area.height;
    view.adjust_scroll(viewport_height);
    let total_height = view.fields().len() as u16 * FIELD_HEIGHT;

    for (idx, field) in view.fields().iter().enumerate() {
        let top = idx as u16 * FIELD_HEIGHT;
        if top < view.scroll_offset {
            continue;
        }
        let y = top - view.scroll_offset;
        if y + FIELD_HEIGHT > viewport_height {
            break;
        }
        let field_area = Rect {
            x: form_area.x + 1,
            y: form_area.y + y,
            width: form_area.width.saturating_sub(2),
            height: FIELD_HEIGHT,
        };
        let focused = !view.submit_focused && idx == view.focused_idx;
        draw_field(
            frame,
            field,
            view.control(field),
            field_area,
            FieldLook {
                focused,
                invalid: view.invalid_idx == Some(idx),
                cursor: view.cursor,
            },
            &theme,
        );
    }

    if total_height > viewport_height {
        let scrollbar_area = Rect {
            x: form_area.x + form_area.width.saturating_sub(1),
            y: form_area.y,
            width: 1,
            height: viewport_height,
        };
        let mut scrollbar_state = ScrollbarState::new(total_height as usize)
            .position(view.scroll_offset as usize)
            .viewport_content_length(viewport_height as usize);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("▲"))
            .end_symbol(Some("▼"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        frame.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }

    // Submit button
    let label = &view.definition.submit_label;
    let (submit_text, submit_style) = if view.submit_focused {
        (
            format!("[ {label} ]"),
            Style::default()
                .fg(Color::Black)
                .bg(theme.primary)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            label.clone(),
            Style::default()
                .fg(theme.primary)
                .add_modifier(Modifier::BOLD),
        )
    };
    let submit_button = Paragraph::new(submit_text)
        .style(submit_style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(if view.submit_focused {
                    theme.primary
                } else {
                    theme.border
                })),
        );
    frame.render_widget(submit_button, chunks[2]);

    // Result panel
    if let Some(presentation) = &view.result {
        let mut text = Text::default();
        if let Some(total) = &presentation.total_line {
            text.push_line(Line::from(Span::styled(
                total.clone(),
                Style::default()
                    .fg(theme.success)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        for line in presentation.values_dump.lines() {
            text.push_line(Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(theme.text),
            )));
        }
        let panel = Paragraph::new(text).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Result ")
                .border_style(Style::default().fg(theme.success)),
        );
        frame.render_widget(panel, chunks[3]);
    }

    // Help bar, replaced by the refusal message after a blocked submit
    let help = match &view.message {
        Some(message) => {
            Paragraph::new(format!("⚠ {message}")).style(Style::default().fg(theme.error))
        }
        None => Paragraph::new(HELP).style(Style::default().fg(theme.border)),
    };
    frame.render_widget(help, chunks[4]);
}

#[derive(Debug, Clone, Copy)]
struct FieldLook {
    focused: bool,
    invalid: bool,
    cursor: usize,
}

fn draw_field(
    frame: &mut Frame,
    field: &Field,
    control: Option<&ControlState>,
    area: Rect,
    look: FieldLook,
    theme: &Theme,
) {
    let border_color = if look.invalid {
        theme.error
    } else if look.focused {
        theme.primary
    } else {
        theme.border
    };

    let title = if field.required() {
        format!(" {} * ", field.label())
    } else {
        format!(" {} ", field.label())
    };
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title)
        .title_style(Style::default().fg(if look.focused {
            theme.highlight
        } else {
            theme.text
        }));
    if let Some(hint) = field.hint() {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {hint} "),
            Style::default().fg(theme.muted),
        )));
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(control) = control else {
        return;
    };
    match (control, field.kind()) {
        (ControlState::Text(text) | ControlState::Number(text), _) => {
            let paragraph = Paragraph::new(text.as_str()).style(Style::default().fg(theme.text));
            frame.render_widget(paragraph, inner);

            if look.focused {
                let cursor_x = inner.x + look.cursor as u16;
                if cursor_x < inner.x + inner.width {
                    frame.set_cursor_position((cursor_x, inner.y));
                }
            }
        }
        (ControlState::Range(value), FieldKind::Range(range)) => {
            let span = range.effective_max() - range.min;
            let ratio = if span > 0.0 {
                ((value - range.min) / span).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let gauge = LineGauge::default()
                .ratio(ratio)
                .label(format!("{:>8} ", control.text(field)))
                .filled_style(Style::default().fg(if look.focused {
                    theme.highlight
                } else {
                    theme.primary
                }))
                .unfilled_style(Style::default().fg(theme.muted));
            frame.render_widget(gauge, inner);
        }
        (ControlState::Select(selected), FieldKind::Select(select)) => {
            let (label, position) = match selected.and_then(|idx| select.options.get(idx)) {
                Some(option) => (
                    option.label.clone(),
                    format!("{}/{}", selected.unwrap_or(0) + 1, select.options.len()),
                ),
                None => (String::new(), format!("-/{}", select.options.len())),
            };
            let line = Line::from(vec![
                Span::styled("‹ ", Style::default().fg(theme.muted)),
                Span::styled(
                    label,
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" › ", Style::default().fg(theme.muted)),
                Span::styled(position, Style::default().fg(theme.muted)),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
        }
        (ControlState::Checkbox(checked), _) => {
            let (mark, style) = if *checked {
                ("[✓]", Style::default().fg(theme.success))
            } else {
                ("[ ]", Style::default().fg(theme.text))
            };
            frame.render_widget(Paragraph::new(mark).style(style), inner);
        }
        _ => {}
    }
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    view: &mut FormView<'_>,
    handler: &mut SubmitHandler<'_>,
) -> Result<Flow, RatatuiFormError> {
    loop {
        terminal.draw(|frame| draw_form(frame, view))?;

        if let Event::Key(key) = event::read()? {
            match view.handle_key(key, handler)? {
                Flow::Continue => {}
                flow => return Ok(flow),
            }
        }
    }
}

impl FormBackend for RatatuiFormBackend {
    type Error = RatatuiFormError;

    fn run(
        &self,
        definition: &FormDefinition,
        state: FormState,
        submit: &mut SubmitHandler<'_>,
    ) -> Result<FormState, Self::Error> {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| definition.title.clone());
        let mut view = FormView::new(definition, state, self.theme.clone(), title);

        let mut terminal = self.setup_terminal()?;
        let outcome = event_loop(&mut terminal, &mut view, submit);
        self.restore_terminal(&mut terminal)?;

        match outcome? {
            Flow::Cancel => Err(RatatuiFormError::Cancelled),
            _ => Ok(view.state),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use quote_form::{CheckboxField, InputField, RangeField, SelectField, SelectOption};
    use ratatui::backend::TestBackend;

    use super::*;

    fn definition() -> FormDefinition {
        FormDefinition::new(vec![
            Field::new("name", FieldKind::Text(InputField::new()))
                .with_label("Name")
                .with_required(true),
            Field::new("hours", FieldKind::Number(InputField::new())),
            Field::new("rate", FieldKind::Range(RangeField::new(20.0, 120.0).with_step(5.0))),
            Field::new(
                "service",
                FieldKind::Select(SelectField::new(vec![
                    SelectOption::new("basic", "Basic"),
                    SelectOption::new("full", "Full"),
                ])),
            ),
            Field::new("rush", FieldKind::Checkbox(CheckboxField::new())),
        ])
        .with_title("Repair")
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    /// Feed keys into a view, counting submits.
    fn drive(view: &mut FormView<'_>, keys: &[KeyEvent]) -> (Flow, usize) {
        let mut calls = 0;
        let mut handler = |state: &FormState| -> Result<Presentation, FormError> {
            calls += 1;
            Ok(Presentation {
                total_line: Some(format!("Total: {}", state.len())),
                values_dump: "{}".to_string(),
            })
        };
        let mut flow = Flow::Continue;
        for key in keys {
            flow = view.handle_key(*key, &mut handler).unwrap();
            if flow != Flow::Continue {
                break;
            }
        }
        (flow, calls)
    }

    fn view(definition: &FormDefinition) -> FormView<'_> {
        FormView::new(
            definition,
            FormState::new(definition),
            Theme::default(),
            definition.title.clone(),
        )
    }

    fn text(view: &FormView<'_>, name: &str) -> String {
        let field = view.definition.field(name).unwrap();
        view.control(field).unwrap().text(field)
    }

    #[test]
    fn typing_and_editing_text() {
        let definition = definition();
        let mut view = view(&definition);
        drive(
            &mut view,
            &[
                press(KeyCode::Char('A')),
                press(KeyCode::Char('n')),
                press(KeyCode::Char('x')),
                press(KeyCode::Backspace),
                press(KeyCode::Char('n')),
                press(KeyCode::Home),
                press(KeyCode::Char('J')),
                press(KeyCode::Delete),
            ],
        );
        assert_eq!(text(&view, "name"), "Jnn");
    }

    #[test]
    fn number_input_ignores_letters() {
        let definition = definition();
        let mut view = view(&definition);
        drive(
            &mut view,
            &[
                press(KeyCode::Tab),
                press(KeyCode::Char('3')),
                press(KeyCode::Char('x')),
                press(KeyCode::Char('.')),
                press(KeyCode::Char('5')),
            ],
        );
        assert_eq!(text(&view, "hours"), "3.5");
    }

    #[test]
    fn slider_moves_by_step() {
        let definition = definition();
        let mut view = view(&definition);
        drive(
            &mut view,
            &[
                press(KeyCode::Down),
                press(KeyCode::Down),
                press(KeyCode::Right),
                press(KeyCode::Right),
                press(KeyCode::Left),
            ],
        );
        assert_eq!(text(&view, "rate"), "25");

        drive(&mut view, &[press(KeyCode::Left), press(KeyCode::Left)]);
        assert_eq!(text(&view, "rate"), "20");
    }

    #[test]
    fn select_cycles_and_checkbox_toggles() {
        let definition = definition();
        let mut view = view(&definition);
        for _ in 0..3 {
            view.next_field();
        }
        drive(&mut view, &[press(KeyCode::Right)]);
        assert_eq!(text(&view, "service"), "full");
        drive(&mut view, &[press(KeyCode::Char(' '))]);
        assert_eq!(text(&view, "service"), "basic");
        drive(&mut view, &[press(KeyCode::Left)]);
        assert_eq!(text(&view, "service"), "full");

        drive(&mut view, &[press(KeyCode::Tab), press(KeyCode::Char(' '))]);
        assert_eq!(text(&view, "rush"), "on");
    }

    #[test]
    fn navigation_reaches_submit_and_back() {
        let definition = definition();
        let mut view = view(&definition);
        for _ in 0..10 {
            view.next_field();
        }
        assert!(view.submit_focused);

        drive(&mut view, &[KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)]);
        assert!(!view.submit_focused);
        assert_eq!(view.focused_idx, 4);

        drive(&mut view, &[press(KeyCode::PageUp)]);
        assert_eq!(view.focused_idx, 0);
    }

    #[test]
    fn violated_constraint_blocks_submit() {
        let definition = definition();
        let mut view = view(&definition);
        view.focus(3);

        let (flow, calls) = drive(&mut view, &[press(KeyCode::F(10))]);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(calls, 0);
        assert_eq!(view.focused_idx, 0);
        assert_eq!(view.invalid_idx, Some(0));
        assert!(view.message.as_deref().unwrap().starts_with("Name: "));
        assert!(view.result.is_none());

        drive(&mut view, &[press(KeyCode::Char('A'))]);
        assert_eq!(view.message, None);
    }

    #[test]
    fn submit_fills_result_panel() {
        let definition = definition();
        let mut view = view(&definition);
        view.state
            .set_text(definition.field("name").unwrap(), "Ann")
            .unwrap();
        view.submit_focused = true;

        let (flow, calls) = drive(&mut view, &[press(KeyCode::Enter), press(KeyCode::Enter)]);
        assert_eq!(flow, Flow::Continue);
        assert_eq!(calls, 2);
        assert_eq!(
            view.result.as_ref().unwrap().total_line.as_deref(),
            Some("Total: 5")
        );
    }

    #[test]
    fn submit_errors_propagate() {
        let definition = FormDefinition::new(Vec::new());
        let mut view = view(&definition);
        let mut handler = |_: &FormState| -> Result<Presentation, FormError> {
            Err(FormError::InvalidCurrency("EURO".to_string()))
        };
        let err = view
            .handle_key(press(KeyCode::Enter), &mut handler)
            .unwrap_err();
        assert!(matches!(err, FormError::InvalidCurrency(_)));
    }

    #[test]
    fn leaving_and_cancelling() {
        let definition = definition();
        let mut view = view(&definition);
        assert_eq!(drive(&mut view, &[press(KeyCode::Esc)]).0, Flow::Cancel);

        view.state
            .set_text(definition.field("name").unwrap(), "Ann")
            .unwrap();
        let (flow, _) = drive(&mut view, &[press(KeyCode::F(10)), press(KeyCode::Esc)]);
        assert_eq!(flow, Flow::Leave);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(drive(&mut view, &[ctrl_c]).0, Flow::Cancel);
    }

    #[test]
    fn renders_controls_and_result() {
        let definition = definition().with_description("Estimate");
        let mut view = view(&definition);
        view.result = Some(Presentation {
            total_line: Some("Total: €10.00".to_string()),
            values_dump: "{\n  \"a\": 1\n}".to_string(),
        });

        let mut terminal = Terminal::new(TestBackend::new(60, 40)).unwrap();
        terminal.draw(|frame| draw_form(frame, &mut view)).unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(screen.contains("Repair"));
        assert!(screen.contains("Estimate"));
        assert!(screen.contains("Name *"));
        assert!(screen.contains("Basic"));
        assert!(screen.contains("Total: €10.00"));
        assert!(screen.contains("Calculate"));
    }

    #[test]
    fn walks_the_catering_form() {
        let definition = example_forms::catering::config().normalize();
        let mut view = view(&definition);
        drive(
            &mut view,
            &[
                press(KeyCode::Backspace),
                press(KeyCode::Backspace),
                press(KeyCode::Char('4')),
                press(KeyCode::Tab),
                press(KeyCode::Right),
                press(KeyCode::Tab),
                press(KeyCode::Tab),
                press(KeyCode::Char(' ')),
            ],
        );

        let values = view.state.collect(definition.fields());
        assert_eq!(values.get_number("guests").unwrap(), 4.0);
        assert_eq!(values.get_string("menu").unwrap(), "meat");
        assert!(!values.get_bool("drinks").unwrap());
    }

    #[test]
    fn error_types() {
        let err = RatatuiFormError::Cancelled;
        assert_eq!(err.to_string(), "Form cancelled by user");

        let err = RatatuiFormError::Terminal("test error".to_string());
        assert_eq!(err.to_string(), "Terminal error: test error");
    }

    #[test]
    fn backend_title_override() {
        let backend = RatatuiFormBackend::new().with_title("Custom");
        assert_eq!(backend.title.as_deref(), Some("Custom"));
        assert_eq!(Theme::default().primary, Color::Cyan);
    }
}

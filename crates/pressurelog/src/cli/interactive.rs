//! Interactive full-screen form.
//!
//! Raw key events are translated into [`FormKey`]s and handed to the form's
//! dispatcher. After every event the whole screen is redrawn: the form on
//! top, the status line, then the record list.

use std::fmt::Write as _;
use std::io::{self, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Stylize;
use crossterm::{cursor, execute, queue, terminal};
use tracing::debug;

use crate::error::Result;
use crate::form::{FieldId, FormController, FormKey, KeyOutcome, SUCCESS_MESSAGE};
use crate::render::medication_icon;
use crate::session::{DeleteOutcome, Session, DELETE_CONFIRM_PROMPT};
use crate::theme::Palette;

const TITLE: &str = "血壓紀錄";
const HELP: &str =
    "Tab 切換欄位 · Enter 新增 · ←/→ 藥物狀態 · ↑/↓ 選擇紀錄 · Del 刪除 · Ctrl-T 主題 · Esc 離開";

/// Screen state that lives outside the session.
#[derive(Debug, Default)]
struct ScreenState {
    selected: Option<usize>,
    pending_delete: Option<i64>,
    status: Option<String>,
}

/// What the loop should do after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Run the interactive form until the user quits.
///
/// # Errors
///
/// Returns an error if the terminal cannot be driven or storage fails.
pub fn run(session: &mut Session) -> Result<()> {
    let mut guard = TerminalGuard::enter(io::stdout())?;
    event_loop(session, &mut guard.out)
}

/// Raw mode and the alternate screen, restored on drop.
///
/// Restoring happens on every exit path, including early errors and panics.
#[derive(Debug)]
struct TerminalGuard<W: Write> {
    out: W,
}

impl<W: Write> TerminalGuard<W> {
    fn enter(out: W) -> Result<Self> {
        terminal::enable_raw_mode()?;
        // Built before the screen switch so a failure there still
        // disables raw mode.
        let mut guard = Self { out };
        execute!(guard.out, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(guard)
    }
}

impl<W: Write> Drop for TerminalGuard<W> {
    fn drop(&mut self) {
        let _ = execute!(self.out, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = self.out.flush();
    }
}

fn event_loop(session: &mut Session, out: &mut impl Write) -> Result<()> {
    let mut state = ScreenState::default();
    loop {
        draw(out, session, &state)?;
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if handle_key(session, &mut state, key)? == Flow::Quit {
            return Ok(());
        }
    }
}

fn handle_key(session: &mut Session, state: &mut ScreenState, key: KeyEvent) -> Result<Flow> {
    if let Some(id) = state.pending_delete.take() {
        let confirmed = matches!(key.code, KeyCode::Char('y' | 'Y'));
        let outcome = session.delete(id, |_| Ok(confirmed))?;
        debug!(?outcome, "Delete request for {}", id);
        state.status = match outcome {
            DeleteOutcome::Deleted => Some("已刪除".to_string()),
            DeleteOutcome::Declined | DeleteOutcome::NotFound => None,
        };
        clamp_selection(state, session.records().len());
        return Ok(Flow::Continue);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return Ok(Flow::Quit),
        KeyCode::Char('c') if ctrl => return Ok(Flow::Quit),
        KeyCode::Char('t') if ctrl => {
            let theme = session.toggle_theme()?;
            state.status = Some(format!("{} {}", theme.icon(), theme));
        }
        KeyCode::Up => {
            state.selected = state.selected.and_then(|i| i.checked_sub(1));
        }
        KeyCode::Down => {
            let len = session.records().len();
            state.selected = match state.selected {
                None if len > 0 => Some(0),
                Some(i) if i + 1 < len => Some(i + 1),
                other => other,
            };
        }
        KeyCode::Delete => {
            if let Some(record) = state.selected.and_then(|i| session.records().get(i)) {
                state.pending_delete = Some(record.id);
                state.status = Some(format!("{DELETE_CONFIRM_PROMPT} [y/N]"));
            }
        }
        _ => {
            if let Some(form_key) = to_form_key(key) {
                if session.form_mut().handle_key(form_key) == KeyOutcome::Submit {
                    state.status = Some(match session.submit_form() {
                        Ok(_) => SUCCESS_MESSAGE.to_string(),
                        Err(e) if e.is_validation_error() => e.to_string(),
                        Err(e) => return Err(e),
                    });
                    clamp_selection(state, session.records().len());
                }
            }
        }
    }
    Ok(Flow::Continue)
}

fn clamp_selection(state: &mut ScreenState, len: usize) {
    state.selected = match state.selected {
        Some(_) if len == 0 => None,
        Some(i) => Some(i.min(len - 1)),
        None => None,
    };
}

/// Map a terminal key to a form key.
///
/// Characters typed with Ctrl or Alt held are chords, not text.
fn to_form_key(key: KeyEvent) -> Option<FormKey> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.difference(KeyModifiers::SHIFT).is_empty() => {
            Some(FormKey::Char(c))
        }
        KeyCode::Backspace => Some(FormKey::Backspace),
        KeyCode::Enter => Some(FormKey::Enter),
        KeyCode::Tab => Some(FormKey::Tab),
        KeyCode::BackTab => Some(FormKey::BackTab),
        KeyCode::Left => Some(FormKey::Left),
        KeyCode::Right => Some(FormKey::Right),
        _ => None,
    }
}

fn draw(out: &mut impl Write, session: &Session, state: &ScreenState) -> Result<()> {
    let palette = session.theme().palette();
    let mut screen = render_form(session.form(), session.theme().icon(), Some(&palette));
    screen.push('\n');
    if let Some(status) = &state.status {
        let _ = writeln!(screen, "{}", status.as_str().with(palette.accent));
    }
    screen.push('\n');
    screen.push_str(&session.render_text(state.selected));

    queue!(
        out,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0)
    )?;
    // Raw mode does not translate line feeds.
    out.write_all(screen.replace('\n', "\r\n").as_bytes())?;
    out.flush()?;
    Ok(())
}

/// Lay out the form fields, marking the focused one.
fn render_form(form: &FormController, theme_icon: &str, palette: Option<&Palette>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{TITLE}  {theme_icon}");
    let _ = writeln!(out, "{HELP}");
    out.push('\n');

    for field in FieldId::ALL {
        let focused = form.focus() == field;
        let marker = if focused { "›" } else { " " };
        let value = form.field(field);
        let shown = match field {
            FieldId::Medication => format!("{} {value}", medication_icon(value)),
            FieldId::Notes => value.replace('\n', "\n            "),
            _ => value.to_string(),
        };
        let caret = if focused && field != FieldId::Medication {
            "_"
        } else {
            ""
        };
        let line = format!("{marker} {:<8}  {shown}{caret}", field.label());
        match palette {
            Some(p) if focused => {
                let _ = writeln!(out, "{}", line.as_str().with(p.accent));
            }
            _ => {
                let _ = writeln!(out, "{line}");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStorage;
    use crate::timestamp::{DateLocale, FixedClock};
    use chrono::{FixedOffset, TimeZone};

    fn session() -> Session {
        let clock = FixedClock(
            FixedOffset::east_opt(0)
                .unwrap()
                .with_ymd_and_hms(2024, 6, 1, 20, 0, 0)
                .unwrap(),
        );
        Session::with_storage(
            LocalStorage::open_in_memory().unwrap(),
            DateLocale::Iso,
            Box::new(clock),
            false,
        )
    }

    fn press(session: &mut Session, state: &mut ScreenState, code: KeyCode) -> Flow {
        handle_key(session, state, KeyEvent::new(code, KeyModifiers::NONE)).unwrap()
    }

    fn type_text(session: &mut Session, state: &mut ScreenState, text: &str) {
        for c in text.chars() {
            press(session, state, KeyCode::Char(c));
        }
    }

    fn fill_reading(session: &mut Session, state: &mut ScreenState) {
        type_text(session, state, "128");
        press(session, state, KeyCode::Tab);
        type_text(session, state, "84");
        press(session, state, KeyCode::Tab);
        type_text(session, state, "70");
    }

    #[test]
    fn test_enter_submits_reading() {
        let mut session = session();
        let mut state = ScreenState::default();
        fill_reading(&mut session, &mut state);

        press(&mut session, &mut state, KeyCode::Enter);

        assert_eq!(session.records().len(), 1);
        assert_eq!(session.records()[0].systolic, 128);
        assert_eq!(state.status.as_deref(), Some(SUCCESS_MESSAGE));
        assert_eq!(session.form().field(FieldId::Systolic), "");
    }

    #[test]
    fn test_enter_in_notes_does_not_submit() {
        let mut session = session();
        let mut state = ScreenState::default();
        fill_reading(&mut session, &mut state);
        press(&mut session, &mut state, KeyCode::Tab);
        press(&mut session, &mut state, KeyCode::Tab);
        type_text(&mut session, &mut state, "first");

        press(&mut session, &mut state, KeyCode::Enter);
        assert!(session.records().is_empty());

        press(&mut session, &mut state, KeyCode::BackTab);
        press(&mut session, &mut state, KeyCode::Enter);
        assert_eq!(session.records()[0].notes, "first\n");
    }

    #[test]
    fn test_validation_error_shown_in_status() {
        let mut session = session();
        let mut state = ScreenState::default();
        press(&mut session, &mut state, KeyCode::Enter);

        assert!(session.records().is_empty());
        assert!(state.status.as_deref().unwrap().contains("請填寫"));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut session = session();
        let mut state = ScreenState::default();
        fill_reading(&mut session, &mut state);
        press(&mut session, &mut state, KeyCode::Enter);

        press(&mut session, &mut state, KeyCode::Down);
        assert_eq!(state.selected, Some(0));

        press(&mut session, &mut state, KeyCode::Delete);
        assert!(state.pending_delete.is_some());
        press(&mut session, &mut state, KeyCode::Char('n'));
        assert_eq!(session.records().len(), 1);
        assert!(state.pending_delete.is_none());

        press(&mut session, &mut state, KeyCode::Delete);
        press(&mut session, &mut state, KeyCode::Char('y'));
        assert!(session.records().is_empty());
        assert_eq!(state.selected, None);
    }

    #[test]
    fn test_ctrl_t_toggles_theme() {
        let mut session = session();
        let mut state = ScreenState::default();
        let before = session.theme().current();

        handle_key(
            &mut session,
            &mut state,
            KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL),
        )
        .unwrap();

        assert_eq!(session.theme().current(), before.toggled());
        assert!(session.form().field(FieldId::Systolic).is_empty());
    }

    #[test]
    fn test_escape_quits() {
        let mut session = session();
        let mut state = ScreenState::default();
        assert_eq!(press(&mut session, &mut state, KeyCode::Esc), Flow::Quit);
    }

    #[test]
    fn test_render_form_marks_focus() {
        let mut form = FormController::new(DateLocale::Iso);
        form.handle_key(FormKey::Char('9'));
        let text = render_form(&form, "🌙", None);

        let focused = text.lines().find(|l| l.starts_with('›')).unwrap();
        assert!(focused.contains("收縮壓"));
        assert!(focused.contains("9_"));
        assert!(text.contains("➖ 無"));
    }

    #[test]
    fn test_guard_restores_screen_on_drop() {
        let mut out = Vec::new();
        drop(TerminalGuard { out: &mut out });

        let written = String::from_utf8(out).unwrap();
        assert!(written.contains("\x1b[?25h"));
        assert!(written.contains("\x1b[?1049l"));
    }

    #[test]
    fn test_guard_restores_screen_on_panic() {
        let mut out = Vec::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = TerminalGuard { out: &mut out };
            panic!("draw failed");
        }));

        assert!(result.is_err());
        assert!(String::from_utf8(out).unwrap().contains("\x1b[?1049l"));
    }

    #[test]
    fn test_to_form_key() {
        let plain = |code| KeyEvent::new(code, KeyModifiers::NONE);
        assert_eq!(to_form_key(plain(KeyCode::Enter)), Some(FormKey::Enter));
        assert_eq!(
            to_form_key(plain(KeyCode::Char('1'))),
            Some(FormKey::Char('1'))
        );
        assert_eq!(
            to_form_key(KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT)),
            Some(FormKey::Char('A'))
        );
        assert_eq!(to_form_key(plain(KeyCode::F(1))), None);
    }

    #[test]
    fn test_chords_do_not_type_text() {
        let mut session = session();
        let mut state = ScreenState::default();
        press(&mut session, &mut state, KeyCode::Char('1'));

        for modifiers in [
            KeyModifiers::CONTROL,
            KeyModifiers::ALT,
            KeyModifiers::CONTROL | KeyModifiers::SHIFT,
        ] {
            for c in ['a', 's', 'x'] {
                handle_key(&mut session, &mut state, KeyEvent::new(KeyCode::Char(c), modifiers))
                    .unwrap();
            }
        }

        assert_eq!(session.form().field(FieldId::Systolic), "1");
        assert!(session.records().is_empty());
    }
}

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Applies finished requests and handles at most one key press.
/// Returns false once the app should quit.
pub fn handle_events(app: &mut App) -> io::Result<bool> {
    app.poll_results();

    if event::poll(Duration::from_millis(100))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                handle_key(app, key);
            }
        }
    }

    Ok(!app.should_quit)
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // overlays first, topmost wins
    if app.alert.is_some() {
        app.dismiss_alert();
        return;
    }
    if app.confirm_delete.is_some() {
        handle_confirm_key(app, key);
        return;
    }
    if app.form.is_some() {
        handle_form_key(app, key);
        return;
    }
    if app.grab.is_some() {
        handle_grab_key(app, key);
        return;
    }
    handle_board_key(app, key);
}

fn handle_confirm_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_delete(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_delete(false),
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.submit_form();
        return;
    }
    if key.code == KeyCode::Esc {
        app.close_dialog();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            form.insert_char(c)
        }
        _ => {}
    }
}

fn handle_grab_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_grab(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_grab(1),
        KeyCode::Enter | KeyCode::Char(' ') => app.drop_grab(false),
        KeyCode::Esc => app.drop_grab(true),
        _ => {}
    }
}

fn handle_board_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Left | KeyCode::Char('h') => app.board.move_column(-1),
        KeyCode::Right | KeyCode::Char('l') => app.board.move_column(1),
        KeyCode::Up | KeyCode::Char('k') => app.board.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.board.move_selection(1),
        KeyCode::Char('n') => app.open_create_dialog(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_dialog(),
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('f') => app.toggle_favorite(),
        KeyCode::Char(' ') => app.start_grab(),
        KeyCode::Char('r') => app.load(),
        _ => {}
    }
}

//! Keyboard input handling for the TUI.
//!
//! This module translates key events into application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, Screen, PAGE_SCROLL_SIZE};
use crate::ui::screens::users::role_for_key;

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Searching) {
        handle_search_input(app, key);
        return Ok(false);
    }

    // Any key dismisses the last status message
    app.status_message = None;

    if app.screen.is_form() {
        handle_form_input(app, key);
        return Ok(false);
    }

    // Keys shared by the list screens
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char('o') if app.session.is_authenticated() => {
            app.logout();
            return Ok(false);
        }
        _ => {}
    }

    match app.screen {
        Screen::Materials => handle_materials_input(app, key),
        Screen::AdminUsers => handle_users_input(app, key),
        _ => {}
    }

    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => app.navigate(Screen::Register),
            KeyCode::Char('l') => app.navigate(Screen::Login),
            KeyCode::Char('f') => app.navigate(Screen::ForgotPassword),
            _ => {}
        }
        return;
    }

    if key.code == KeyCode::Esc {
        app.navigate(Screen::Materials);
        return;
    }
    if key.code == KeyCode::Enter {
        let Some(form) = app.current_form_mut() else {
            return;
        };
        if form.on_button() || form.focus + 1 == form.fields.len() {
            app.submit_current_form();
        } else {
            form.focus_next();
        }
        return;
    }

    let Some(form) = app.current_form_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.filter.search.clear();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.filter.search.pop();
        }
        KeyCode::Char(c) => {
            app.filter.search.push(c);
        }
        _ => {}
    }
    app.material_selection = 0;
}

fn handle_materials_input(app: &mut App, key: KeyEvent) {
    let count = app.filtered_materials().len();
    match key.code {
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
            app.filter.search.clear();
            app.material_selection = 0;
        }
        KeyCode::Char('c') => app.cycle_category(),
        KeyCode::Char('x') | KeyCode::Esc => {
            app.filter.search.clear();
            app.filter.category = None;
            app.material_selection = 0;
        }
        KeyCode::Char('d') | KeyCode::Enter => app.download_selected(),
        KeyCode::Char('u') => app.refresh_catalog(),
        KeyCode::Char('l') => app.navigate(Screen::Login),
        KeyCode::Char('r') => app.navigate(Screen::Register),
        KeyCode::Char('a') => app.navigate(Screen::AdminUsers),
        _ => move_selection(&mut app.material_selection, count, key.code),
    }
}

fn handle_users_input(app: &mut App, key: KeyEvent) {
    let count = app.users.len();
    match key.code {
        KeyCode::Char('b') | KeyCode::Esc => app.navigate(Screen::Materials),
        KeyCode::Char('u') => {
            app.users_loaded = false;
            app.fetch_users();
        }
        KeyCode::Char(c) => {
            if let Some(role) = role_for_key(c) {
                app.change_selected_role(role);
            } else {
                move_selection(&mut app.user_selection, count, key.code);
            }
        }
        _ => move_selection(&mut app.user_selection, count, key.code),
    }
}

/// Arrow, vim and paging keys over a list of `count` rows
fn move_selection(selection: &mut usize, count: usize, code: KeyCode) {
    if count == 0 {
        *selection = 0;
        return;
    }
    let last = count - 1;
    *selection = match code {
        KeyCode::Up | KeyCode::Char('k') => selection.saturating_sub(1),
        KeyCode::Down | KeyCode::Char('j') => (*selection + 1).min(last),
        KeyCode::PageUp => selection.saturating_sub(PAGE_SCROLL_SIZE),
        KeyCode::PageDown => (*selection + PAGE_SCROLL_SIZE).min(last),
        KeyCode::Home | KeyCode::Char('g') => 0,
        KeyCode::End | KeyCode::Char('G') => last,
        _ => *selection,
    };
}

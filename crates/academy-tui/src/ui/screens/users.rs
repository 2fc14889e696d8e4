//! Admin user-role table, rendered through the access guard.

use academy_core::auth::Guarded;
use academy_core::models::{Identity, Role};
use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    match app.admin_view {
        Guarded::Loading => render_placeholder(frame, area, "Loading authentication..."),
        Guarded::Content(ref me) => render_table(frame, app, me, area),
        Guarded::Nothing => {}
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!("  {}", text),
        styles::muted_style(),
    )))
    .block(block);
    frame.render_widget(paragraph, area);
}

fn render_table(frame: &mut Frame, app: &App, me: &Identity, area: Rect) {
    if app.users_loading && app.users.is_empty() {
        render_placeholder(frame, area, "Loading users...");
        return;
    }
    if let Some(ref error) = app.users_error {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        let paragraph = Paragraph::new(Line::from(Span::styled(
            format!("  Error: {}", error),
            styles::error_style(),
        )))
        .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Email"),
        Cell::from("Current Role"),
        Cell::from("Change Role"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = app
        .users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let style = if i == app.user_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let change = if user.is_self(me) {
                Cell::from(Span::styled("N/A (You)", styles::muted_style()))
            } else {
                let keys: Vec<String> = Role::ALL
                    .iter()
                    .filter(|role| **role != user.role)
                    .map(|role| format!("[{}]", role_key(*role)))
                    .collect();
                Cell::from(Span::styled(keys.join(" "), styles::muted_style()))
            };
            Row::new(vec![
                Cell::from(user.name.clone()),
                Cell::from(user.email.clone()),
                Cell::from(Span::styled(user.role.display_name(), styles::role_style(user.role))),
                change,
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Fill(3),
        Constraint::Length(18),
        Constraint::Length(16),
    ];

    let title = if app.role_update_pending {
        " Manage Users (updating...) ".to_string()
    } else {
        format!(" Manage Users ({}) ", app.users.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.user_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

/// Key that assigns `role` in the users table
pub fn role_key(role: Role) -> char {
    match role {
        Role::Student => 's',
        Role::ContentManager => 'c',
        Role::MarketingManager => 'm',
        Role::Admin => 'a',
    }
}

/// Inverse of `role_key`
pub fn role_for_key(key: char) -> Option<Role> {
    Role::ALL.into_iter().find(|role| role_key(*role) == key)
}

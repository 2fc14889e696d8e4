use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState, Screen};

use super::screens::{forms, materials, users};
use super::styles;

const LOGO: [&str; 3] = [
    "   ╔═╗╔═╗╔═╗╔╦╗╔═╗╔╦╗╦ ╦",
    "   ╠═╣║  ╠═╣ ║║║╣ ║║║╚╦╝",
    "   ╩ ╩╚═╝╩ ╩═╩╝╚═╝╩ ╩ ╩ ",
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Screen tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }

    if matches!(app.state, AppState::ConfirmingQuit) {
        render_quit_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Shafqat Ali Academy";

    let account = if app.session.is_loading {
        "Restoring session...".to_string()
    } else {
        match app.current_user() {
            Some(user) => format!("{} ({})", user.display_name(), user.role.display_name()),
            None => "Not signed in".to_string(),
        }
    };
    let right = format!("{}  [?] Help", account);

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(title.chars().count() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let mut tabs = vec![(Screen::Materials, "Free Library")];
    if app.session.is_authenticated() {
        tabs.push((Screen::AdminUsers, "Manage Users"));
    } else {
        tabs.push((Screen::Login, "Login"));
        tabs.push((Screen::Register, "Sign Up"));
    }
    // Recovery screens only appear while open
    if matches!(app.screen, Screen::ForgotPassword | Screen::ResetPassword) {
        tabs.push((app.screen, app.screen.title()));
    }

    let mut spans = vec![Span::raw(" ")];
    for (i, (screen, label)) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(*label, styles::tab_style(*screen == app.screen)));
    }

    let path = app.screen.path();
    let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
    spans.push(Span::raw(
        " ".repeat((area.width as usize).saturating_sub(used + path.len() + 2)),
    ));
    spans.push(Span::styled(path, styles::muted_style()));

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.screen {
        Screen::Materials => materials::render(frame, app, area),
        Screen::AdminUsers => users::render(frame, app, area),
        Screen::Login | Screen::Register | Screen::ForgotPassword | Screen::ResetPassword => {
            forms::render(frame, app, area)
        }
    }
}

fn shortcuts(app: &App) -> &'static str {
    match app.screen {
        Screen::Login => "[Tab] next | [Enter] sign in | [^R] sign up | [^F] forgot | [Esc] back",
        Screen::Register => "[Tab] next | [Enter] sign up | [^L] login | [Esc] back",
        Screen::ForgotPassword | Screen::ResetPassword => "[Tab] next | [Enter] submit | [Esc] back",
        Screen::Materials if app.session.is_authenticated() => {
            "[/]search [c]ategory [d]ownload [a]dmin [o]logout [q]uit"
        }
        Screen::Materials => "[/]search [c]ategory [d]ownload [l]ogin [q]uit",
        Screen::AdminUsers => "[s/c/m/a] set role [u]pdate [b]ack [o]logout [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None if app.screen == Screen::Materials => format!(" Catalog updated {} ", app.catalog_age),
        None => String::new(),
    };
    let right_text = format!(" {} ", shortcuts(app));

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::highlight_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(status_line).style(styles::status_bar_style()),
        area,
    );
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn logo_lines() -> Vec<Line<'static>> {
    LOGO.iter()
        .map(|row| Line::from(Span::styled(*row, styles::title_style())))
        .collect()
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(50, 26, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let mut help_text = logo_lines();
    help_text.extend([
        Line::from(Span::styled(format!("   v{}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Forms", styles::highlight_style())),
        help_line("Tab/↓", "Next field"),
        help_line("S-Tab/↑", "Previous field"),
        help_line("Enter", "Submit"),
        help_line("Esc", "Back to the library"),
        Line::from(""),
        Line::from(Span::styled(" Free Library", styles::highlight_style())),
        help_line("/", "Search titles"),
        help_line("c", "Cycle category filter"),
        help_line("d/Enter", "Download selected resource"),
        help_line("l / r", "Login / sign up"),
        help_line("a", "Manage users (admin)"),
        help_line("u", "Update catalog"),
        Line::from(""),
        Line::from(Span::styled(" Manage Users", styles::highlight_style())),
        help_line("s/c/m/a", "Student/content/marketing/admin"),
        help_line("o", "Log out"),
        Line::from(""),
        key_hint(&[("?", " / "), ("Esc", " closes this help")]),
    ]);

    frame.render_widget(Paragraph::new(help_text).block(dialog_block()), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(40, 9, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = logo_lines();
    lines.extend([
        Line::from(""),
        Line::from(Span::styled("   Leave the academy client?", styles::highlight_style())),
        Line::from(""),
        key_hint(&[("Y", " leave   "), ("N", " stay")]),
    ]);

    frame.render_widget(Paragraph::new(lines).block(dialog_block()), area);
}

fn dialog_block() -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default())
}

/// "   [Y] leave   [N] stay" style footer line
fn key_hint(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = vec![Span::raw("   ")];
    for (key, desc) in pairs {
        spans.push(Span::styled(format!("[{}]", key), styles::help_key_style()));
        spans.push(Span::styled(*desc, styles::muted_style()));
    }
    Line::from(spans)
}

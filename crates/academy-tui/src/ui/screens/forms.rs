//! Login, sign-up and password recovery forms.

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Form, Screen};
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const FORM_WIDTH: u16 = 56;
const FIELD_WIDTH: usize = 28;

fn subtitle(screen: Screen) -> &'static str {
    match screen {
        Screen::Login => "Welcome back! Sign in to continue.",
        Screen::Register => "Create your student account.",
        Screen::ForgotPassword => "We'll email you a link to reset it.",
        Screen::ResetPassword => "Paste your reset link or token.",
        _ => "",
    }
}

fn footer(screen: Screen) -> Option<Line<'static>> {
    let (prompt, key, action) = match screen {
        Screen::Login => ("Don't have an account? ", "^R", " Sign Up"),
        Screen::Register => ("Already have an account? ", "^L", " Login"),
        Screen::ForgotPassword | Screen::ResetPassword => ("Remembered it? ", "^L", " Back to login"),
        _ => return None,
    };
    Some(Line::from(vec![
        Span::raw("  "),
        Span::styled(prompt, styles::muted_style()),
        Span::styled(key, styles::help_key_style()),
        Span::styled(action, styles::muted_style()),
    ]))
}

fn field_line(form: &Form, index: usize) -> Line<'static> {
    let field = &form.fields[index];
    let focused = form.focus == index;
    let style = if focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };

    let shown: String = if field.masked {
        "*".repeat(field.value.chars().count())
    } else {
        field.value.clone()
    };
    // Keep the tail visible while typing past the box
    let skip = shown.chars().count().saturating_sub(FIELD_WIDTH - 1);
    let visible: String = shown.chars().skip(skip).collect();
    let cursor = if focused { "▌" } else { "" };

    Line::from(vec![
        Span::styled(format!("  {:>20}: [", field.label), styles::muted_style()),
        Span::styled(
            format!("{:<width$}", format!("{}{}", visible, cursor), width = FIELD_WIDTH),
            style,
        ),
        Span::styled("]", styles::muted_style()),
    ])
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.current_form() else {
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(format!("  {}", subtitle(app.screen)), styles::muted_style())),
        Line::from(""),
    ];
    for index in 0..form.fields.len() {
        lines.push(field_line(form, index));
    }

    lines.push(Line::from(""));
    let label = if form.submitting { form.busy_label } else { form.submit_label };
    let button_style = if form.on_button() {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let button = if form.on_button() {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let indent = (FORM_WIDTH as usize).saturating_sub(button.chars().count() + 4) / 2;
    lines.push(Line::from(vec![
        Span::raw(" ".repeat(indent)),
        Span::raw("["),
        Span::styled(button, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }
    if let Some(ref success) = form.success {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", success), styles::success_style())));
    }

    if let Some(footer) = footer(app.screen) {
        lines.push(Line::from(""));
        lines.push(footer);
    }
    if app.screen == Screen::Login {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled("Forgot your password? ", styles::muted_style()),
            Span::styled("^F", styles::help_key_style()),
        ]));
    }

    let height = lines.len() as u16 + 2;
    let rect = centered_rect_fixed(FORM_WIDTH + 10, height, area);
    frame.render_widget(Clear, rect);

    let block = Block::default()
        .title(format!(" {} ", app.screen.title()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        rect,
    );
}

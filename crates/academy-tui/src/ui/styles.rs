use academy_core::models::Role;
use ratatui::style::{Color, Modifier, Style};

// Palette
pub const BRAND: Color = Color::Rgb(37, 99, 235);
pub const GOOD: Color = Color::Rgb(34, 160, 94);
pub const WARN: Color = Color::Rgb(217, 160, 40);
pub const BAD: Color = Color::Rgb(210, 60, 60);
pub const DIM: Color = Color::Rgb(120, 124, 134);
pub const ROW_BG: Color = Color::Rgb(30, 41, 59);
pub const TEXT: Color = Color::Rgb(226, 232, 240);

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

pub fn title_style() -> Style {
    fg(BRAND).add_modifier(Modifier::BOLD)
}

pub fn selected_style() -> Style {
    Style::default().bg(ROW_BG).add_modifier(Modifier::BOLD)
}

pub fn list_item_style() -> Style {
    fg(TEXT)
}

pub fn muted_style() -> Style {
    fg(DIM)
}

pub fn highlight_style() -> Style {
    fg(WARN)
}

pub fn success_style() -> Style {
    fg(GOOD)
}

pub fn error_style() -> Style {
    fg(BAD)
}

pub fn search_style() -> Style {
    fg(WARN).add_modifier(Modifier::ITALIC)
}

/// Current screen in the tab strip
pub fn tab_style(selected: bool) -> Style {
    if selected {
        title_style().add_modifier(Modifier::UNDERLINED)
    } else {
        muted_style()
    }
}

pub fn border_style(focused: bool) -> Style {
    fg(if focused { BRAND } else { DIM })
}

pub fn status_bar_style() -> Style {
    Style::default().bg(Color::Rgb(15, 23, 42)).fg(TEXT)
}

pub fn help_key_style() -> Style {
    fg(WARN).add_modifier(Modifier::BOLD)
}

pub fn help_desc_style() -> Style {
    fg(TEXT)
}

/// Role badge colors in the users table
pub fn role_style(role: Role) -> Style {
    match role {
        Role::Admin => fg(BAD).add_modifier(Modifier::BOLD),
        Role::ContentManager => fg(BRAND),
        Role::MarketingManager => fg(WARN),
        Role::Student => fg(GOOD),
    }
}

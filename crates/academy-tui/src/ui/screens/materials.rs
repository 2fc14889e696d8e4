use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use crate::app::{App, AppState};
use crate::ui::styles;

/// Render the free-material library: filter bar, table and detail pane
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    render_filter_bar(frame, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(rows[1]);

    render_table(frame, app, columns[0]);
    render_detail(frame, app, columns[1]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let searching = matches!(app.state, AppState::Searching);
    let search = if searching {
        format!("{}▌", app.filter.search)
    } else if app.filter.search.is_empty() {
        "Search by title...".to_string()
    } else {
        app.filter.search.clone()
    };
    let search_style = if searching || !app.filter.search.is_empty() {
        styles::search_style()
    } else {
        styles::muted_style()
    };

    let line = Line::from(vec![
        Span::styled(" / ", styles::help_key_style()),
        Span::styled(search, search_style),
        Span::raw("    "),
        Span::styled("[c] ", styles::help_key_style()),
        Span::styled(app.filter.category_label(&app.categories).to_string(), styles::highlight_style()),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(searching));
    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_table(frame: &mut Frame, app: &App, area: Rect) {
    let materials = app.filtered_materials();

    let title = if app.catalog_loading && app.materials.is_empty() {
        " Loading resources... ".to_string()
    } else {
        format!(" Resources ({}/{}) ", materials.len(), app.materials.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if materials.is_empty() && !app.catalog_loading {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  No resources found matching your criteria.",
            styles::muted_style(),
        )))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new([
        Cell::from("Title"),
        Cell::from("Category"),
        Cell::from("Size"),
        Cell::from("Downloads"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = materials
        .iter()
        .enumerate()
        .map(|(i, material)| {
            let style = if i == app.material_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(material.title.clone()),
                Cell::from(material.category_name().to_string()),
                Cell::from(
                    material
                        .size_kb
                        .map(|kb| format!("{:>6} KB", kb))
                        .unwrap_or_else(|| "     ? KB".to_string()),
                ),
                Cell::from(format!("{:>9}", material.downloads)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(2),
        Constraint::Length(9),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.material_selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(material) = app.selected_material() else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(material.title.clone(), styles::title_style())),
        Line::from(Span::styled(material.summary(), styles::muted_style())),
        Line::from(""),
    ];
    if let Some(ref description) = material.description {
        lines.push(Line::from(description.clone()));
        lines.push(Line::from(""));
    }

    let action = if app.download_pending {
        Line::from(Span::styled("Preparing download...", styles::muted_style()))
    } else if app.session.is_authenticated() {
        Line::from(vec![
            Span::styled("[d] ", styles::help_key_style()),
            Span::styled("Download", styles::help_desc_style()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[l] ", styles::help_key_style()),
            Span::styled("Login to download", styles::help_desc_style()),
        ])
    };
    lines.push(action);

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

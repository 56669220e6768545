//! Home screen: lock status and settings

use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, Paragraph};

use crate::app::{App, MenuItem};
use crate::ui::layout::{render_footer, render_header, render_status_bar, section_block, ScreenLayout};

/// Render the home screen
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let layout = ScreenLayout::new(frame.area());

    render_header(frame, layout.header, Some("Home"), theme);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(layout.content);

    render_status(frame, columns[0], app);
    render_menu(frame, columns[1], app);

    if app.state.unlock_banner > 0 && app.state.error_message.is_none() {
        let banner = Paragraph::new("✓ Unlocked")
            .style(theme.success())
            .alignment(Alignment::Center);
        frame.render_widget(banner, layout.status);
    } else {
        render_status_bar(
            frame,
            layout.status,
            app.state.status_message.as_deref(),
            app.state.error_message.as_deref(),
            theme,
        );
    }

    render_footer(
        frame,
        layout.footer,
        &[("↑↓", "Select"), ("Enter", "Toggle"), ("l", "Lock"), ("?", "Help"), ("q", "Quit")],
        theme,
    );
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let settings = app.settings();

    let on_off = |on: bool| if on { "On" } else { "Off" };
    let row = |label: &'static str, value: String, style: Style| {
        Line::from(vec![
            Span::styled(format!("  {:<14}", label), theme.text_secondary()),
            Span::styled(value, style),
        ])
    };

    let last_unlock = app
        .unlocked_at()
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());

    let lines = vec![
        Line::from(""),
        row(
            "Passcode",
            if app.passcode_set() { "Set" } else { "Not set" }.to_string(),
            theme.toggle(app.passcode_set()),
        ),
        row(
            "Lock",
            on_off(settings.passcode_lock_enabled()).to_string(),
            theme.toggle(settings.passcode_lock_enabled()),
        ),
        row(
            "Fingerprint",
            on_off(settings.touch_biometric_enabled()).to_string(),
            theme.toggle(settings.touch_biometric_enabled()),
        ),
        row(
            "Face",
            on_off(settings.face_biometric_enabled()).to_string(),
            theme.toggle(settings.face_biometric_enabled()),
        ),
        Line::from(""),
        row("Last unlock", last_unlock, theme.text()),
    ];

    let status = Paragraph::new(lines).block(section_block("Status", theme));
    frame.render_widget(status, area);
}

fn render_menu(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let selected = app.state.selected_item();

    let items: Vec<ListItem> = MenuItem::ALL
        .iter()
        .map(|item| {
            let is_selected = *item == selected;
            let marker = if is_selected { "▸ " } else { "  " };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{}{:<18}", marker, item.label()), theme.menu_item(is_selected)),
                Span::styled(format!("[{}]", item.shortcut()), theme.text_muted()),
            ]))
        })
        .collect();

    frame.render_widget(List::new(items).block(section_block("Settings", theme)), area);
}

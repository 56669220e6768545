//! Lock screen covering the whole terminal until the user unlocks

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use passgate_core::PromptState;

use crate::app::App;
use crate::auth::{LockScreen, LockoutPolicy};
use crate::ui::components::passcode_dots;
use crate::ui::layout::centered_rect_fixed;

/// Draw the lock screen
pub fn render(frame: &mut Frame, app: &App, lock: &LockScreen) {
    let theme = &app.theme;
    let area = frame.area();

    // Nothing behind the lock screen may show through
    frame.render_widget(Clear, area);
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let dialog = centered_rect_fixed(52, 16, area);
    let block = Block::default()
        .title(" Locked ")
        .title_style(theme.title())
        .borders(Borders::ALL)
        .border_style(theme.border_focused());

    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Title
            Constraint::Length(2), // Instructions
            Constraint::Length(2), // Dots
            Constraint::Length(2), // Error
            Constraint::Length(2), // Biometric status
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let title = Paragraph::new("◆ PASSGATE")
        .style(theme.title())
        .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let instructions = Paragraph::new("Enter your passcode to unlock")
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[1]);

    passcode_dots::render(frame, chunks[2], lock.input_len(), theme);

    let error = match lock.lockout_remaining() {
        Some(remaining) => Some(format!(
            "Locked out. Try again in {}",
            LockoutPolicy::describe(remaining)
        )),
        None => lock
            .error()
            .or(app.state.error_message.as_deref())
            .map(str::to_string),
    };
    if let Some(error) = error {
        let error_widget = Paragraph::new(error)
            .style(theme.danger())
            .alignment(Alignment::Center);
        frame.render_widget(error_widget, chunks[3]);
    }

    if let Some((text, style)) = biometric_status(app) {
        let widget = Paragraph::new(text).style(style).alignment(Alignment::Center);
        frame.render_widget(widget, chunks[4]);
    }

    let help = if app.settings().biometrics_enabled() {
        "[Enter] Unlock  [b] Biometrics  [Esc] Quit"
    } else {
        "[Enter] Unlock  [Esc] Quit"
    };
    let help_widget = Paragraph::new(help)
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help_widget, chunks[6]);
}

fn biometric_status(app: &App) -> Option<(&'static str, Style)> {
    let theme = &app.theme;
    match app.session().prompt_state() {
        PromptState::InFlight { .. } => {
            Some(("Waiting for biometric verification…", theme.info()))
        }
        PromptState::Suppressed if app.settings().biometrics_enabled() => {
            Some(("Biometric unlock failed. Press [b] to retry", theme.warning()))
        }
        _ => None,
    }
}

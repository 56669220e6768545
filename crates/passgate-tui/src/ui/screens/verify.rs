//! Current passcode check before changing or removing it

use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::{App, Verification};
use crate::auth::LockoutPolicy;
use crate::ui::components::passcode_dots;
use crate::ui::layout::{centered_rect_fixed, section_block_focused};

/// Draw the verification dialog over the home screen
pub fn render(frame: &mut Frame, app: &App, verification: &Verification) {
    let theme = &app.theme;
    let dialog = centered_rect_fixed(50, 11, frame.area());

    frame.render_widget(Clear, dialog);
    let block = section_block_focused(verification.action.title(), theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Prompt
            Constraint::Length(2), // Dots
            Constraint::Length(2), // Error
            Constraint::Min(0),
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let prompt = Paragraph::new("Enter your current passcode")
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(prompt, chunks[0]);

    let screen = &verification.screen;
    passcode_dots::render(frame, chunks[1], screen.input_len(), theme);

    let error = match screen.lockout_remaining() {
        Some(remaining) => Some(format!(
            "Locked out. Try again in {}",
            LockoutPolicy::describe(remaining)
        )),
        None => screen.error().map(str::to_string),
    };
    if let Some(error) = error {
        let error_widget = Paragraph::new(error)
            .style(theme.danger())
            .alignment(Alignment::Center);
        frame.render_widget(error_widget, chunks[2]);
    }

    let help_widget = Paragraph::new("[Enter] Confirm  [Esc] Cancel")
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help_widget, chunks[4]);
}

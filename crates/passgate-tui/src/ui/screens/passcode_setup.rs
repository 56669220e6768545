//! Passcode creation dialog

use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::App;
use crate::auth::{PasscodeSetup, SetupStep, MAX_PASSCODE_LENGTH, MIN_PASSCODE_LENGTH};
use crate::ui::components::passcode_dots;
use crate::ui::layout::{centered_rect_fixed, section_block_focused};

/// Draw the setup dialog over the home screen
pub fn render(frame: &mut Frame, app: &App, setup: &PasscodeSetup) {
    let theme = &app.theme;
    let dialog = centered_rect_fixed(50, 12, frame.area());

    frame.render_widget(Clear, dialog);
    let block = section_block_focused("Set Passcode", theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Step indicator
            Constraint::Length(2), // Dots
            Constraint::Length(2), // Error
            Constraint::Min(0),    // Spacer
            Constraint::Length(1), // Help
        ])
        .split(inner);

    let (step, prompt) = match setup.step() {
        SetupStep::Create => (
            "Step 1/2",
            format!(
                "Enter a new passcode ({}-{} digits)",
                MIN_PASSCODE_LENGTH, MAX_PASSCODE_LENGTH
            ),
        ),
        SetupStep::Confirm => ("Step 2/2", "Enter the passcode again".to_string()),
    };

    let header = Paragraph::new(vec![
        Line::from(Span::styled(step, theme.text_muted())),
        Line::from(Span::styled(prompt, theme.text_secondary())),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(header, chunks[0]);

    passcode_dots::render(frame, chunks[1], setup.input_len(), theme);

    if let Some(error) = setup.error() {
        let error_widget = Paragraph::new(error)
            .style(theme.danger())
            .alignment(Alignment::Center);
        frame.render_widget(error_widget, chunks[2]);
    }

    let help = match setup.step() {
        SetupStep::Create => "[Enter] Continue  [Esc] Cancel",
        SetupStep::Confirm => "[Enter] Save  [Esc] Back",
    };
    let help_widget = Paragraph::new(help)
        .style(theme.text_muted())
        .alignment(Alignment::Center);
    frame.render_widget(help_widget, chunks[4]);
}

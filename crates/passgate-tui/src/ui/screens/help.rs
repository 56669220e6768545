//! Help overlay

use ratatui::prelude::*;
use ratatui::widgets::{Clear, Paragraph};

use crate::app::App;
use crate::ui::layout::{centered_rect, section_block_focused};

/// Render the help overlay
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = centered_rect(70, 80, frame.area());

    let heading = |text: &'static str| Line::from(Span::styled(text, theme.text_highlight()));

    let content = Paragraph::new(vec![
        Line::from(""),
        heading("  Home:"),
        Line::from("    j/k or Up/Down  - Move selection"),
        Line::from("    Enter / Space   - Toggle or run the selected entry"),
        Line::from("    p               - Toggle passcode lock"),
        Line::from("    t / f           - Toggle fingerprint / face unlock"),
        Line::from("    c               - Change passcode"),
        Line::from("    r               - Remove passcode"),
        Line::from("    l               - Lock now"),
        Line::from("    q               - Quit"),
        Line::from(""),
        heading("  Lock screen:"),
        Line::from("    0-9             - Enter passcode"),
        Line::from("    Backspace       - Delete last digit"),
        Line::from("    Enter           - Unlock"),
        Line::from("    b               - Retry biometric unlock"),
        Line::from("    Esc             - Quit without unlocking"),
        Line::from(""),
        heading("  Locking:"),
        Line::from("    With the passcode lock on, Passgate locks at start"),
        Line::from("    and whenever the terminal regains focus."),
        Line::from("    Biometric unlock is tried automatically once per"),
        Line::from("    lock; after a failure press [b] to try again."),
    ])
    .style(theme.text())
    .block(section_block_focused("Help", theme));

    frame.render_widget(Clear, area);
    frame.render_widget(content, area);
}

//! Masked passcode display

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::auth::{MAX_PASSCODE_LENGTH, MIN_PASSCODE_LENGTH};
use crate::ui::Theme;

/// Build the dot line for `entered` digits
///
/// Shows at least the minimum passcode length worth of placeholders and
/// grows with the entry up to the maximum.
pub fn dots_line(entered: usize, theme: &Theme) -> Line<'static> {
    let slots = entered
        .saturating_add(1)
        .clamp(MIN_PASSCODE_LENGTH, MAX_PASSCODE_LENGTH);

    let mut spans = Vec::with_capacity(slots * 2 + 2);
    spans.push(Span::styled("[ ", theme.text_muted()));
    for i in 0..slots {
        if i < entered {
            spans.push(Span::styled("●", theme.passcode_dot()));
        } else {
            spans.push(Span::styled("○", theme.passcode_placeholder()));
        }
        if i + 1 < slots {
            spans.push(Span::raw(" "));
        }
    }
    spans.push(Span::styled(" ]", theme.text_muted()));

    Line::from(spans)
}

/// Render the dot line centered in `area`
pub fn render(frame: &mut Frame, area: Rect, entered: usize, theme: &Theme) {
    let widget = Paragraph::new(dots_line(entered, theme)).alignment(Alignment::Center);
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[rstest]
    #[case(0, "[ ○ ○ ○ ○ ]")]
    #[case(2, "[ ● ● ○ ○ ]")]
    #[case(5, "[ ● ● ● ● ● ○ ]")]
    #[case(12, "[ ● ● ● ● ● ● ● ● ● ● ● ● ]")]
    fn test_dots_line(#[case] entered: usize, #[case] expected: &str) {
        let theme = Theme::default();
        assert_eq!(text(&dots_line(entered, &theme)), expected);
    }
}

//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use ratatui::prelude::*;

use crate::app::{App, Modal};

/// Main render function - the lock screen hides everything else
pub fn render(frame: &mut Frame, app: &App) {
    if let Some(Modal::Lock(lock)) = &app.state.modal {
        screens::lock_screen::render(frame, app, lock);
        return;
    }

    screens::home::render(frame, app);

    match &app.state.modal {
        Some(Modal::Setup(setup)) => screens::passcode_setup::render(frame, app, setup),
        Some(Modal::Verify(verification)) => screens::verify::render(frame, app, verification),
        Some(Modal::Help) => screens::help::render(frame, app),
        _ => {}
    }
}

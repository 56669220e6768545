//! Reusable UI components

pub mod passcode_dots;

//! Screen modules for different views

pub mod help;
pub mod home;
pub mod lock_screen;
pub mod passcode_setup;
pub mod verify;

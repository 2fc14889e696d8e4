//! Terminal UI module using ratatui.
//!
//! - `render`: frame layout, title/status bars and overlays
//! - `input`: keyboard event handling
//! - `styles`: colors and text styling
//! - `screens`: per-screen content (forms, free material, admin users)

pub mod input;
pub mod render;
pub mod screens;
pub mod styles;

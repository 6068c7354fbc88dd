//! Custom widgets for the TUI.

pub mod catalog;
pub mod editor;
pub mod header;
pub mod table;

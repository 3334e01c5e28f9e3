//! File-selection dialogs, a resizable multi-column file list, breadcrumb
//! path editing, a directory tree and cascading menus for ratatui
//! applications, plus the demo host that drives them.

pub mod app;
pub mod breadcrumb;
pub mod components;
pub mod config;
pub mod dialog;
pub mod error;
pub mod event;
pub mod focus;
pub mod fs;
pub mod handler;
pub mod input;
pub mod list;
pub mod logging;
pub mod menu;
pub mod selector;
pub mod theme;
pub mod tui;
pub mod ui;

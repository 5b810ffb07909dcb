//! Text-menu front end: a main menu with one submenu per record type, each leaf
//! collecting answers from the input stream and printing a summary.

mod console;
mod helpers;
mod menus;
mod prompt;
mod screens;

pub use console::Console;

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use crossterm::style::Color;
use tracing::{debug, info, warn};

use crate::db::Database;
use crate::error::HospitalError;

use super::helpers::{paint, surface_error};
use super::menus::{Menu, MAIN_MENU};
use super::prompt::read_answer;

/// Consecutive unreadable menu answers tolerated before the session gives up
/// on the input stream.
const MAX_MENU_READ_FAILURES: u32 = 3;

/// Interactive session over any line reader and writer. The binary passes
/// locked stdin/stdout; tests pass byte buffers.
pub struct Console<'a, R, W> {
    pub(crate) db: &'a Database,
    input: R,
    output: W,
    color: bool,
    read_failures: u32,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    /// Colour is off until [`Console::with_color`] turns it on.
    pub fn new(db: &'a Database, input: R, output: W) -> Self {
        Self {
            db,
            input,
            output,
            color: false,
            read_failures: 0,
        }
    }

    /// Turn ANSI colouring of status lines on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Show the main menu until the user picks Exit or input runs out.
    pub fn run(&mut self) -> Result<()> {
        self.say("Welcome to Hospital Administration System (Console Version)")?;

        match self.main_loop() {
            Err(err) if is_input_closed(&err) => {
                info!("input closed, leaving main menu");
                self.say("")?;
                self.say("Input closed. Exiting...")
            }
            other => other,
        }
    }

    fn main_loop(&mut self) -> Result<()> {
        loop {
            self.say("")?;
            self.say("===== Main Menu =====")?;
            for (key, submenu) in MAIN_MENU.iter() {
                self.say(&format!("{key}. {}", submenu.title))?;
            }
            self.say("0. Exit")?;

            let Some(choice) = self.ask_choice()? else {
                continue;
            };
            let choice = choice.trim();
            if choice == "0" {
                return self.say("Exiting... Goodbye!");
            }

            match MAIN_MENU.iter().find(|(key, _)| *key == choice) {
                Some((_, submenu)) => self.submenu_loop(submenu)?,
                None => self.say("Invalid choice, try again.")?,
            }
        }
    }

    fn submenu_loop(&mut self, menu: &Menu) -> Result<()> {
        loop {
            self.say("")?;
            self.say(&format!("=== {} ===", menu.title))?;
            for (key, label, _) in menu.entries {
                self.say(&format!("{key}. {label}"))?;
            }
            self.say("0. Back to main menu")?;

            let Some(choice) = self.ask_choice()? else {
                continue;
            };
            let choice = choice.trim();
            if choice == "0" {
                return Ok(());
            }

            let Some((_, _, action)) = menu.entries.iter().find(|(key, _, _)| *key == choice)
            else {
                self.say("Invalid choice, try again.")?;
                continue;
            };

            // A failed operation ends only itself; the menu keeps going.
            if let Err(err) = self.perform(*action) {
                if is_input_closed(&err) {
                    return Err(err);
                }
                debug!(error = ?err, ?action, "operation aborted");
                self.failure(&surface_error(&err))?;
            }
        }
    }

    /// Read a menu choice. An unreadable line (for example invalid UTF-8) is
    /// reported like a failed operation and yields `None` so the menu is shown
    /// again. End of input, write failures, and a stream that keeps failing
    /// still end the session.
    fn ask_choice(&mut self) -> Result<Option<String>> {
        match self.ask("Enter choice") {
            Ok(choice) => {
                self.read_failures = 0;
                Ok(Some(choice))
            }
            Err(err) if is_input_closed(&err) => Err(err),
            Err(err) => {
                self.read_failures += 1;
                if self.read_failures >= MAX_MENU_READ_FAILURES {
                    return Err(err);
                }
                warn!(error = ?err, "unreadable menu choice");
                self.failure(&surface_error(&err))?;
                Ok(None)
            }
        }
    }

    /// Print `label: ` and return the raw answer.
    pub(crate) fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}: ").context("failed to write prompt")?;
        self.output.flush().context("failed to flush prompt")?;
        read_answer(&mut self.input)
    }

    pub(crate) fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{line}").context("failed to write output")
    }

    pub(crate) fn success(&mut self, message: &str) -> Result<()> {
        let line = paint(message, Color::Green, self.color);
        self.say(&line)
    }

    pub(crate) fn failure(&mut self, message: &str) -> Result<()> {
        let line = paint(message, Color::Red, self.color);
        self.say(&line)
    }
}

fn is_input_closed(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<HospitalError>(),
        Some(HospitalError::InputClosed)
    )
}

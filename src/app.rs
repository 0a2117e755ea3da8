use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use termion::event::Key;
use termion::{clear, cursor, style};

use crate::actions::{self, Action, Command};
use crate::config::Config;
use crate::engine::DateEngine;
use crate::error::{Error, ErrorKind, Result};
use crate::events::{Dispatcher, Event};
use crate::grid::MonthGrid;
use crate::navigation::NavigationController;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App<'a, E: DateEngine> {
    config: &'a Config,
    navigation: NavigationController<E>,
    mode: Mode,
    status: Option<String>,
}

impl<'a, E: DateEngine> App<'a, E> {
    const CELL_WIDTH: usize = 5;

    pub fn new(config: &'a Config, navigation: NavigationController<E>) -> Self {
        App {
            config,
            navigation,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn grid(&self) -> &MonthGrid {
        self.navigation.grid()
    }

    pub fn navigation(&self) -> &NavigationController<E> {
        &self.navigation
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Runs `action` `repeat` times. Navigation steps are applied as a single
    /// transition.
    pub fn perform(&mut self, action: Action, repeat: u32) -> Result<Flow> {
        let steps = i32::try_from(repeat).map_err(|_| {
            Error::new(
                ErrorKind::CommandParse,
                &format!("repeat count {} is too large", repeat),
            )
        })?;

        match action {
            Action::PreviousMonth => self.navigation.step_month(-steps).map(|_| ())?,
            Action::NextMonth => self.navigation.step_month(steps).map(|_| ())?,
            Action::PreviousYear => self.navigation.step_year(-steps).map(|_| ())?,
            Action::NextYear => self.navigation.step_year(steps).map(|_| ())?,
            Action::GoToToday => self.navigation.go_to_today().map(|_| ())?,
            Action::CopyToClipboard => {
                let path = self.export()?;
                self.status = Some(format!("Copied to '{}'", path.display()));
            }
            Action::OpenPreferences => {
                self.status = Some(match self.config.preferences_path() {
                    Some(path) => format!("Preferences: '{}'", path.display()),
                    None => "No location for preferences found".to_owned(),
                });
            }
            Action::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }

    pub fn run_command(&mut self, cmd: &str) -> Result<Flow> {
        match actions::parse_command(cmd)? {
            Command::Run(action, repeat) => self.perform(action, repeat),
            Command::GoTo(displayed) => {
                self.navigation.jump_to(displayed)?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Writes the current month as markdown to the export file.
    pub fn export(&self) -> Result<PathBuf> {
        let path = self.config.export_path().ok_or_else(|| {
            Error::new(
                ErrorKind::IOError(io::Error::from(io::ErrorKind::NotFound)),
                "no export file configured",
            )
        })?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(&path, self.grid().to_markdown())?;

        log::info!("Exported {} to '{}'", self.grid().header(), path.display());
        Ok(path)
    }

    fn handle_command_key(&mut self, key: Key) -> Result<Flow> {
        match key {
            Key::Esc => self.mode = Mode::Normal,
            Key::Char('\n') => {
                if let Mode::Command(cmd) = std::mem::replace(&mut self.mode, Mode::Normal) {
                    return self.run_command(&cmd);
                }
            }
            Key::Backspace => {
                if let Mode::Command(line) = &mut self.mode {
                    line.pop();
                }
            }
            Key::Char(c) => {
                if let Mode::Command(line) = &mut self.mode {
                    line.push(c);
                }
            }
            _ => {}
        }

        Ok(Flow::Continue)
    }

    fn handle_normal_key(&mut self, key: Key) -> Result<Flow> {
        if key == Key::Char(':') {
            self.mode = Mode::Command(String::new());
            self.status = None;
            Ok(Flow::Continue)
        } else if let Some(&action) = self.config.key_map.get(&key) {
            self.status = None;
            self.perform(action, 1)
        } else {
            Ok(Flow::Continue)
        }
    }

    pub fn handle_key(&mut self, key: Key) -> Flow {
        let result = match self.mode {
            Mode::Command(_) => self.handle_command_key(key),
            Mode::Normal => self.handle_normal_key(key),
        };

        result.unwrap_or_else(|err| {
            log::warn!("{}", err);
            self.status = Some(err.to_string());
            Flow::Continue
        })
    }

    /// Regenerates the grid so the today marker follows the clock.
    pub fn tick(&mut self) {
        if let Err(err) = self.navigation.refresh() {
            log::warn!("Could not refresh calendar: {}", err);
        }
    }

    fn key_hint(&self, action: Action) -> Option<char> {
        self.config
            .key_map
            .iter()
            .filter_map(|(key, act)| match key {
                Key::Char(c) if *act == action => Some(*c),
                _ => None,
            })
            .min()
    }

    pub fn draw<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let grid = self.grid();
        let locale = grid.locale();

        write!(out, "{}{}", clear::All, cursor::Goto(1, 1))?;
        write!(out, "{}{}{}\r\n", style::Bold, grid.header(), style::Reset)?;

        for label in grid.weekday_labels() {
            write!(out, "{:>width$}", label, width = Self::CELL_WIDTH)?;
        }
        write!(out, "\r\n")?;

        for week in grid.weeks() {
            for cell in week {
                let label = format!(
                    "{:>width$}",
                    cell.label(locale),
                    width = Self::CELL_WIDTH
                );
                if cell.is_today() {
                    write!(out, "{}{}{}", style::Invert, label, style::Reset)?;
                } else {
                    write!(out, "{}", label)?;
                }
            }
            write!(out, "\r\n")?;
        }
        write!(out, "\r\n")?;

        for action in Action::NAMED.iter() {
            if let Some(key) = self.key_hint(*action) {
                write!(out, "[{}] {}  ", key, action.label(locale))?;
            }
        }
        write!(out, "[:] command  [q] quit\r\n")?;

        if let Some(status) = &self.status {
            write!(out, "{}\r\n", status)?;
        }

        if let Mode::Command(line) = &self.mode {
            write!(out, ":{}", line)?;
        }

        Ok(())
    }

    pub fn run<W: Write>(&mut self, dispatcher: &Dispatcher, out: &mut W) -> Result<()> {
        self.draw(out)?;
        out.flush()?;

        while let Ok(event) = dispatcher.next() {
            let flow = match event {
                Event::Input(key) => self.handle_key(key),
                Event::Tick => {
                    self.tick();
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                break;
            }

            self.draw(out)?;
            out.flush()?;
        }

        Ok(())
    }
}

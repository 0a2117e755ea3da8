use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit1, space1},
    combinator::{all_consuming, map, map_res, opt, recognize, verify},
    error::{Error as NomError, ErrorKind as NomErrorKind},
    sequence::{pair, preceded, separated_pair},
    Err, IResult,
};

use crate::error::{Error, ErrorKind, Result};
use crate::locale::{self, Locale};
use crate::navigation::DisplayedMonth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    GoToToday,
    CopyToClipboard,
    PreviousMonth,
    NextMonth,
    PreviousYear,
    NextYear,
    OpenPreferences,
    Quit,
}

impl Action {
    /// Actions offered to the user, in display order.
    pub const NAMED: [Action; 7] = [
        Action::PreviousMonth,
        Action::NextMonth,
        Action::PreviousYear,
        Action::NextYear,
        Action::GoToToday,
        Action::CopyToClipboard,
        Action::OpenPreferences,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Action::GoToToday => "go-to-today",
            Action::CopyToClipboard => "copy-to-clipboard",
            Action::PreviousMonth => "previous-month",
            Action::NextMonth => "next-month",
            Action::PreviousYear => "previous-year",
            Action::NextYear => "next-year",
            Action::OpenPreferences => "open-preferences",
            Action::Quit => "quit",
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        locale::lookup(locale)
            .action_label(self.id())
            .unwrap_or_else(|| self.id())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Run(Action, u32),
    GoTo(DisplayedMonth),
}

const COMMANDS: &[(&str, Action)] = &[
    ("go-to-today", Action::GoToToday),
    ("today", Action::GoToToday),
    ("t", Action::GoToToday),
    ("copy-to-clipboard", Action::CopyToClipboard),
    ("copy", Action::CopyToClipboard),
    ("previous-month", Action::PreviousMonth),
    ("pm", Action::PreviousMonth),
    ("next-month", Action::NextMonth),
    ("nm", Action::NextMonth),
    ("previous-year", Action::PreviousYear),
    ("py", Action::PreviousYear),
    ("next-year", Action::NextYear),
    ("ny", Action::NextYear),
    ("open-preferences", Action::OpenPreferences),
    ("prefs", Action::OpenPreferences),
    ("quit", Action::Quit),
    ("q", Action::Quit),
];

/// Largest count accepted in front of a command.
pub const MAX_REPEAT: u32 = 9999;

fn action_name(input: &str) -> IResult<&str, Action> {
    let (rest, name) = take_while1(|c: char| c.is_ascii_alphabetic() || c == '-')(input)?;

    match COMMANDS.iter().find(|(cmd, _)| *cmd == name) {
        Some((_, act)) => Ok((rest, *act)),
        None => Err(Err::Error(NomError::new(input, NomErrorKind::Tag))),
    }
}

fn repeated_action(input: &str) -> IResult<&str, Command> {
    map(
        pair(
            opt(verify(map_res(digit1, str::parse::<u32>), |n: &u32| {
                (1..=MAX_REPEAT).contains(n)
            })),
            action_name,
        ),
        |(repeat, act)| Command::Run(act, repeat.unwrap_or(1)),
    )(input)
}

fn goto(input: &str) -> IResult<&str, Command> {
    map(
        preceded(
            pair(tag("goto"), space1),
            separated_pair(
                map_res(recognize(pair(opt(char('-')), digit1)), str::parse::<i32>),
                space1,
                verify(map_res(digit1, str::parse::<i32>), |m: &i32| {
                    (1..=12).contains(m)
                }),
            ),
        ),
        |(year, month)| Command::GoTo(DisplayedMonth::new(year, month - 1)),
    )(input)
}

/// Parses a command line such as `next-month`, `3nm` or `goto 2081 4`
/// (months are 1-based here).
pub fn parse_command(cmd: &str) -> Result<Command> {
    let cmd = cmd.trim();

    all_consuming(alt((goto, repeated_action)))(cmd)
        .map(|(_, command)| command)
        .map_err(|_| Error::new(ErrorKind::CommandParse, &format!("'{}'", cmd)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_commands() {
        assert_eq!(
            parse_command("next-month").unwrap(),
            Command::Run(Action::NextMonth, 1)
        );
        assert_eq!(
            parse_command(" today ").unwrap(),
            Command::Run(Action::GoToToday, 1)
        );
        assert_eq!(parse_command("q").unwrap(), Command::Run(Action::Quit, 1));
    }

    #[test]
    fn repeat_counts() {
        assert_eq!(
            parse_command("3nm").unwrap(),
            Command::Run(Action::NextMonth, 3)
        );
        assert_eq!(
            parse_command("12previous-year").unwrap(),
            Command::Run(Action::PreviousYear, 12)
        );
        assert!(parse_command("0nm").is_err());
        assert_eq!(
            parse_command("9999pm").unwrap(),
            Command::Run(Action::PreviousMonth, MAX_REPEAT)
        );
        assert!(parse_command("10000pm").is_err());
        assert!(parse_command("4294967295nm").is_err());
        assert!(parse_command("99999999999999999999ny").is_err());
    }

    #[test]
    fn goto_command() {
        assert_eq!(
            parse_command("goto 2081 4").unwrap(),
            Command::GoTo(DisplayedMonth::new(2081, 3))
        );
        assert!(parse_command("goto 2081 13").is_err());
        assert!(parse_command("goto 2081").is_err());
    }

    #[test]
    fn unknown_commands() {
        let err = parse_command("rewind").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::CommandParse));
        assert!(parse_command("").is_err());
        assert!(parse_command("nm please").is_err());
    }

    #[test]
    fn localized_labels() {
        assert_eq!(Action::NextYear.label(Locale::En), "Next Year");
        assert_eq!(Action::GoToToday.label(Locale::Np), "आज");
        assert_eq!(Action::Quit.label(Locale::Np), "quit");

        for act in Action::NAMED.iter() {
            assert!(locale::lookup(Locale::Np).action_label(act.id()).is_some());
        }
    }
}

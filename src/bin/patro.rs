extern crate patro as lib;

use flexi_logger::{FileSpec, Logger};
use lib::app::App;
use lib::engine::{DateEngine, TableEngine};
use lib::events::Dispatcher;
use lib::locale::{Locale, WeekStart};
use lib::navigation::{DisplayedMonth, NavigationController};
use std::io::{stdout, Write};
use std::path::PathBuf;
use structopt::StructOpt;
use termion::raw::IntoRawMode;
use termion::screen::AlternateScreen;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "patro",
    about = "Month view of the Bikram Sambat calendar in the terminal."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the month non-interactively"
    )]
    pub show: bool,

    #[structopt(
        short = "m",
        long = "markdown",
        help = "only print the month as markdown table"
    )]
    pub markdown: bool,

    #[structopt(short = "l", long = "language", help = "labels and numerals: en or np")]
    pub language: Option<Locale>,

    #[structopt(
        short = "w",
        long = "week-start",
        help = "first column: 0/sunday or 1/monday"
    )]
    pub week_start: Option<WeekStart>,

    #[structopt(long = "year", help = "year to show first")]
    pub year: Option<i32>,

    #[structopt(long = "month", help = "month to show first (1 = Baisakh)")]
    pub month: Option<u32>,

    #[structopt(
        short = "d",
        long = "calendar-data",
        help = "path to calendar data file",
        parse(from_os_str)
    )]
    pub calendar_data: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &'static str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    if let Some(log_file) = &args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    } else {
        // stderr would end up in the middle of the calendar
        logger = logger.do_not_log();
    }

    let _logger = logger.start()?;

    let mut config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    if let Some(language) = args.language {
        config.language = language;
    }
    if let Some(week_start) = args.week_start {
        config.week_start = week_start;
    }
    if let Some(path) = args.calendar_data {
        config.calendar_data = Some(path);
    }

    let data_path = config.calendar_data.clone().ok_or(
        "no calendar data configured, use --calendar-data or set 'calendar_data' in the config file",
    )?;
    let engine = TableEngine::from_file(&data_path)?;

    let navigation = if args.year.is_some() || args.month.is_some() {
        if let Some(month) = args.month {
            if !(1..=12).contains(&month) {
                return Err(format!("month {} is not in 1..=12", month).into());
            }
        }

        let today = engine.today().ok();
        let year = args
            .year
            .or_else(|| today.map(|date| date.year()))
            .ok_or("today is not covered by the calendar data, pass --year")?;
        let month = args
            .month
            .map(|month| month as i32 - 1)
            .or_else(|| today.map(|date| date.month() as i32))
            .unwrap_or(0);

        NavigationController::starting_at(
            engine,
            config.language,
            config.week_start,
            DisplayedMonth::new(year, month),
        )?
    } else {
        NavigationController::new(engine, config.language, config.week_start)?
    };

    if args.show {
        print!("{}", navigation.grid());
        return Ok(());
    }

    if args.markdown {
        print!("{}", navigation.grid().to_markdown());
        return Ok(());
    }

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        println!("patro ran into a fatal error!");
        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    log::info!(
        "Starting at {} ({}, week starts {:?})",
        navigation.displayed(),
        config.language,
        config.week_start
    );

    let dispatcher = Dispatcher::from_config(&config);
    let mut app = App::new(&config, navigation);

    let mut screen = AlternateScreen::from(stdout().into_raw_mode()?);
    write!(screen, "{}", termion::cursor::Hide)?;

    let result = app.run(&dispatcher, &mut screen);

    write!(screen, "{}", termion::cursor::Show)?;
    screen.flush()?;

    Ok(result?)
}

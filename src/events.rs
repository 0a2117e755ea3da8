use std::io;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use termion::event::Key;
use termion::input::TermRead;

use crate::config::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Input(Key),
    Tick,
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: Option<thread::JoinHandle<()>>,
    _tick_handle: thread::JoinHandle<()>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_config(&Config::default())
    }
}

impl Dispatcher {
    pub fn from_config(config: &Config) -> Dispatcher {
        let mut dispatcher = Self::ticking(config.tick_rate());

        let input_handle = {
            let tx = dispatcher.tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for key in stdin.keys() {
                    match key {
                        Ok(key) => {
                            if tx.send(Event::Input(key)).is_err() {
                                return;
                            }
                        }
                        Err(err) => log::warn!("Could not read input: {}", err),
                    }
                }
            })
        };
        dispatcher._input_handle = Some(input_handle);

        dispatcher
    }

    /// Dispatcher that only emits ticks. Further events can be fed through
    /// [`Dispatcher::event_sink`].
    pub fn ticking(tick_rate: Duration) -> Dispatcher {
        let (tx, rx) = mpsc::channel();

        let tick_handle = {
            let tx = tx.clone();
            thread::spawn(move || loop {
                thread::sleep(tick_rate);
                if tx.send(Event::Tick).is_err() {
                    return;
                }
            })
        };

        Dispatcher {
            rx,
            tx,
            _input_handle: None,
            _tick_handle: tick_handle,
        }
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn event_sink(&self) -> &mpsc::Sender<Event> {
        &self.tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forwards_sent_events() {
        let dispatcher = Dispatcher::ticking(Duration::from_secs(3600));
        dispatcher
            .event_sink()
            .send(Event::Input(Key::Char('l')))
            .unwrap();

        assert_eq!(dispatcher.next().unwrap(), Event::Input(Key::Char('l')));
    }

    #[test]
    fn emits_ticks() {
        let dispatcher = Dispatcher::ticking(Duration::from_millis(5));
        assert_eq!(dispatcher.next().unwrap(), Event::Tick);
    }
}

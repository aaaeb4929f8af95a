use std::sync::mpsc::{self, Receiver, RecvError};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

/// Unified event type consumed by the app loop
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of app events (keyboard, resize, timer ticks)
pub trait EventSource {
    /// Block until the next event. Returns Err once no more events can
    /// arrive (all producers gone).
    fn next(&self) -> Result<AppEvent, RecvError>;

    /// Discard everything already queued. Keystrokes typed while the app
    /// was blocked elsewhere (fetching a paragraph) must not land in the
    /// session that replaces the one they were aimed at.
    fn drain(&self);
}

/// Production event source: one thread reading crossterm input, one thread
/// emitting `Tick` at a fixed interval, multiplexed over a single channel.
///
/// The ticker runs for the life of the process; consumers gate ticks on the
/// current session's phase, so ticks arriving after a finish or across a
/// reset never touch stale state.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new(tick_interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel();

        let tick_tx = tx.clone();
        thread::spawn(move || loop {
            thread::sleep(tick_interval);
            if tick_tx.send(AppEvent::Tick).is_err() {
                break;
            }
        });

        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if tx.send(AppEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if tx.send(AppEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        Self { rx }
    }
}

impl EventSource for CrosstermEventSource {
    fn next(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }

    fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

/// Test event source fed from a plain channel, for driving the loop
/// headlessly.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl EventSource for TestEventSource {
    fn next(&self) -> Result<AppEvent, RecvError> {
        self.rx.recv()
    }

    fn drain(&self) {
        while self.rx.try_recv().is_ok() {}
    }
}

//! Time left until the announcement, and a cancellable periodic ticker.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const SECS_PER_DAY: i64 = 60 * 60 * 24;
const SECS_PER_HOUR: i64 = 60 * 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Expired,
    Remaining(TimeLeft),
}

impl Countdown {
    pub fn is_expired(self) -> bool {
        matches!(self, Countdown::Expired)
    }

    /// Zeroes once expired.
    pub fn time_left(self) -> TimeLeft {
        match self {
            Countdown::Expired => TimeLeft::default(),
            Countdown::Remaining(t) => t,
        }
    }
}

/// `target == None` (an unparseable announcement date) counts as expired.
pub fn countdown(target: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Countdown {
    let Some(target) = target else {
        return Countdown::Expired;
    };
    let diff = (target - now).num_seconds();
    if diff <= 0 {
        return Countdown::Expired;
    }
    Countdown::Remaining(TimeLeft {
        days: diff / SECS_PER_DAY,
        hours: (diff % SECS_PER_DAY) / SECS_PER_HOUR,
        minutes: (diff % SECS_PER_HOUR) / 60,
        seconds: diff % 60,
    })
}

/// Recomputes the countdown on a background thread once per period.
///
/// The callback fires immediately and then every `period` until the ticker
/// is disposed or dropped. Disposal joins the thread, so no callback runs
/// after it returns.
pub struct CountdownTicker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl CountdownTicker {
    pub fn start<F>(target: Option<DateTime<Utc>>, period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut(Countdown) + Send + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || loop {
            on_tick(countdown(target, Utc::now()));
            match stop_rx.recv_timeout(period) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });
        debug!(?target, ?period, "countdown ticker started");
        Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn dispose(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("countdown ticker thread panicked");
            } else {
                debug!("countdown ticker stopped");
            }
        }
    }
}

impl Drop for CountdownTicker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//! Game clock for the event loop.
//!
//! The session publishes a [`TickSchedule`]; the ticker rebuilds its timer
//! whenever the schedule's generation changes and stays silent while there is
//! no schedule, so a tick armed before a pause or level change never fires.

use std::future;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

use crate::game::TickSchedule;

pub struct Ticker {
    generation: Option<u64>,
    timer: Option<Interval>,
}

impl Ticker {
    pub fn new() -> Self {
        Self {
            generation: None,
            timer: None,
        }
    }

    /// Follow the session's current schedule
    pub fn sync(&mut self, schedule: Option<TickSchedule>) {
        match schedule {
            None => {
                self.generation = None;
                self.timer = None;
            }
            Some(schedule) if self.generation != Some(schedule.generation) => {
                // First tick one full interval from now, not immediately.
                let mut timer = interval_at(Instant::now() + schedule.interval, schedule.interval);
                timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.generation = Some(schedule.generation);
                self.timer = Some(timer);
            }
            Some(_) => {}
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Resolves on the next tick; never resolves while stopped
    pub async fn tick(&mut self) {
        match self.timer.as_mut() {
            Some(timer) => {
                timer.tick().await;
            }
            None => future::pending::<()>().await,
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::{advance, timeout};

    fn schedule(ms: u64, generation: u64) -> Option<TickSchedule> {
        Some(TickSchedule {
            interval: Duration::from_millis(ms),
            generation,
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_one_interval() {
        let mut ticker = Ticker::new();
        ticker.sync(schedule(100, 1));
        let start = Instant::now();

        ticker.tick().await;
        assert!(start.elapsed() >= Duration::from_millis(100));

        ticker.tick().await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_ticker_never_fires() {
        let mut ticker = Ticker::new();
        ticker.sync(schedule(100, 1));
        ticker.sync(None);

        assert!(!ticker.is_running());
        assert!(timeout(Duration::from_secs(5), ticker.tick()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_generation_restarts_timer() {
        let mut ticker = Ticker::new();
        let start = Instant::now();
        ticker.sync(schedule(100, 1));

        advance(Duration::from_millis(60)).await;
        // Same generation keeps the armed timer.
        ticker.sync(schedule(100, 1));
        ticker.tick().await;
        assert!(start.elapsed() < Duration::from_millis(150));

        let restart = Instant::now();
        ticker.sync(schedule(90, 2));
        ticker.tick().await;
        assert!(restart.elapsed() >= Duration::from_millis(90));
    }
}

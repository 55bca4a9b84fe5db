use std::cell::RefCell;
use std::time::Duration;

use gloo_timers::callback::Interval;

/// Source of periodic ticks. Dropping the handle stops the ticks.
pub trait TimerDriver {
    type Handle;

    fn start(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Self::Handle;
}

/// `setInterval` through gloo-timers.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooIntervalDriver;

impl TimerDriver for GlooIntervalDriver {
    type Handle = Interval;

    fn start(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Interval {
        Interval::new(period_ms, tick)
    }
}

/// Auto-refresh of one view: at most one live interval at any time.
///
/// The tick closure should read the view's state when it runs rather than
/// capture a copy of it, so every tick reloads what is on screen now.
pub struct AutoRefreshTimer<D: TimerDriver = GlooIntervalDriver> {
    driver: D,
    period_ms: u32,
    active: RefCell<Option<D::Handle>>,
}

impl AutoRefreshTimer<GlooIntervalDriver> {
    pub fn new(period: Duration) -> Self {
        Self::with_driver(GlooIntervalDriver, period)
    }
}

impl<D: TimerDriver> AutoRefreshTimer<D> {
    pub fn with_driver(driver: D, period: Duration) -> Self {
        let period_ms = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        Self {
            driver,
            period_ms,
            active: RefCell::new(None),
        }
    }

    /// (Re)start ticking. A previous interval is stopped first.
    pub fn start(&self, tick: impl FnMut() + 'static) {
        self.stop();
        let handle = self.driver.start(self.period_ms, Box::new(tick));
        *self.active.borrow_mut() = Some(handle);
        log::debug!("Auto-refresh every {} ms", self.period_ms);
    }

    pub fn stop(&self) {
        if self.active.borrow_mut().take().is_some() {
            log::debug!("Auto-refresh stopped");
        }
    }

    pub fn set_enabled(&self, enabled: bool, tick: impl FnMut() + 'static) {
        if enabled {
            self.start(tick);
        } else {
            self.stop();
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.borrow().is_some()
    }
}

impl<D: TimerDriver> Drop for AutoRefreshTimer<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

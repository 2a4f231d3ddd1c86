//! Time source and window-boundary synchronization.

use std::time::{Duration, SystemTime};

use tracing::debug;

use crate::{Result, TotpError};

/// An instant measured from the UNIX epoch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimePoint(Duration);

impl TimePoint {
    pub fn from_epoch_secs(secs: u64) -> Self {
        Self(Duration::from_secs(secs))
    }

    pub fn from_epoch_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn from_system_time(time: SystemTime) -> Result<Self> {
        Ok(Self(time.duration_since(SystemTime::UNIX_EPOCH)?))
    }

    pub fn epoch_secs(&self) -> u64 {
        self.0.as_secs()
    }

    /// Returns the instant `secs` seconds later.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(Duration::from_secs(secs)))
    }
}

/// Where the current time comes from, and how to wait for it to pass.
pub trait Clock {
    fn now(&self) -> Result<TimePoint>;

    /// Blocks the calling thread. Returning early is allowed.
    fn sleep(&self, duration: Duration);
}

/// The local system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Result<TimePoint> {
        TimePoint::from_system_time(SystemTime::now())
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration)
    }
}

/// Seconds left in the window containing `instant`, in `1..=time_step`.
///
/// `time_step` must be non-zero.
pub(crate) fn remaining_seconds(instant: TimePoint, time_step: u64) -> u64 {
    time_step - instant.epoch_secs() % time_step
}

/// Picks the instant codes are generated for.
///
/// A `fixed` instant is returned as is, without ever sleeping. Otherwise the
/// clock is sampled and, when `threshold` or fewer seconds remain in the
/// current window, the thread sleeps once past the boundary and samples
/// again. There is no second check after waking.
pub fn resolve_instant<C: Clock + ?Sized>(
    clock: &C,
    threshold: u64,
    time_step: u64,
    fixed: Option<TimePoint>,
) -> Result<(TimePoint, u64)> {
    if time_step == 0 {
        return Err(TotpError::InvalidTimeStep);
    }

    if let Some(instant) = fixed {
        let remaining = remaining_seconds(instant, time_step);
        debug!(epoch = instant.epoch_secs(), remaining, "using fixed instant");
        return Ok((instant, remaining));
    }

    let mut instant = clock.now()?;
    let mut remaining = remaining_seconds(instant, time_step);

    if remaining <= threshold {
        debug!(remaining, threshold, "window about to close, waiting for the next one");
        clock.sleep(Duration::from_secs(remaining + 1));

        instant = clock.now()?;
        remaining = remaining_seconds(instant, time_step);
    }

    debug!(epoch = instant.epoch_secs(), remaining, "resolved instant");
    Ok((instant, remaining))
}

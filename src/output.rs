use std::fmt::Display;

use crate::{clock, Clock, OtpCode, Result, TimePoint, TotpConfig};

/// The codes for the resolved window and the one after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub current: OtpCode,
    pub seconds_remaining: u64,
    pub next: OtpCode,
}

impl Report {
    /// Renders the report, or only the current code when `quiet` is set.
    pub fn render(&self, quiet: bool) -> String {
        if quiet {
            self.current.to_string()
        } else {
            self.to_string()
        }
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Current: {}", self.current)?;
        writeln!(f, "Seconds remaining: {}", self.seconds_remaining)?;
        write!(f, "Next: {}", self.next)
    }
}

/// Resolves the instant to use, possibly waiting for a fresh window, then
/// generates the current and next codes.
///
/// Either both codes are produced or an error is returned.
pub fn generate_report<C: Clock + ?Sized>(
    config: &TotpConfig,
    fixed: Option<TimePoint>,
    clock: &C,
) -> Result<Report> {
    let (instant, seconds_remaining) =
        clock::resolve_instant(clock, config.threshold(), config.time_step(), fixed)?;

    let current = config.generate(instant)?;
    let next = config.generate(instant.plus_secs(config.time_step()))?;

    Ok(Report {
        current,
        seconds_remaining,
        next,
    })
}

use crate::{
    hotp::{check_digits, Hotp},
    HashAlgorithm, OtpCode, Result, Secret, TimePoint, TotpError,
};

pub const DEFAULT_DIGITS: u32 = 6;
pub const DEFAULT_TIME_STEP: u64 = 30;
pub const DEFAULT_THRESHOLD: u64 = 3;
pub const MIN_THRESHOLD: u64 = 1;
pub const MAX_THRESHOLD: u64 = 20;

/// Everything needed for one generation run. Built through [`TotpConfigBuilder`],
/// which rejects out of range values, and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TotpConfig {
    secret: Secret,
    algorithm: HashAlgorithm,
    digits: u32,
    time_step: u64,
    threshold: u64,
}

impl TotpConfig {
    /// Starts a config for the given secret.
    ///
    /// Obs.: defaults to the SHA1 hash, a 6-digit code, a period of 30 seconds
    /// and a 3 second threshold
    pub fn builder(secret: Secret) -> TotpConfigBuilder {
        TotpConfigBuilder {
            secret,
            algorithm: HashAlgorithm::default(),
            digits: DEFAULT_DIGITS,
            time_step: DEFAULT_TIME_STEP,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn time_step(&self) -> u64 {
        self.time_step
    }

    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Generates the code for the window containing `instant`.
    pub fn generate(&self, instant: TimePoint) -> Result<OtpCode> {
        generate(
            &self.secret,
            self.algorithm,
            self.digits,
            self.time_step,
            instant,
        )
    }
}

#[derive(Debug, Clone)]
pub struct TotpConfigBuilder {
    secret: Secret,
    algorithm: HashAlgorithm,
    digits: u32,
    time_step: u64,
    threshold: u64,
}

impl TotpConfigBuilder {
    ///  Sets hashing algorithm
    pub fn with_algorithm(&mut self, algorithm: HashAlgorithm) -> &mut Self {
        self.algorithm = algorithm;

        self
    }

    ///  Sets the number of digits to generate
    pub fn with_digits(&mut self, digits: u32) -> &mut Self {
        self.digits = digits;

        self
    }

    ///  Sets the period in seconds
    pub fn with_time_step(&mut self, time_step: u64) -> &mut Self {
        self.time_step = time_step;

        self
    }

    ///  Sets how few seconds may remain in a window before waiting for the next one
    pub fn with_threshold(&mut self, threshold: u64) -> &mut Self {
        self.threshold = threshold;

        self
    }

    pub fn build(&self) -> Result<TotpConfig> {
        check_digits(self.digits)?;

        if self.time_step == 0 {
            return Err(TotpError::InvalidTimeStep);
        }

        if !(MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.threshold) {
            return Err(TotpError::ThresholdOutOfRange(self.threshold));
        }

        Ok(TotpConfig {
            secret: self.secret.clone(),
            algorithm: self.algorithm,
            digits: self.digits,
            time_step: self.time_step,
            threshold: self.threshold,
        })
    }
}

/// The RFC 6238 counter: whole time steps elapsed since the epoch.
///
/// `time_step` must be non-zero.
pub(crate) fn counter_at(instant: TimePoint, time_step: u64) -> u64 {
    instant.epoch_secs() / time_step
}

/// Generates a [Time-based One-time Password](https://www.rfc-editor.org/rfc/rfc6238)
/// for the provided instant, truncated to `digits` digits.
pub fn generate(
    secret: &Secret,
    algorithm: HashAlgorithm,
    digits: u32,
    time_step: u64,
    instant: TimePoint,
) -> Result<OtpCode> {
    if time_step == 0 {
        return Err(TotpError::InvalidTimeStep);
    }

    Hotp::new(secret, algorithm, digits)?.generate(counter_at(instant, time_step))
}

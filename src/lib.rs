pub mod cli;
pub mod clock;
pub mod hotp;
pub mod output;
pub mod secret;
pub mod totp;

use std::{fmt::Display, str::FromStr};

pub use clock::{Clock, SystemClock, TimePoint};
pub use output::{generate_report, Report};
pub use secret::{EncodingKind, Secret};
pub use totp::{TotpConfig, TotpConfigBuilder};

pub type Result<T> = std::result::Result<T, TotpError>;

#[derive(Debug, thiserror::Error)]
pub enum TotpError {
    #[error("Could not decode the secret as {encoding}")]
    SecretDecode {
        encoding: EncodingKind,
        #[source]
        source: data_encoding::DecodeError,
    },
    #[error("Unsupported number of digits, found {0}. Expected a value between 1 and 10")]
    UnsupportedDigits(u32),
    #[error("You must provide a secret")]
    MissingSecret,
    #[error("The decoded secret is empty")]
    EmptySecret,
    #[error("Time threshold out of range, found {0}. Expected a value between 1 and 20")]
    ThresholdOutOfRange(u64),
    #[error("The time step must be greater than zero")]
    InvalidTimeStep,
    #[error("Invalid secret encoding, found {0}. Expected one of: hex, base32, base64 or utf8")]
    InvalidEncoding(String),
    #[error("Invalid hashing algorithm, found {0}. Expected one of: SHA1, SHA256 or SHA512")]
    InvalidHashingAlgorithm(String),
    #[error("Invalid digest")]
    InvalidDigest(Vec<u8>),
    #[error("The HMAC key could not be initialized")]
    InvalidKeyLength,
    #[error("The system clock is set before the UNIX epoch")]
    Clock(#[from] std::time::SystemTimeError),
    #[error("Could not read the secret from stdin")]
    Stdin(#[source] std::io::Error),
}

/// The HMAC construction used to derive codes.
///
/// SHA1 is the default, matching RFC 6238 and most authenticator apps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    #[default]
    SHA1,
    SHA256,
    SHA512,
}

impl HashAlgorithm {
    /// Maps a user supplied name to an algorithm.
    ///
    /// Accepts `sha1`, `sha256`, `sha512` and their `hmac`-prefixed forms in
    /// any case. Missing or unrecognized names fall back to the default
    /// instead of failing.
    pub fn resolve(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::default();
        };

        match Self::from_str(name) {
            Ok(algorithm) => algorithm,
            Err(_) => {
                tracing::warn!(
                    name,
                    fallback = %Self::default(),
                    "unrecognized hash algorithm, using the default"
                );
                Self::default()
            }
        }
    }
}

impl Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SHA1 => write!(f, "SHA1"),
            Self::SHA256 => write!(f, "SHA256"),
            Self::SHA512 => write!(f, "SHA512"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = TotpError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        let normalized = normalized.strip_prefix("HMAC").unwrap_or(&normalized);

        match normalized {
            "SHA1" => Ok(Self::SHA1),
            "SHA256" => Ok(Self::SHA256),
            "SHA512" => Ok(Self::SHA512),
            _ => Err(TotpError::InvalidHashingAlgorithm(s.to_string())),
        }
    }
}

/// A truncated code together with the number of digits it renders to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OtpCode {
    code: u64,
    digits: u32,
}

impl Display for OtpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:0padding$}",
            self.code,
            padding = (self.digits as usize)
        )
    }
}

use std::{fmt::Display, str::FromStr};

use data_encoding::{
    Encoding, BASE32_NOPAD_NOCASE, BASE64, BASE64URL, BASE64URL_NOPAD, BASE64_NOPAD,
    HEXLOWER_PERMISSIVE,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Result, TotpError};

/// The textual form a secret is supplied in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum EncodingKind {
    Hex,
    #[default]
    Base32,
    Base64,
    Base64Url,
    Utf8Raw,
}

impl EncodingKind {
    /// Maps an encoding name to its kind.
    ///
    /// No name means base32, the usual form of a TOTP secret. Unrecognized
    /// names fall back to the raw UTF-8 bytes of the text.
    pub fn resolve(name: Option<&str>) -> Self {
        let Some(name) = name else {
            return Self::default();
        };

        match Self::from_str(name) {
            Ok(kind) => kind,
            Err(_) => {
                tracing::warn!(name, "unrecognized secret encoding, using the raw text bytes");
                Self::Utf8Raw
            }
        }
    }
}

impl Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hex => write!(f, "hex"),
            Self::Base32 => write!(f, "base32"),
            Self::Base64 => write!(f, "base64"),
            Self::Base64Url => write!(f, "base64url"),
            Self::Utf8Raw => write!(f, "utf8"),
        }
    }
}

impl FromStr for EncodingKind {
    type Err = TotpError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hex" | "base16" => Ok(Self::Hex),
            "base32" => Ok(Self::Base32),
            "base64" => Ok(Self::Base64),
            "base64url" => Ok(Self::Base64Url),
            "utf8" | "utf-8" | "raw" => Ok(Self::Utf8Raw),
            _ => Err(TotpError::InvalidEncoding(s.to_string())),
        }
    }
}

/// Raw key bytes the generator signs with.
///
/// The bytes are wiped when the value is dropped and never printed.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Secret(Vec<u8>);

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secret")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl Secret {
    /// Decodes `text` according to `encoding` into key bytes.
    pub fn decode(text: &str, encoding: EncodingKind) -> Result<Self> {
        let bytes = match encoding {
            EncodingKind::Hex => decode_with(&HEXLOWER_PERMISSIVE, text.trim(), encoding)?,
            EncodingKind::Base32 => {
                decode_with(&BASE32_NOPAD_NOCASE, &normalize_base32(text), encoding)?
            }
            EncodingKind::Base64 => {
                let text = text.trim();
                let spec = if text.ends_with('=') { BASE64 } else { BASE64_NOPAD };
                decode_with(&spec, text, encoding)?
            }
            EncodingKind::Base64Url => {
                let text = text.trim();
                let spec = if text.ends_with('=') { BASE64URL } else { BASE64URL_NOPAD };
                decode_with(&spec, text, encoding)?
            }
            EncodingKind::Utf8Raw => text.as_bytes().to_vec(),
        };

        if bytes.is_empty() {
            return Err(TotpError::EmptySecret);
        }

        tracing::debug!(%encoding, len = bytes.len(), "decoded secret");
        Ok(Self(bytes))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

fn decode_with(spec: &Encoding, text: &str, encoding: EncodingKind) -> Result<Vec<u8>> {
    spec.decode(text.as_bytes())
        .map_err(|source| TotpError::SecretDecode { encoding, source })
}

// Authenticator apps show base32 secrets in groups of four and often keep
// the `=` padding, neither of which is part of the key.
fn normalize_base32(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .trim_end_matches('=')
        .to_string()
}

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::{HashAlgorithm, OtpCode, Result, Secret, TotpError};

pub const MIN_DIGITS: u32 = 1;
pub const MAX_DIGITS: u32 = 10;

type SignFn = fn(&[u8], &[u8]) -> Result<Vec<u8>>;

impl HashAlgorithm {
    fn signer(self) -> SignFn {
        match self {
            Self::SHA1 => sign::<Hmac<Sha1>>,
            Self::SHA256 => sign::<Hmac<Sha256>>,
            Self::SHA512 => sign::<Hmac<Sha512>>,
        }
    }
}

fn sign<M>(key: &[u8], data: &[u8]) -> Result<Vec<u8>>
where
    M: Mac + hmac::digest::KeyInit,
{
    let mut mac = <M as Mac>::new_from_slice(key).map_err(|_| TotpError::InvalidKeyLength)?;
    mac.update(data);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Counter based one-time password generator ([RFC 4226](https://www.rfc-editor.org/rfc/rfc4226)).
#[derive(Debug, Clone, PartialEq)]
pub struct Hotp<'a> {
    secret: &'a Secret,
    algorithm: HashAlgorithm,
    digits: u32,
}

impl<'a> Hotp<'a> {
    /// Fails with [`TotpError::UnsupportedDigits`] when `digits` is outside 1..=10.
    pub fn new(secret: &'a Secret, algorithm: HashAlgorithm, digits: u32) -> Result<Self> {
        check_digits(digits)?;

        Ok(Self {
            secret,
            algorithm,
            digits,
        })
    }

    /// Generates a HOTP from the provided counter
    /// truncated to the configured number of digits
    pub fn generate(&self, counter: u64) -> Result<OtpCode> {
        let digest = calc_digest(self.secret.as_bytes(), self.algorithm, counter)?;
        let code = encode_digest_truncated(&digest, self.digits)?;

        Ok(OtpCode {
            code,
            digits: self.digits,
        })
    }
}

pub(crate) fn check_digits(digits: u32) -> Result<()> {
    if (MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
        Ok(())
    } else {
        Err(TotpError::UnsupportedDigits(digits))
    }
}

/// Calculates the HMAC digest of the big-endian counter.
pub fn calc_digest(key: &[u8], algorithm: HashAlgorithm, counter: u64) -> Result<Vec<u8>> {
    algorithm.signer()(key, &counter.to_be_bytes())
}

/// Dynamic truncation of a digest into a `digits` long integer.
pub fn encode_digest_truncated(digest: &[u8], digits: u32) -> Result<u64> {
    check_digits(digits)?;

    // The last byte tells us the offset for any algorithm
    let offset = match digest.last() {
        Some(x) => *x & 0xf,
        None => return Err(TotpError::InvalidDigest(Vec::from(digest))),
    } as usize;

    let code_bytes: [u8; 4] = match digest.get(offset..offset + 4).map(<[u8; 4]>::try_from) {
        Some(Ok(x)) => x,
        _ => return Err(TotpError::InvalidDigest(Vec::from(digest))),
    };

    let code = u64::from(u32::from_be_bytes(code_bytes) & 0x7fff_ffff);

    Ok(code % 10u64.pow(digits))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        hotp::{encode_digest_truncated, Hotp},
        HashAlgorithm, Secret, TotpError,
    };

    // RFC 4226 Appendix D
    #[rstest]
    #[case(0, "755224")]
    #[case(1, "287082")]
    #[case(2, "359152")]
    #[case(3, "969429")]
    #[case(4, "338314")]
    #[case(5, "254676")]
    #[case(6, "287922")]
    #[case(7, "162583")]
    #[case(8, "399871")]
    #[case(9, "520489")]
    fn hotp(#[case] counter: u64, #[case] expected: &str) {
        let secret = Secret::from_bytes(b"12345678901234567890".to_vec());
        let hotp = Hotp::new(&secret, HashAlgorithm::SHA1, 6).unwrap();

        assert_eq!(expected, hotp.generate(counter).unwrap().to_string());
    }

    #[test]
    fn truncation_uses_the_rfc_example_digest() {
        // RFC 4226 section 5.4
        let digest = [
            0x1f, 0x86, 0x98, 0x69, 0x0e, 0x02, 0xca, 0x16, 0x61, 0x85, 0x50, 0xef, 0x7f, 0x19,
            0xda, 0x8e, 0x94, 0x5b, 0x55, 0x5a,
        ];

        assert_eq!(872921, encode_digest_truncated(&digest, 6).unwrap());
        assert_eq!(1357872921, encode_digest_truncated(&digest, 10).unwrap());
    }

    #[test]
    fn truncation_rejects_short_digests() {
        assert!(matches!(
            encode_digest_truncated(&[], 6),
            Err(TotpError::InvalidDigest(_))
        ));
        assert!(matches!(
            encode_digest_truncated(&[0x00, 0x01, 0x0f], 6),
            Err(TotpError::InvalidDigest(_))
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(11)]
    fn rejects_unsupported_digits(#[case] digits: u32) {
        let secret = Secret::from_bytes(b"12345678901234567890".to_vec());
        assert!(matches!(
            Hotp::new(&secret, HashAlgorithm::SHA1, digits),
            Err(TotpError::UnsupportedDigits(d)) if d == digits
        ));
    }
}

//! Command line surface: turns flags into a validated [`TotpConfig`].

use std::io::{self, BufRead, Write};

use clap::{ArgAction, Parser};

use crate::{
    totp::{DEFAULT_DIGITS, DEFAULT_THRESHOLD, DEFAULT_TIME_STEP},
    EncodingKind, HashAlgorithm, Result, Secret, TimePoint, TotpConfig, TotpError,
};

/// Secret value that means "read one line from stdin".
pub const STDIN_SECRET: &str = "-";

#[derive(Parser, Debug)]
#[command(name = "edge-totp", version)]
#[command(about = "Generate a TOTP code (RFC 6238)", long_about = None)]
pub struct Args {
    /// Secret key. Use - to read the key from stdin
    #[arg(short = 'k', long, env = "EDGE_TOTP_SECRET", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Encoding of the secret key: base32, hex, base16, base64, base64url or utf8
    #[arg(short, long, default_value = "base32")]
    pub encoding: String,

    /// Hash function: sha1, sha256 or sha512. Unknown names fall back to sha1
    #[arg(short = 'H', long, default_value = "sha1")]
    pub hash: String,

    /// Number of digits of output
    #[arg(short, long, default_value_t = DEFAULT_DIGITS)]
    pub ndigits: u32,

    /// Length of a time step in seconds
    #[arg(short = 's', long, default_value_t = DEFAULT_TIME_STEP)]
    pub time_step: u64,

    /// If this many seconds or fewer remain, wait for the next time step
    /// before generating the code (1-20)
    #[arg(short = 't', long, default_value_t = DEFAULT_THRESHOLD)]
    pub time_threshold: u64,

    /// Fake time in milliseconds since the epoch. For testing only
    #[arg(short = 'f', long, value_name = "MILLIS")]
    pub fake_time: Option<u64>,

    /// Display only the code as output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase logging verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Builds the generation config, reading the secret from `stdin` when it is `-`.
    pub fn into_config(&self, stdin: impl BufRead) -> Result<TotpConfig> {
        let text = match self.secret_key.as_deref() {
            None => return Err(TotpError::MissingSecret),
            Some(STDIN_SECRET) => read_secret_line(stdin, io::stderr())?,
            Some(text) => text.to_string(),
        };

        let secret = Secret::decode(&text, EncodingKind::resolve(Some(&self.encoding)))?;

        TotpConfig::builder(secret)
            .with_algorithm(HashAlgorithm::resolve(Some(&self.hash)))
            .with_digits(self.ndigits)
            .with_time_step(self.time_step)
            .with_threshold(self.time_threshold)
            .build()
    }

    pub fn fixed_instant(&self) -> Option<TimePoint> {
        self.fake_time.map(TimePoint::from_epoch_millis)
    }
}

/// Reads the first line of `reader`, without its line ending.
///
/// A notice is written to `prompt` first, since the read blocks on a terminal.
pub fn read_secret_line(mut reader: impl BufRead, mut prompt: impl Write) -> Result<String> {
    writeln!(prompt, "Reading secret from stdin...").map_err(TotpError::Stdin)?;

    let mut line = String::new();
    reader.read_line(&mut line).map_err(TotpError::Stdin)?;

    let line = line.trim_end_matches(&['\r', '\n'][..]);
    if line.is_empty() {
        return Err(TotpError::MissingSecret);
    }

    Ok(line.to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use clap::Parser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{
        cli::{read_secret_line, Args},
        HashAlgorithm, TimePoint, TotpError,
    };

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("edge-totp").chain(args.iter().copied())).unwrap()
    }

    fn no_stdin() -> Cursor<&'static [u8]> {
        Cursor::new(&b""[..])
    }

    #[test]
    fn defaults() {
        let args = parse(&["-k", "GEZDGNBVGY3TQOJQ"]);
        let config = args.into_config(no_stdin()).unwrap();

        assert_eq!(HashAlgorithm::SHA1, config.algorithm());
        assert_eq!(6, config.digits());
        assert_eq!(30, config.time_step());
        assert_eq!(3, config.threshold());
        assert!(!args.quiet);
        assert_eq!(None, args.fixed_instant());
    }

    #[test]
    fn long_flags() {
        let args = parse(&[
            "--secret-key",
            "3132333435363738393031323334353637383930",
            "--encoding",
            "hex",
            "--hash",
            "HmacSHA512",
            "--ndigits",
            "8",
            "--time-step",
            "60",
            "--time-threshold",
            "5",
            "--fake-time",
            "59000",
            "--quiet",
        ]);
        let config = args.into_config(no_stdin()).unwrap();

        assert_eq!(HashAlgorithm::SHA512, config.algorithm());
        assert_eq!(8, config.digits());
        assert_eq!(60, config.time_step());
        assert_eq!(5, config.threshold());
        assert!(args.quiet);
        assert_eq!(Some(TimePoint::from_epoch_secs(59)), args.fixed_instant());
    }

    #[test]
    fn unknown_hash_falls_back_to_sha1() {
        let args = parse(&["-k", "GEZDGNBVGY3TQOJQ", "-H", "md5"]);
        let config = args.into_config(no_stdin()).unwrap();

        assert_eq!(HashAlgorithm::SHA1, config.algorithm());
    }

    #[test]
    fn secret_from_stdin() {
        let args = parse(&["-k", "-", "-f", "59000", "-n", "8"]);
        let stdin = Cursor::new(&b"GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ\r\nignored\n"[..]);
        let config = args.into_config(stdin).unwrap();

        let code = config.generate(args.fixed_instant().unwrap()).unwrap();
        assert_eq!("94287082", code.to_string());
    }

    #[test]
    fn stdin_read_announces_itself() {
        let mut prompt = Vec::new();
        let stdin = Cursor::new(&b"GEZDGNBVGY3TQOJQ\n"[..]);
        let secret = read_secret_line(stdin, &mut prompt).unwrap();

        assert_eq!("GEZDGNBVGY3TQOJQ", secret);
        assert_eq!("Reading secret from stdin...\n", String::from_utf8(prompt).unwrap());
    }

    #[rstest]
    #[case(&b""[..])]
    #[case(&b"\n"[..])]
    fn empty_stdin_is_a_missing_secret(#[case] input: &'static [u8]) {
        let args = parse(&["-k", "-"]);
        let err = args.into_config(Cursor::new(input)).unwrap_err();

        assert!(matches!(err, TotpError::MissingSecret));
    }

    #[test]
    fn missing_secret() {
        let args = Args {
            secret_key: None,
            ..parse(&["-q"])
        };

        assert!(matches!(
            args.into_config(no_stdin()),
            Err(TotpError::MissingSecret)
        ));
    }

    #[rstest]
    #[case(&["-k", "GEZDGNBVGY3TQOJQ", "-t", "0"])]
    #[case(&["-k", "GEZDGNBVGY3TQOJQ", "-t", "21"])]
    #[case(&["-k", "GEZDGNBVGY3TQOJQ", "-n", "11"])]
    #[case(&["-k", "GEZDGNBVGY3TQOJQ", "-s", "0"])]
    #[case(&["-k", "GEZDGNBVGY3TQOJ1"])]
    fn invalid_config_is_rejected(#[case] args: &[&str]) {
        assert!(parse(args).into_config(no_stdin()).is_err());
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["edge-totp", "--bogus"]).is_err());
        assert!(Args::try_parse_from(["edge-totp", "-n", "six"]).is_err());
    }
}

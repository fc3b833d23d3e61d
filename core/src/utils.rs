//! Utility functions and types.

use std::fmt::Debug;

/// Redacts a secret before it reaches any `Debug` output.
///
/// - Strings shorter than 12 characters are fully redacted.
/// - Longer strings keep their first and last three characters.
/// - Raw key bytes are always fully redacted, only their length is shown.
pub enum Redact<'a> {
    /// A textual secret, like an account name or a SAS token.
    Str(&'a str),
    /// A binary secret, like a decoded account key.
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for Redact<'a> {
    fn from(value: &'a str) -> Self {
        Redact::Str(value)
    }
}

impl<'a> From<&'a String> for Redact<'a> {
    fn from(value: &'a String) -> Self {
        Redact::Str(value.as_str())
    }
}

impl<'a> From<&'a Option<String>> for Redact<'a> {
    fn from(value: &'a Option<String>) -> Self {
        match value {
            None => Redact::Str(""),
            Some(v) => Redact::Str(v),
        }
    }
}

impl<'a> From<&'a [u8]> for Redact<'a> {
    fn from(value: &'a [u8]) -> Self {
        Redact::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Redact<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Redact::Bytes(value.as_slice())
    }
}

impl Debug for Redact<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Redact::Bytes(bs) if bs.is_empty() => f.write_str("EMPTY"),
            Redact::Bytes(bs) => write!(f, "***({} bytes)", bs.len()),
            Redact::Str(s) => {
                let length = s.len();
                if length == 0 {
                    f.write_str("EMPTY")
                } else if length < 12 || !s.is_char_boundary(3) || !s.is_char_boundary(length - 3)
                {
                    f.write_str("***")
                } else {
                    f.write_str(&s[..3])?;
                    f.write_str("***")?;
                    f.write_str(&s[length - 3..])
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        let cases = vec![
            ("Short", "***"),
            ("Hello World!", "Hel***ld!"),
            ("This is a longer string", "Thi***ing"),
            ("", "EMPTY"),
            ("HelloWorld", "***"),
        ];

        for (input, expected) in cases {
            assert_eq!(
                format!("{:?}", Redact::from(input)),
                expected,
                "Failed on input: {}",
                input
            );
        }
    }

    #[test]
    fn test_redact_bytes() {
        let key = vec![1u8; 64];
        assert_eq!(format!("{:?}", Redact::from(&key)), "***(64 bytes)");
        assert_eq!(format!("{:?}", Redact::from(&[][..])), "EMPTY");
    }
}

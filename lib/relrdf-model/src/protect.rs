//! Protection of IRIs for inclusion in larger URLs.
//!
//! Percent encoding tends to be decoded more than once by browsers and web servers,
//! so protected IRIs use `~` as their escape character instead:
//! the IRI is encoded in UTF-8 and every byte outside `[A-Za-z0-9._-]` becomes `~XX`,
//! where `XX` are two uppercase hexadecimal digits.
//!
//! ```
//! use relrdf_model::protect::{protect_iri, unprotect_iri};
//!
//! assert_eq!(protect_iri("http://example.com/yeah"), "http~3A~2F~2Fexample.com~2Fyeah");
//! assert_eq!(unprotect_iri("http~3A~2F~2Fexample.com~2Fyeah")?, "http://example.com/yeah");
//! # Result::<_, relrdf_model::protect::IriDecodeError>::Ok(())
//! ```

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Protects an IRI. The output only contains characters from `[A-Za-z0-9._~-]`.
pub fn protect_iri(iri: &str) -> String {
    let mut protected = String::with_capacity(iri.len());
    for byte in iri.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_') {
            protected.push(char::from(byte));
        } else {
            protected.push('~');
            protected.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
            protected.push(char::from(HEX_DIGITS[usize::from(byte & 0xF)]));
        }
    }
    protected
}

/// Reverts [`protect_iri`].
pub fn unprotect_iri(protected: &str) -> Result<String, IriDecodeError> {
    if !protected.is_ascii() {
        return Err(IriDecodeError::NonAscii);
    }
    let input = protected.as_bytes();
    let mut bytes = Vec::with_capacity(input.len());
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'~' {
            let code = input.get(i + 1..i + 3).unwrap_or(&input[i + 1..]);
            let decoded = match code {
                [high, low] => hex_value(*high).zip(hex_value(*low)),
                _ => None,
            };
            let Some((high, low)) = decoded else {
                return Err(IriDecodeError::InvalidEscape(
                    String::from_utf8_lossy(code).into_owned(),
                ));
            };
            bytes.push(high * 16 + low);
            i += 3;
        } else {
            bytes.push(input[i]);
            i += 1;
        }
    }
    String::from_utf8(bytes).map_err(|_| IriDecodeError::InvalidUtf8)
}

fn hex_value(c: u8) -> Option<u8> {
    char::from(c).to_digit(16).and_then(|d| u8::try_from(d).ok())
}

/// An error raised by [`unprotect_iri`].
#[derive(Debug, thiserror::Error)]
pub enum IriDecodeError {
    #[error("Invalid escape sequence '~{0}'")]
    InvalidEscape(String),
    #[error("Protected IRIs only contain ASCII characters")]
    NonAscii,
    #[error("The decoded IRI is not valid UTF-8")]
    InvalidUtf8,
}

#[cfg(test)]
mod tests {
    use super::*;

    const CORPUS: [&str; 6] = [
        "http://example.com/yeah",
        "http://example.com/~2F",
        "http://example.com/The%20feat",
        "http://example2.com/Aktivität",
        "urn:x-relrdf:a_b.c-d",
        "",
    ];

    #[test]
    fn roundtrip() -> Result<(), IriDecodeError> {
        for iri in CORPUS {
            assert_eq!(unprotect_iri(&protect_iri(iri))?, iri);
        }
        Ok(())
    }

    #[test]
    fn protected_alphabet() {
        for iri in CORPUS {
            assert!(
                protect_iri(iri)
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '~' | '-'))
            );
        }
    }

    #[test]
    fn encodes_utf8_bytes() {
        assert_eq!(protect_iri("ä"), "~C3~A4");
        assert_eq!(protect_iri("~"), "~7E");
    }

    #[test]
    fn rejects_bad_escapes() {
        assert!(matches!(
            unprotect_iri("http~3A~2F~2Xexample.com"),
            Err(IriDecodeError::InvalidEscape(code)) if code == "2X"
        ));
        assert!(unprotect_iri("yeah~").is_err());
        assert!(unprotect_iri("yeah~2").is_err());
        assert_eq!(unprotect_iri("yeah~2F").ok().as_deref(), Some("yeah/"));
        assert!(unprotect_iri("~FF").is_err());
    }
}

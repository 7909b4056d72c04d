use std::fmt;
use std::str::FromStr;

use memchr::{memchr, memrchr};

use crate::constants::DELIMITER;

/// Integer digits accepted by the fixed-point decoder. Keeps the tenths
/// accumulator below 2^53, where every integer is an exact `f64`.
const MAX_INT_DIGITS: usize = 14;

/// Selects how the value half of a line is turned into a number.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Decoder {
    /// Closed-form decoder for `-?[0-9]+(\.[0-9])?`.
    #[default]
    FixedPoint,
    /// General decimal parser; slower, accepts exponents and longer fractions.
    /// Non-finite results (`NaN`, `inf`, overflow) are rejected.
    Lexical,
}

impl Decoder {
    #[inline]
    pub fn decode(self, bytes: &[u8]) -> Option<f64> {
        match self {
            Self::FixedPoint => decode_fixed(bytes),
            Self::Lexical => lexical_core::parse::<f64>(bytes)
                .ok()
                .filter(|value| value.is_finite()),
        }
    }
}

impl FromStr for Decoder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fixed" | "fixed-point" => Ok(Self::FixedPoint),
            "lexical" | "general" => Ok(Self::Lexical),
            other => Err(format!("unknown decoder '{other}' (expected fixed or lexical)")),
        }
    }
}

impl fmt::Display for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FixedPoint => f.write_str("fixed"),
            Self::Lexical => f.write_str("lexical"),
        }
    }
}

/// Decodes `-?[0-9]+(\.[0-9])?` by accumulating tenths and dividing once.
///
/// The quotient of two exact integers is correctly rounded, so the result is
/// identical to a general decimal parse of the same text.
#[inline]
pub fn decode_fixed(bytes: &[u8]) -> Option<f64> {
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, bytes),
    };
    let (int_part, frac_part) = match memchr(b'.', digits) {
        Some(dot) => (&digits[..dot], Some(&digits[dot + 1..])),
        None => (digits, None),
    };
    if int_part.is_empty() || int_part.len() > MAX_INT_DIGITS {
        return None;
    }

    let mut tenths: i64 = 0;
    for &b in int_part {
        if !b.is_ascii_digit() {
            return None;
        }
        tenths = tenths * 10 + i64::from(b - b'0');
    }
    tenths *= 10;
    match frac_part {
        None => {}
        Some(&[d]) if d.is_ascii_digit() => tenths += i64::from(d - b'0'),
        Some(_) => return None,
    }

    let value = tenths as f64 / 10.0;
    Some(if negative { -value } else { value })
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Record<'a> {
    pub key: &'a [u8],
    pub value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseError {
    MissingDelimiter,
    EmptyKey,
    InvalidValue,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDelimiter => write!(f, "no ';' delimiter"),
            Self::EmptyKey => write!(f, "empty station name"),
            Self::InvalidValue => write!(f, "malformed measurement"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Splits one line (without its `\n`) at the last `;`.
///
/// Everything before the last delimiter is the key, so station names may
/// themselves contain `;`.
#[inline]
pub fn parse_line(line: &[u8], decoder: Decoder) -> Result<Record<'_>, ParseError> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let split = memrchr(DELIMITER, line).ok_or(ParseError::MissingDelimiter)?;
    let (key, value) = (&line[..split], &line[split + 1..]);
    if key.is_empty() {
        return Err(ParseError::EmptyKey);
    }
    let value = decoder.decode(value).ok_or(ParseError::InvalidValue)?;
    Ok(Record { key, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_decoder_handles_grammar() {
        assert_eq!(decode_fixed(b"0"), Some(0.0));
        assert_eq!(decode_fixed(b"12.3"), Some(12.3));
        assert_eq!(decode_fixed(b"-99.9"), Some(-99.9));
        assert_eq!(decode_fixed(b"-5"), Some(-5.0));
        assert_eq!(decode_fixed(b"007.5"), Some(7.5));
    }

    #[test]
    fn fixed_decoder_rejects_outside_grammar() {
        let bad_inputs: [&[u8]; 10] = [b"", b"-", b".5", b"1.", b"1.23", b"1e3", b"+1.0", b"1,5", b"--1", b"abc"];
        for bad in bad_inputs {
            assert_eq!(decode_fixed(bad), None, "{:?}", String::from_utf8_lossy(bad));
        }
        assert_eq!(decode_fixed(b"123456789012345"), None);
    }

    #[test]
    fn lexical_decoder_accepts_general_decimals() {
        assert_eq!(Decoder::Lexical.decode(b"1.25"), Some(1.25));
        assert_eq!(Decoder::Lexical.decode(b"-2e1"), Some(-20.0));
        assert_eq!(Decoder::Lexical.decode(b"x"), None);
    }

    #[test]
    fn lexical_decoder_rejects_non_finite_values() {
        let non_finite: [&[u8]; 5] = [b"NaN", b"inf", b"-inf", b"Infinity", b"1e400"];
        for text in non_finite {
            assert_eq!(Decoder::Lexical.decode(text), None, "{:?}", String::from_utf8_lossy(text));
        }
        assert_eq!(parse_line(b"Oslo;NaN", Decoder::Lexical), Err(ParseError::InvalidValue));
    }

    #[test]
    fn key_is_everything_before_last_delimiter() {
        let record = parse_line(b"St. John's;Harbour;-3.4", Decoder::FixedPoint).unwrap();
        assert_eq!(record.key, b"St. John's;Harbour");
        assert_eq!(record.value, -3.4);
    }

    #[test]
    fn carriage_return_is_stripped() {
        let record = parse_line(b"Oslo;4.0\r", Decoder::FixedPoint).unwrap();
        assert_eq!(record, Record { key: b"Oslo", value: 4.0 });
    }

    #[test]
    fn parse_failures_are_reported() {
        let fixed = Decoder::FixedPoint;
        assert_eq!(parse_line(b"Oslo 4.0", fixed), Err(ParseError::MissingDelimiter));
        assert_eq!(parse_line(b";4.0", fixed), Err(ParseError::EmptyKey));
        assert_eq!(parse_line(b"Oslo;", fixed), Err(ParseError::InvalidValue));
        assert_eq!(parse_line(b"Oslo;warm", fixed), Err(ParseError::InvalidValue));
    }

    #[test]
    fn decoder_names_round_trip() {
        assert_eq!("fixed".parse::<Decoder>(), Ok(Decoder::FixedPoint));
        assert_eq!("Lexical".parse::<Decoder>(), Ok(Decoder::Lexical));
        assert!("fast".parse::<Decoder>().is_err());
    }
}

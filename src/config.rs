use crate::constants::{DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RECORD_LEN};
use crate::error::{Error, Result};
use crate::parse::Decoder;

/// Tuning knobs consumed by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub chunk_size: usize,
    pub parallelism: usize,
    pub max_record_len: usize,
    pub decoder: Decoder,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallelism: default_parallelism(),
            max_record_len: DEFAULT_MAX_RECORD_LEN,
            decoder: Decoder::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunk size must be positive".into()));
        }
        if self.parallelism == 0 {
            return Err(Error::InvalidConfig("parallelism must be positive".into()));
        }
        if self.max_record_len == 0 {
            return Err(Error::InvalidConfig("max record length must be positive".into()));
        }
        Ok(())
    }
}

pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Parses a byte count with an optional binary suffix: `4096`, `64K`, `64MiB`, `1g`.
pub fn parse_size(input: &str) -> Result<usize, String> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);
    let base: usize = digits
        .parse()
        .map_err(|_| format!("invalid size '{input}'"))?;
    let shift = match suffix.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 0,
        "k" | "kb" | "kib" => 10,
        "m" | "mb" | "mib" => 20,
        "g" | "gb" | "gib" => 30,
        other => return Err(format!("unknown size suffix '{other}' in '{input}'")),
    };
    base.checked_mul(1usize << shift)
        .ok_or_else(|| format!("size '{input}' overflows"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.chunk_size, 64 * 1024 * 1024);
        assert!(config.parallelism >= 1);
    }

    #[test]
    fn zero_values_are_rejected() {
        let config = Config { chunk_size: 0, ..Config::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let config = Config { parallelism: 0, ..Config::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        let config = Config { max_record_len: 0, ..Config::default() };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn sizes_accept_binary_suffixes() {
        assert_eq!(parse_size("4096"), Ok(4096));
        assert_eq!(parse_size("64K"), Ok(64 * 1024));
        assert_eq!(parse_size("64MiB"), Ok(64 * 1024 * 1024));
        assert_eq!(parse_size("1g"), Ok(1 << 30));
        assert!(parse_size("12x").is_err());
        assert!(parse_size("MiB").is_err());
    }
}

use std::env;
use std::num::ParseIntError;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_ADMIN_PORT: u16 = 5001;

/// Returns the port in the named environment variable, or `default` if
/// it's unset or blank. Panics if the value isn't a valid port.
pub fn get_port(name: &str, default: u16) -> u16 {
    parse_port(env::var(name).ok(), default)
        .unwrap_or_else(|_| panic!("parse {} as u16", name))
}

fn parse_port(value: Option<String>, default: u16) -> Result<u16, ParseIntError> {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().parse(),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_port, DEFAULT_PORT};

    #[test]
    fn unset_or_blank_ports_use_the_default() {
        assert_eq!(parse_port(None, DEFAULT_PORT), Ok(5000));
        assert_eq!(parse_port(Some("  ".to_owned()), DEFAULT_PORT), Ok(5000));
    }

    #[test]
    fn ports_are_parsed() {
        assert_eq!(parse_port(Some("8080".to_owned()), DEFAULT_PORT), Ok(8080));
        assert_eq!(parse_port(Some(" 3030\n".to_owned()), DEFAULT_PORT), Ok(3030));
    }

    #[test]
    fn invalid_ports_are_errors() {
        assert!(parse_port(Some("http".to_owned()), DEFAULT_PORT).is_err());
        assert!(parse_port(Some("70000".to_owned()), DEFAULT_PORT).is_err());
    }
}

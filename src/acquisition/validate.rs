// Syntax checks on the connection form fields
use regex::Regex;
use std::sync::LazyLock;

// Four dot-separated groups of one to three digits. Octet range is not checked here.
static ADDRESS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}$").expect("Invalid address regex")
});

pub fn valid_address(input: &str) -> bool {
    ADDRESS_PATTERN.is_match(input)
}

pub fn valid_port(input: &str) -> bool {
    parse_port(input).is_some()
}

/// The port as a number when it is an integer in 1..=65535.
pub fn parse_port(input: &str) -> Option<u16> {
    match input.trim().parse::<i64>() {
        Ok(port) if (1..=65535).contains(&port) => u16::try_from(port).ok(),
        _ => None,
    }
}

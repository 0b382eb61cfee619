//! Client address normalization.
//!
//! Hosts hand over the remote address as a socket address string, which may
//! carry a port: `1.2.3.4:5555`, `[2001:db8::1]:443`. Only a single trailing
//! port is removed; a bare IPv6 literal keeps all of its colons.

use std::net::IpAddr;

/// Strip an optional trailing `:port` from a client address.
///
/// - `[host]:port` and `[host]` yield `host`
/// - `host:port` with exactly one colon and a numeric (or empty) port yields `host`
/// - anything else is returned unchanged
///
/// Applying it twice gives the same result as applying it once.
pub fn strip_port(address: &str) -> &str {
    if let Some(rest) = address.strip_prefix('[') {
        // The bracketed host must itself be port-free, otherwise a second pass
        // would strip again ("[1.2.3.4:5]").
        return match rest.split_once(']') {
            Some((host, tail))
                if (tail.is_empty() || is_port_suffix(tail)) && strip_port(host) == host =>
            {
                host
            }
            _ => address,
        };
    }

    match address.split_once(':') {
        Some((host, port)) if !port.contains(':') && is_port_digits(port) => host,
        _ => address,
    }
}

/// Parse a normalized address for subnet matching.
///
/// IPv4-mapped IPv6 addresses (`::ffff:10.0.0.1`) are returned as IPv4 so they
/// match IPv4 subnets. Zone identifiers and hostnames do not parse.
pub fn parse_ip(address: &str) -> Option<IpAddr> {
    address.parse::<IpAddr>().ok().map(|ip| ip.to_canonical())
}

fn is_port_suffix(tail: &str) -> bool {
    tail.strip_prefix(':').map(is_port_digits).unwrap_or(false)
}

fn is_port_digits(port: &str) -> bool {
    port.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4_with_port() {
        assert_eq!(strip_port("1.2.3.4:5555"), "1.2.3.4");
        assert_eq!(strip_port("1.2.3.4"), "1.2.3.4");
        assert_eq!(strip_port("1.2.3.4:"), "1.2.3.4");
    }

    #[test]
    fn test_bracketed_ipv6() {
        assert_eq!(strip_port("[::1]:8443"), "::1");
        assert_eq!(strip_port("[2001:db8::1]:443"), "2001:db8::1");
        assert_eq!(strip_port("[2001:db8::1]"), "2001:db8::1");
    }

    #[test]
    fn test_bare_ipv6_untouched() {
        assert_eq!(strip_port("::1"), "::1");
        assert_eq!(strip_port("2001:db8::1"), "2001:db8::1");
        assert_eq!(strip_port("fe80::1%eth0"), "fe80::1%eth0");
    }

    #[test]
    fn test_malformed_left_alone() {
        assert_eq!(strip_port("[::1"), "[::1");
        assert_eq!(strip_port("[::1]x"), "[::1]x");
        assert_eq!(strip_port("[1.2.3.4:5]:6"), "[1.2.3.4:5]:6");
        assert_eq!(strip_port("host:http"), "host:http");
        assert_eq!(strip_port(""), "");
    }

    #[test]
    fn test_idempotent() {
        for input in ["1.2.3.4:80", "[::1]:8443", "[2001:db8::1]", "::1", "10.0.0.1", ""] {
            let once = strip_port(input);
            assert_eq!(strip_port(once), once, "input {}", input);
        }
    }

    #[test]
    fn test_parse_ip() {
        assert_eq!(parse_ip("10.0.0.1"), Some("10.0.0.1".parse().unwrap()));
        assert_eq!(parse_ip("::ffff:10.0.0.1"), Some("10.0.0.1".parse().unwrap()));
        assert_eq!(parse_ip("::1"), Some("::1".parse().unwrap()));
        assert_eq!(parse_ip(""), None);
        assert_eq!(parse_ip("localhost"), None);
    }
}

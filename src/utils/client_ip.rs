use std::net::{IpAddr, SocketAddr};

use actix_web::HttpRequest;

/// Address the punch is attributed to.
///
/// Forwarding headers are only honoured when the service runs behind a
/// trusted proxy, otherwise the TCP peer address is used.
pub fn client_ip(req: &HttpRequest, trust_proxy_headers: bool) -> String {
    let info = req.connection_info();
    let raw = if trust_proxy_headers {
        info.realip_remote_addr()
    } else {
        info.peer_addr()
    };

    raw.map(normalize_ip).unwrap_or_default()
}

/// Strips ports and reduces IPv4-mapped IPv6 addresses to plain IPv4.
pub fn normalize_ip(raw: &str) -> String {
    let raw = raw.trim();

    let ip = raw
        .parse::<IpAddr>()
        .or_else(|_| raw.parse::<SocketAddr>().map(|s| s.ip()));

    match ip {
        Ok(IpAddr::V6(v6)) => match v6.to_ipv4_mapped() {
            Some(v4) => v4.to_string(),
            None => v6.to_string(),
        },
        Ok(ip) => ip.to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn normalizes_common_shapes() {
        assert_eq!(normalize_ip("10.0.0.6"), "10.0.0.6");
        assert_eq!(normalize_ip(" 10.0.0.6:51544 "), "10.0.0.6");
        assert_eq!(normalize_ip("::ffff:10.0.0.6"), "10.0.0.6");
        assert_eq!(normalize_ip("[2001:db8::1]:8080"), "2001:db8::1");
        assert_eq!(normalize_ip("unknown"), "unknown");
    }

    #[test]
    fn forwarded_header_only_when_trusted() {
        let req = TestRequest::default()
            .peer_addr("192.168.1.20:4000".parse().unwrap())
            .insert_header(("X-Forwarded-For", "10.0.0.6"))
            .to_http_request();

        assert_eq!(client_ip(&req, false), "192.168.1.20");
        assert_eq!(client_ip(&req, true), "10.0.0.6");
    }
}

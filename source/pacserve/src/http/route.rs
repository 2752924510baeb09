//! Route classification and the partial-IP parsing rules for the
//! `/{ip}` and `/{ip}/{cidr}` patterns.

use crate::ip::{Ipv4, PrefixLen, IpNet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Root,
    Wpad,
    Ip,
    IpCidr,
    Metrics,
}

/// Resolves a matched route to the network to look up, plus the
/// "requested" string for the debug response — the literal request
/// input with the derived prefix length appended, e.g. `GET /10.1`
/// resolves to network `10.1.0.0/16` and requested `"10.1/16"`.
///
/// Malformed input never surfaces an error: each tier falls through to
/// the next-broadest interpretation, down to the client's own `/32`.
pub fn resolve_query(
    route: RouteKind,
    ip_param: &str,
    cidr_param: &str,
    client_ip: Ipv4,
) -> (IpNet, String) {
    let client_net = IpNet::new(client_ip, PrefixLen::new(32).expect("32 is valid"));

    match route {
        // Wpad and Metrics are answered directly in `request_filter`
        // without calling this function; these arms exist only so the
        // match stays exhaustive over `RouteKind`.
        RouteKind::Root | RouteKind::Wpad | RouteKind::Metrics => {
            (client_net, format!("{client_ip}/{}", client_net.prefix_len()))
        }
        RouteKind::Ip => {
            let net = parse_partial_ipv4(ip_param).unwrap_or(client_net);
            (net, format!("{ip_param}/{}", net.prefix_len()))
        }
        RouteKind::IpCidr => {
            let net = cidr_param
                .parse::<i64>()
                .ok()
                .and_then(|prefix_len| full_ipv4(ip_param).map(|addr| (addr, prefix_len)))
                .and_then(|(addr, prefix_len)| {
                    PrefixLen::new(prefix_len).ok().map(|p| IpNet::new(addr, p))
                })
                .or_else(|| parse_partial_ipv4(ip_param))
                .unwrap_or(client_net);
            (net, format!("{ip_param}/{}", net.prefix_len()))
        }
    }
}

fn full_ipv4(s: &str) -> Option<Ipv4> {
    s.parse().ok()
}

/// Parses 1-4 dot-separated octets, right-padding any unsupplied octets
/// with zero and deriving the prefix length from the octet count (e.g.
/// `"10.2"` becomes `10.2.0.0/16`).
fn parse_partial_ipv4(s: &str) -> Option<IpNet> {
    if s.is_empty() {
        return None;
    }
    let parts: Vec<&str> = s.split('.').collect();
    if parts.is_empty() || parts.len() > 4 {
        return None;
    }

    let mut value: u32 = 0;
    for part in &parts {
        let octet: u32 = part.parse().ok()?;
        if octet > 255 {
            return None;
        }
        value = (value << 8) | octet;
    }
    value <<= (4 - parts.len()) * 8;

    let prefix = PrefixLen::new((parts.len() as i64) * 8).ok()?;
    Some(IpNet::new(Ipv4::new(value), prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Ipv4 {
        "203.0.113.9".parse().unwrap()
    }

    #[test]
    fn root_resolves_to_client_slash_32() {
        let (net, requested) = resolve_query(RouteKind::Root, "", "", client());
        assert_eq!(net.to_string(), "203.0.113.9/32");
        assert_eq!(requested, "203.0.113.9/32");
    }

    #[test]
    fn ip_route_requested_includes_derived_prefix() {
        let (_, requested) = resolve_query(RouteKind::Ip, "192.168.0.5", "", client());
        assert_eq!(requested, "192.168.0.5/32");
    }

    #[test]
    fn partial_ip_pads_and_derives_prefix() {
        let (net, _) = resolve_query(RouteKind::Ip, "10.2", "", client());
        assert_eq!(net.to_string(), "10.2.0.0/16");
    }

    #[test]
    fn single_octet_is_slash_eight() {
        let (net, _) = resolve_query(RouteKind::Ip, "10", "", client());
        assert_eq!(net.to_string(), "10.0.0.0/8");
    }

    #[test]
    fn malformed_ip_falls_through_to_client() {
        let (net, _) = resolve_query(RouteKind::Ip, "not-an-ip", "", client());
        assert_eq!(net, IpNet::new(client(), PrefixLen::new(32).unwrap()));
    }

    #[test]
    fn explicit_cidr_is_honoured() {
        let (net, requested) = resolve_query(RouteKind::IpCidr, "192.168.0.0", "16", client());
        assert_eq!(net.to_string(), "192.168.0.0/16");
        assert_eq!(requested, "192.168.0.0/16");
    }

    #[test]
    fn malformed_cidr_falls_through_to_ip_parsing() {
        let (net, _) = resolve_query(RouteKind::IpCidr, "192.168", "not-a-number", client());
        assert_eq!(net.to_string(), "192.168.0.0/16");
    }
}

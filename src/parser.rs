//! Extracts hosts and open ports from scanner text output.
//!
//! Extraction is anchored on fixed substrings of the wrapped tools' normal
//! output. If a tool changes its format the parsers return empty results,
//! which callers treat as "nothing found".
use crate::input::Protocol;
use itertools::Itertools;
use std::fmt;
use std::net::Ipv4Addr;

/// Line prefix nmap prints for every host it reports on.
pub const HOST_MARKER: &str = "Nmap scan report for";

/// An ordered list of open ports. Displays as `22,80,443`, the form nmap
/// takes for `-p`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ports(Vec<u16>);

impl Ports {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    /// Human readable form, `22, 80, 443`.
    pub fn pretty(&self) -> String {
        self.0.iter().join(", ")
    }
}

impl fmt::Display for Ports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}

impl From<Vec<u16>> for Ports {
    fn from(ports: Vec<u16>) -> Self {
        Ports(ports)
    }
}

impl FromIterator<u16> for Ports {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        Ports(iter.into_iter().collect())
    }
}

/// Hosts from `nmap -sn` output, one per [`HOST_MARKER`] line, in order.
///
/// The host is the first word after the marker, so
/// `Nmap scan report for router.lan (192.168.1.1)` yields `router.lan`.
pub fn parse_hosts(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|line| line.split_once(HOST_MARKER))
        .map(|(_, rest)| {
            rest.trim()
                .split(' ')
                .next()
                .unwrap_or_default()
                .to_owned()
        })
        .collect()
}

/// Open ports from nmap port table lines such as `53/udp open domain`.
///
/// A line counts when it contains `open` and the protocol suffix (`/tcp`,
/// `/udp`); the port is the field before the first `/`. `open|filtered` UDP
/// lines are included.
pub fn parse_open_ports(text: &str, protocol: Protocol) -> Ports {
    let suffix = format!("/{}", protocol.as_str());
    text.lines()
        .filter(|line| line.contains("open") && line.contains(&suffix))
        .filter_map(|line| line.split('/').next())
        .filter_map(|field| field.trim().parse::<u16>().ok())
        .collect()
}

/// Open ports from RustScan greppable output, `10.0.0.5 -> [22,80]`.
///
/// Every line with an arrow contributes its bracketed list, in order.
pub fn parse_greppable_ports(text: &str) -> Ports {
    text.lines()
        .filter_map(|line| line.split_once("->"))
        .filter_map(|(_, list)| {
            let list = list.trim();
            list.strip_prefix('[')?.strip_suffix(']')
        })
        .flat_map(|list| list.split(','))
        .filter_map(|port| port.trim().parse::<u16>().ok())
        .collect()
}

/// The /24 around the first IPv4 address in `ip addr` output.
///
/// `inet 192.168.1.23/24 brd ...` yields `192.168.1.0/24`.
pub fn parse_interface_subnet(text: &str) -> Option<String> {
    text.lines()
        .filter_map(|line| line.trim().strip_prefix("inet "))
        .filter_map(|rest| rest.split_whitespace().next())
        .filter_map(|cidr| cidr.split('/').next()?.parse::<Ipv4Addr>().ok())
        .map(|addr| {
            let [a, b, c, _] = addr.octets();
            format!("{a}.{b}.{c}.0/24")
        })
        .next()
}

#[cfg(test)]
mod tests {
    use super::{
        parse_greppable_ports, parse_hosts, parse_interface_subnet, parse_open_ports, Ports,
    };
    use crate::input::Protocol;
    use parameterized::parameterized;

    const HOST_DISCOVERY: &str = "\
Starting Nmap 7.94 ( https://nmap.org ) at 2024-03-01 10:00 UTC
Nmap scan report for router.lan (192.168.1.1)
Host is up (0.0010s latency).
Nmap scan report for 192.168.1.23
Host is up (0.00020s latency).
Nmap scan report for 192.168.1.40
Host is up (0.0031s latency).
Nmap done: 256 IP addresses (3 hosts up) scanned in 2.41 seconds";

    const TCP_SCAN: &str = "\
Nmap scan report for 10.0.0.5
Host is up (0.00012s latency).
Not shown: 65532 closed tcp ports (conn-refused)
PORT     STATE SERVICE
22/tcp   open  ssh
80/tcp   open  http
8080/tcp open  http-proxy
Nmap done: 1 IP address (1 host up) scanned in 4.12 seconds";

    const UDP_SCAN: &str = "\
PORT    STATE         SERVICE
53/udp  open          domain
67/udp  open|filtered dhcps
123/udp closed        ntp
161/udp open          snmp";

    #[test]
    fn hosts_in_order() {
        assert_eq!(
            parse_hosts(HOST_DISCOVERY),
            vec!["router.lan", "192.168.1.23", "192.168.1.40"]
        );
    }

    #[test]
    fn single_host_example() {
        assert_eq!(parse_hosts("Nmap scan report for 10.0.0.5"), vec!["10.0.0.5"]);
    }

    #[test]
    fn duplicate_hosts_are_kept() {
        let text = "Nmap scan report for 10.0.0.5\nNmap scan report for 10.0.0.5";
        assert_eq!(parse_hosts(text).len(), 2);
    }

    #[test]
    fn no_marker_no_hosts() {
        assert!(parse_hosts("Note: Host seems down.").is_empty());
        assert!(parse_hosts("").is_empty());
    }

    #[test]
    fn tcp_ports_in_order() {
        assert_eq!(
            parse_open_ports(TCP_SCAN, Protocol::Tcp),
            Ports::from(vec![22, 80, 8080])
        );
    }

    #[test]
    fn udp_ports_include_open_filtered() {
        assert_eq!(
            parse_open_ports(UDP_SCAN, Protocol::Udp),
            Ports::from(vec![53, 67, 161])
        );
    }

    #[test]
    fn protocol_suffix_must_match() {
        assert!(parse_open_ports(TCP_SCAN, Protocol::Udp).is_empty());
        assert!(parse_open_ports(UDP_SCAN, Protocol::Tcp).is_empty());
    }

    #[parameterized(line = {
        "53/udp open domain",
        "  53/udp   open   domain",
        "53/udp open|filtered domain",
    })]
    fn udp_example_line_yields_53(line: &str) {
        assert_eq!(parse_open_ports(line, Protocol::Udp), Ports::from(vec![53]));
    }

    #[test]
    fn ports_render_comma_joined() {
        let ports = Ports::from(vec![22, 80, 443]);
        assert_eq!(ports.to_string(), "22,80,443");
        assert_eq!(ports.pretty(), "22, 80, 443");
        assert_eq!(Ports::default().to_string(), "");
    }

    #[test]
    fn greppable_output() {
        let text = "10.0.0.5 -> [22,80,443]\n10.0.0.6 -> [3306]";
        assert_eq!(parse_greppable_ports(text), Ports::from(vec![22, 80, 443, 3306]));
    }

    #[test]
    fn greppable_output_without_ports() {
        assert!(parse_greppable_ports("10.0.0.5 -> []").is_empty());
        assert!(parse_greppable_ports("Looks like I didn't find any open ports").is_empty());
    }

    #[test]
    fn interface_subnet() {
        let text = "\
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP group default qlen 1000
    inet 192.168.1.23/24 brd 192.168.1.255 scope global dynamic noprefixroute eth0
       valid_lft 85682sec preferred_lft 85682sec
    inet 10.8.0.2/16 scope global eth0";
        assert_eq!(parse_interface_subnet(text), Some("192.168.1.0/24".to_owned()));
    }

    #[test]
    fn interface_without_ipv4() {
        let text = "    inet6 fe80::1/64 scope link";
        assert_eq!(parse_interface_subnet(text), None);
        assert_eq!(parse_interface_subnet(""), None);
    }
}

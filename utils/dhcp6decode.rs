use std::env;
use std::fs;
use std::process;

use getopts::{Matches, Options};
use log::debug;

use dhcp6relay::chain::RelayChain;
use dhcp6relay::wire::{
    Dhcpv6Message, Ipv6Address, DHCPV6_CLIENT_PORT, DHCPV6_HOP_COUNT_LIMIT, DHCPV6_SERVER_PORT,
};

/// Where the payload to decode comes from.
#[derive(Debug, PartialEq, Eq)]
enum Source {
    Hex(String),
    File(String),
}

impl Source {
    fn read(&self) -> Result<Vec<u8>, String> {
        match self {
            Source::Hex(text) => {
                decode_hex(text).map_err(|err| format!("invalid hex payload: {err}"))
            }
            Source::File(path) => fs::read(path).map_err(|err| format!("{path}: {err}")),
        }
    }
}

fn create_options() -> Options {
    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help menu");
    opts.optopt("x", "hex", "decode the payload given as hex digits", "HEX");
    opts.optopt(
        "p",
        "peer",
        "address to place in the added relay header",
        "ADDRESS",
    );
    opts
}

fn brief(program: &str) -> String {
    format!(
        "Usage: {program} [OPTION]... [FILE]\n\n\
         Decode a DHCPv6 UDP payload sent to port {DHCPV6_SERVER_PORT} (servers and \
         relay agents) or {DHCPV6_CLIENT_PORT} (clients)."
    )
}

/// Exactly one of `--hex` and a FILE argument selects the payload.
fn payload_source(matches: &Matches) -> Option<Source> {
    match (matches.opt_str("x"), matches.free.as_slice()) {
        (Some(text), []) => Some(Source::Hex(text)),
        (None, [path]) => Some(Source::File(path.clone())),
        _ => None,
    }
}

fn parse_options(opts: &Options) -> (Source, Matches) {
    let matches = match opts.parse(env::args().skip(1)) {
        Err(err) => {
            println!("{err}");
            process::exit(1)
        }
        Ok(matches) => matches,
    };

    let brief = brief(&env::args().next().unwrap_or_else(|| "dhcp6decode".into()));
    if matches.opt_present("h") {
        print!("{}", opts.usage(&brief));
        process::exit(0)
    }
    match payload_source(&matches) {
        Some(source) => (source, matches),
        None => {
            print!("{}", opts.usage(&brief));
            process::exit(2)
        }
    }
}

fn decode_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits: String = text
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();
    hex::decode(digits)
}

fn main() {
    env_logger::init();

    let opts = create_options();
    let (source, matches) = parse_options(&opts);

    let payload = source.read().unwrap_or_else(|err| {
        eprintln!("{err}");
        process::exit(1)
    });
    let peer: Option<Ipv6Address> = matches.opt_str("p").map(|text| {
        text.parse().unwrap_or_else(|err| {
            eprintln!("{text}: {err}");
            process::exit(1)
        })
    });

    let chain = match RelayChain::new(&payload) {
        Ok(chain) => chain,
        Err(err) => {
            eprintln!("cannot relay payload: {err}");
            process::exit(1)
        }
    };
    debug!("decoding {} octets", payload.len());

    for (depth, layer) in chain.layers().enumerate() {
        match layer {
            Ok(Dhcpv6Message::Relay(relay)) => println!("layer {depth}: {relay}"),
            Ok(Dhcpv6Message::Direct(packet)) => println!("layer {depth}: {packet}"),
            Err(err) => println!("layer {depth}: {err}"),
        }
    }

    match chain.xid() {
        Ok(xid) => println!("xid: {xid:#08x}"),
        Err(err) => println!("xid: {err}"),
    }
    match chain.parse_duid() {
        Ok(duid) => println!("duid: {duid}"),
        Err(err) => println!("duid: {err}"),
    }
    match chain.mac() {
        Ok(mac) => println!("mac: {mac}"),
        Err(err) => println!("mac: {err}"),
    }
    match chain.hop_count() {
        Ok(hops) if hops >= DHCPV6_HOP_COUNT_LIMIT => {
            println!("hop-count: {hops} (at or above limit {DHCPV6_HOP_COUNT_LIMIT})")
        }
        Ok(hops) => println!("hop-count: {hops}"),
        Err(err) => println!("hop-count: {err}"),
    }
    match chain.innermost_peer_address() {
        Ok(addr) => println!("peer-address: {addr}"),
        Err(err) => println!("peer-address: {err}"),
    }
    println!("encapsulated: {} octets", chain.encapsulate(peer).len());
}

#[cfg(test)]
mod test {
    use super::*;

    fn matches(args: &[&str]) -> Matches {
        create_options().parse(args).unwrap()
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0c00 2401"), Ok(vec![0x0c, 0x00, 0x24, 0x01]));
        assert_eq!(decode_hex("0c:00:24:01\n"), Ok(vec![0x0c, 0x00, 0x24, 0x01]));
        assert_eq!(decode_hex(""), Ok(vec![]));
    }

    #[test]
    fn test_decode_hex_malformed() {
        assert_eq!(decode_hex("0c0"), Err(hex::FromHexError::OddLength));
        assert_eq!(
            decode_hex("0g"),
            Err(hex::FromHexError::InvalidHexCharacter { c: 'g', index: 1 })
        );
        assert!(Source::Hex("0c0".into())
            .read()
            .unwrap_err()
            .starts_with("invalid hex payload"));
    }

    #[test]
    fn test_payload_source() {
        assert_eq!(
            payload_source(&matches(&["-x", "0100cd2e"])),
            Some(Source::Hex("0100cd2e".into()))
        );
        assert_eq!(
            payload_source(&matches(&["relay.bin"])),
            Some(Source::File("relay.bin".into()))
        );
        assert_eq!(payload_source(&matches(&[])), None);
        assert_eq!(payload_source(&matches(&["-x", "01", "relay.bin"])), None);
        assert_eq!(payload_source(&matches(&["a.bin", "b.bin"])), None);
    }

    #[test]
    fn test_brief_names_ports() {
        let brief = brief("dhcp6decode");
        assert!(brief.starts_with("Usage: dhcp6decode [OPTION]... [FILE]"));
        assert!(brief.contains("port 547"));
        assert!(brief.contains("or 546"));
    }
}

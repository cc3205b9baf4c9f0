#![no_main]
use libfuzzer_sys::fuzz_target;

use dhcp6relay::chain::RelayChain;
use dhcp6relay::wire::{Dhcpv6Message, Dhcpv6Repr};

fuzz_target!(|data: &[u8]| {
    let chain = match RelayChain::new(data) {
        Ok(chain) => chain,
        Err(_) => return,
    };

    let _ = chain.message_type();
    let _ = chain.duid();
    let _ = chain.parse_duid();
    let _ = chain.mac();
    let _ = chain.hop_count();
    let _ = chain.innermost_peer_address();
    let _ = chain.depth();

    for layer in chain.layers() {
        match layer {
            Ok(Dhcpv6Message::Direct(packet)) => {
                let _ = Dhcpv6Repr::parse(&packet);
                let _ = packet.server_id();
            }
            Ok(message) => {
                let _ = message.check_options();
                let _ = format!("{message}");
            }
            Err(_) => break,
        }
    }

    let xid = chain.xid();
    let wrapped = chain.encapsulate(None);
    if let Ok(outer) = RelayChain::new(&wrapped) {
        assert_eq!(outer.xid(), xid);
    }
});

/*! Relay chain traversal.

A DHCPv6 datagram is a chain of zero or more relay envelopes, outermost first,
ending in exactly one client/server message. [RelayChain] walks that chain over
borrowed sub-slices of the datagram and extracts the fields a load-balancing
policy keys on.

```rust
use dhcp6relay::chain::RelayChain;

let solicit = [
    0x01, 0x00, 0xcd, 0x2e, // Solicit, transaction-id 0x00cd2e
    0x00, 0x01, 0x00, 0x0a, 0x00, 0x03, 0x00, 0x01, // Client Identifier, DUID-LL
    0x90, 0xe2, 0xba, 0x76, 0x33, 0x44,
];
let chain = RelayChain::new(&solicit).unwrap();
assert_eq!(chain.xid(), Ok(0x00cd2e));
assert_eq!(chain.mac().unwrap().to_string(), "90:e2:ba:76:33:44");
assert!(chain.hop_count().is_err());
```
*/

use core::iter::FusedIterator;

use crate::wire::dhcpv6::MAX_RELAYED_LEN;
use crate::wire::{
    Dhcpv6Message, Dhcpv6MessageType, Dhcpv6Packet, Dhcpv6RelayPacket, Duid, DuidType, Error,
    EthernetAddress, Ipv6Address, Result,
};

#[cfg(feature = "alloc")]
use crate::wire::Dhcpv6RelayRepr;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

/// A read-only view of one DHCPv6 datagram as a chain of relay layers.
///
/// Constructing the view does not decode anything; every accessor walks the
/// chain from the outermost layer again and fails as soon as any layer does.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayChain<'a> {
    buffer: &'a [u8],
}

impl<'a> RelayChain<'a> {
    /// Create a view of `buffer`.
    ///
    /// Returns `Err(Error::Oversized)` if `buffer` is too long to be wrapped in a
    /// Relay-Message option, which a UDP payload never is.
    pub fn new(buffer: &'a [u8]) -> Result<RelayChain<'a>> {
        if buffer.len() > MAX_RELAYED_LEN {
            return Err(Error::Oversized);
        }
        Ok(RelayChain { buffer })
    }

    /// Return the underlying datagram.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer
    }

    /// Return an iterator over the layers of the chain, outermost first.
    pub fn layers(&self) -> Layers<'a> {
        Layers {
            next: Some(self.buffer),
            depth: 0,
        }
    }

    /// Decode the outermost layer.
    pub fn outermost(&self) -> Result<Dhcpv6Message<'a>> {
        Dhcpv6Message::parse(self.buffer)
    }

    /// Walk to the client/server message.
    ///
    /// Returns it together with the relay header wrapping it directly, if any.
    fn walk(&self) -> Result<(Option<Dhcpv6RelayPacket<&'a [u8]>>, Dhcpv6Packet<&'a [u8]>)> {
        let mut buffer = self.buffer;
        let mut innermost_relay = None;
        let mut depth = 0usize;

        // A Relay-Message value is at least 38 octets shorter than its layer.
        loop {
            let message = Dhcpv6Message::parse(buffer).map_err(|err| {
                net_debug!("dhcpv6: undecodable layer {}: {}", depth, err);
                err
            })?;
            match message {
                Dhcpv6Message::Relay(relay) => {
                    buffer = relay.relay_message().map_err(|err| {
                        net_debug!("dhcpv6: relay layer {}: {}", depth, err);
                        err
                    })?;
                    innermost_relay = Some(relay);
                    depth += 1;
                }
                Dhcpv6Message::Direct(packet) => {
                    net_trace!(
                        "dhcpv6: {} behind {} relay layer(s)",
                        packet.message_type(),
                        depth
                    );
                    return Ok((innermost_relay, packet));
                }
            }
        }
    }

    /// Return the client/server message at the bottom of the chain.
    pub fn message(&self) -> Result<Dhcpv6Packet<&'a [u8]>> {
        self.walk().map(|(_, packet)| packet)
    }

    /// Return the type of the client/server message at the bottom of the chain.
    pub fn message_type(&self) -> Result<Dhcpv6MessageType> {
        Ok(self.message()?.message_type())
    }

    /// Return the transaction ID of the client/server message.
    pub fn xid(&self) -> Result<u32> {
        Ok(self.message()?.transaction_id())
    }

    /// Return the number of relay layers.
    pub fn depth(&self) -> Result<usize> {
        let mut depth = 0;
        for layer in self.layers() {
            if let Dhcpv6Message::Relay(_) = layer? {
                depth += 1;
            }
        }
        Ok(depth)
    }

    /// Return the hop count of the outermost relay header.
    ///
    /// This is the value the last relay agent wrote, not the nesting depth.
    pub fn hop_count(&self) -> Result<u8> {
        self.outermost()?.hop_count()
    }

    /// Return the client DUID, i.e. the value of the first Client Identifier
    /// option of the client/server message.
    pub fn duid(&self) -> Result<&'a [u8]> {
        self.message()?
            .client_id()?
            .ok_or(Error::MissingClientIdentifier)
    }

    /// Return the client DUID viewed through its type code.
    pub fn parse_duid(&self) -> Result<Duid<'a>> {
        Duid::parse(self.duid()?)
    }

    /// Return the type code of the client DUID.
    pub fn duid_type(&self) -> Result<DuidType> {
        Ok(self.parse_duid()?.duid_type())
    }

    /// Return the peer-address of the relay header closest to the client.
    ///
    /// Returns `Err(Error::NotARelayMessage)` if the datagram has no relay layer.
    pub fn innermost_peer_address(&self) -> Result<Ipv6Address> {
        match self.walk()? {
            (Some(relay), _) => Ok(relay.peer_address()),
            (None, _) => Err(Error::NotARelayMessage),
        }
    }

    /// Return the link-layer address of the client.
    ///
    /// A DUID-LL or DUID-LLT carries it directly. For any other DUID, or none,
    /// it is recovered from the Modified EUI-64 interface identifier of the
    /// innermost relay peer-address; see [EthernetAddress::from_eui64] for the
    /// caveats. Returns `Err(Error::MacUnavailable)` if neither source exists.
    pub fn mac(&self) -> Result<EthernetAddress> {
        let (relay, packet) = self.walk()?;

        let embedded = packet
            .client_id()?
            .and_then(|duid| Duid::parse(duid).ok())
            .and_then(|duid| duid.mac());
        if let Some(mac) = embedded {
            return Ok(mac);
        }

        match relay {
            Some(relay) => Ok(EthernetAddress::from_eui64(&relay.peer_address())),
            None => {
                net_debug!("dhcpv6: no link-layer address in duid or relay header");
                Err(Error::MacUnavailable)
            }
        }
    }

    /// Wrap the datagram in one more Relay-Forward envelope.
    ///
    /// The new header's hop count is one more than the outermost one (saturating),
    /// or zero if the datagram is not a relay message. Link-address and
    /// peer-address are both set to `hint`, or left unspecified. The datagram
    /// itself is carried unchanged in the Relay-Message option.
    #[cfg(feature = "alloc")]
    pub fn encapsulate(&self, hint: Option<Ipv6Address>) -> Vec<u8> {
        let hop_count = match self.outermost() {
            Ok(Dhcpv6Message::Relay(relay)) => relay.hop_count().saturating_add(1),
            _ => 0,
        };
        let address = hint.unwrap_or(Ipv6Address::UNSPECIFIED);

        let repr = Dhcpv6RelayRepr {
            message_type: Dhcpv6MessageType::RelayForw,
            hop_count,
            link_address: address,
            peer_address: address,
            relay_message: self.buffer,
            interface_id: None,
            remote_id: None,
        };

        let mut buffer = alloc::vec![0; repr.buffer_len()];
        let mut packet = Dhcpv6RelayPacket::new_unchecked(&mut buffer[..]);
        // `new` caps the datagram at MAX_RELAYED_LEN and the buffer is exactly
        // `buffer_len()` long, so this cannot fail.
        if let Err(err) = repr.emit(&mut packet) {
            net_debug!("dhcpv6: encapsulation failed: {}", err);
        }

        net_trace!(
            "dhcpv6: encapsulated {} octets, hop-count {}",
            self.buffer.len(),
            hop_count
        );
        buffer
    }
}

/// An iterator over the layers of a [RelayChain], outermost first.
///
/// Yields each relay layer, then the client/server message. A layer that
/// cannot be decoded, or a relay layer without a Relay-Message option, yields
/// an error and ends the iteration.
#[derive(Debug, Clone)]
pub struct Layers<'a> {
    next: Option<&'a [u8]>,
    depth: usize,
}

impl<'a> Layers<'a> {
    /// Return the number of layers yielded so far.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl<'a> Iterator for Layers<'a> {
    type Item = Result<Dhcpv6Message<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let buffer = self.next.take()?;
        let message = match Dhcpv6Message::parse(buffer) {
            Ok(message) => message,
            Err(err) => return Some(Err(err)),
        };
        if let Dhcpv6Message::Relay(relay) = message {
            match relay.relay_message() {
                Ok(inner) => self.next = Some(inner),
                Err(err) => return Some(Err(err)),
            }
        }
        self.depth += 1;
        Some(Ok(message))
    }
}

impl<'a> FusedIterator for Layers<'a> {}

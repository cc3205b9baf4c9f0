use core::fmt;

use super::Ipv6Address;

/// A six-octet Ethernet II address.
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(pub [u8; 6]);

impl Address {
    /// The broadcast address.
    pub const BROADCAST: Address = Address([0xff; 6]);

    /// Construct an Ethernet address from a sequence of octets, in big-endian.
    ///
    /// Returns `None` unless `data` is exactly six octets long.
    pub fn from_bytes(data: &[u8]) -> Option<Address> {
        let bytes: [u8; 6] = data.try_into().ok()?;
        Some(Address(bytes))
    }

    /// Recover the address a Modified EUI-64 interface identifier was built from.
    ///
    /// The interface identifier is the low 64 bits of `addr`. The `ff:fe` octets
    /// inserted in the middle are dropped and the universal/local bit is flipped
    /// back. Nothing checks that `addr` actually holds such an identifier; any
    /// other address yields a well-formed but meaningless result.
    pub fn from_eui64(addr: &Ipv6Address) -> Address {
        let octets = addr.octets();
        Address([
            octets[8] ^ 0x02,
            octets[9],
            octets[10],
            octets[13],
            octets[14],
            octets[15],
        ])
    }

    /// Return an Ethernet address as a sequence of octets, in big-endian.
    pub const fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Query whether the address is an unicast address.
    pub fn is_unicast(&self) -> bool {
        !(self.is_broadcast() || self.is_multicast())
    }

    /// Query whether this address is the broadcast address.
    pub fn is_broadcast(&self) -> bool {
        *self == Self::BROADCAST
    }

    /// Query whether the "multicast" bit in the OUI is set.
    pub const fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    /// Query whether the "locally administered" bit in the OUI is set.
    pub const fn is_local(&self) -> bool {
        self.0[0] & 0x02 != 0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let bytes = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5]
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_broadcast() {
        assert!(Address::BROADCAST.is_broadcast());
        assert!(!Address::BROADCAST.is_unicast());
        assert!(Address::BROADCAST.is_multicast());
        assert!(Address::BROADCAST.is_local());
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(
            Address::from_bytes(&[0x24, 0x8a, 0x07, 0x56, 0xdc, 0xa4]),
            Some(Address([0x24, 0x8a, 0x07, 0x56, 0xdc, 0xa4]))
        );
        assert_eq!(Address::from_bytes(&[0x24, 0x8a, 0x07]), None);
        assert_eq!(Address::from_bytes(&[0; 8]), None);
    }

    #[test]
    fn test_from_eui64() {
        let addr: Ipv6Address = "fe80::268a:7ff:fe56:dca4".parse().unwrap();
        let mac = Address::from_eui64(&addr);
        assert_eq!(mac, Address([0x24, 0x8a, 0x07, 0x56, 0xdc, 0xa4]));
        assert!(mac.is_unicast());
        assert!(!mac.is_local());
    }

    #[test]
    fn test_from_eui64_local() {
        // A locally administered address has the U/L bit cleared in its identifier.
        let addr: Ipv6Address = "fe80::ff:fe00:1".parse().unwrap();
        let mac = Address::from_eui64(&addr);
        assert_eq!(mac, Address([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]));
        assert!(mac.is_local());
    }

    #[test]
    fn test_from_eui64_without_marker() {
        let addr: Ipv6Address = "2401:db00::a".parse().unwrap();
        assert_eq!(
            Address::from_eui64(&addr),
            Address([0x02, 0x00, 0x00, 0x00, 0x00, 0x0a])
        );
    }

    #[test]
    fn test_display() {
        let mac = Address([0x24, 0x8a, 0x07, 0x56, 0xdc, 0xa4]);
        assert_eq!(format!("{mac}"), "24:8a:07:56:dc:a4");
    }
}

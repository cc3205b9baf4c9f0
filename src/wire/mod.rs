/*! Low-level packet access and construction.

The `wire` module deals with the packet *representation*. It provides two levels
of functionality.

 * First, it provides functions to extract fields from sequences of octets,
   and to insert fields into sequences of octets. This happens through the
   `Packet` and `RelayPacket` structures.
 * Second, in cases where the space of valid field values is much smaller than
   the space of possible field values, it provides a compact, high-level
   representation of packet data that can be parsed from and emitted into
   a sequence of octets. This happens through the `Repr` family of structs and
   enums, e.g. [Dhcpv6Repr] and [Dhcpv6RelayRepr].

The functions in the `wire` module are designed for use together with a
`-Cpanic=abort` build. Any accessor on a packet obtained through `new_checked`
or [Dhcpv6Message::parse] may be called without risk of a panic, and option
lists are only ever read through an iterator that checks every declared
length against the bytes actually present.

An option list whose last declared length runs past the end of the buffer is
reported as an error instead of being clipped:

```rust
use dhcp6relay::wire::{parse_options, Error};

let options = [0x00, 0x01, 0x00, 0x0a, 0x00, 0x03];
assert_eq!(
    parse_options(&options).next(),
    Some(Err(Error::TruncatedValue))
);
```
*/

use core::fmt;

mod field {
    pub type Field = ::core::ops::Range<usize>;
    pub type Rest = ::core::ops::RangeFrom<usize>;
}

pub mod dhcpv6;
pub mod duid;
mod ethernet;

pub use self::dhcpv6::{
    parse_options, Dhcpv6Option, Dhcpv6OptionWriter, Dhcpv6OptionsIterator,
    Message as Dhcpv6Message, MessageType as Dhcpv6MessageType, OptionCode as Dhcpv6OptionCode,
    Packet as Dhcpv6Packet, RelayPacket as Dhcpv6RelayPacket, RelayRepr as Dhcpv6RelayRepr,
    Repr as Dhcpv6Repr, CLIENT_PORT as DHCPV6_CLIENT_PORT, HOP_COUNT_LIMIT as DHCPV6_HOP_COUNT_LIMIT,
    SERVER_PORT as DHCPV6_SERVER_PORT,
};

pub use self::duid::{Duid, DuidType};

pub use self::ethernet::Address as EthernetAddress;

/// An IPv6 address, as carried in the link-address and peer-address fields of a
/// relay header.
pub use core::net::Ipv6Addr as Ipv6Address;

/// Parsing a packet failed.
///
/// Either it is malformed, or a field the caller asked for is not there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Fewer than four octets remained where an option code and length were expected.
    TruncatedHeader,
    /// An option declared a length running past the end of its option list.
    TruncatedValue,
    /// A Relay-Forward or Relay-Reply message is shorter than its fixed header.
    TruncatedRelayHeader,
    /// A client/server message is shorter than its fixed header.
    TruncatedMessageHeader,
    /// A relay message carries no Relay-Message option.
    MissingRelayMessageOption,
    /// The client/server message carries no Client Identifier option.
    MissingClientIdentifier,
    /// Neither the client DUID nor a relay peer-address yields a link-layer address.
    MacUnavailable,
    /// A relay header field was requested from a message that is not a relay message.
    NotARelayMessage,
    /// A DUID is shorter than the fixed fields of its type.
    TruncatedDuid,
    /// A buffer is too large to be carried in a single Relay-Message option.
    Oversized,
    /// An option value is longer than a 16-bit option length can describe.
    OptionTooLong,
    /// There is not enough room left in the buffer to emit an option.
    BufferTooSmall,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TruncatedHeader => write!(f, "truncated option header"),
            Error::TruncatedValue => write!(f, "option length exceeds buffer"),
            Error::TruncatedRelayHeader => write!(f, "truncated relay header"),
            Error::TruncatedMessageHeader => write!(f, "truncated message header"),
            Error::MissingRelayMessageOption => write!(f, "missing relay message option"),
            Error::MissingClientIdentifier => write!(f, "missing client identifier option"),
            Error::MacUnavailable => write!(f, "no link-layer address available"),
            Error::NotARelayMessage => write!(f, "not a relay message"),
            Error::TruncatedDuid => write!(f, "truncated duid"),
            Error::Oversized => write!(f, "buffer too large to relay"),
            Error::OptionTooLong => write!(f, "option value too long"),
            Error::BufferTooSmall => write!(f, "buffer too small"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;

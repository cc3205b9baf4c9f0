// See https://datatracker.ietf.org/doc/html/rfc8415 for the DHCPv6 specification.

use byteorder::{ByteOrder, NetworkEndian};
use core::{fmt, iter::FusedIterator};

use super::{Error, Ipv6Address, Result};

pub const SERVER_PORT: u16 = 547;
pub const CLIENT_PORT: u16 = 546;

/// The maximum number of relay agents a message may traverse (RFC 8415, section 7.6).
pub const HOP_COUNT_LIMIT: u8 = 8;

/// The largest buffer a Relay-Message option can carry.
pub const MAX_RELAYED_LEN: usize = u16::MAX as usize;

enum_with_unknown! {
    /// The possible message types of a DHCP packet.
    pub enum MessageType(u8) {
        Solicit = 1,
        Advertise = 2,
        Request = 3,
        Confirm = 4,
        Renew = 5,
        Rebind = 6,
        Reply = 7,
        Release = 8,
        Decline = 9,
        Reconfigure = 10,
        InformationRequest = 11,
        RelayForw = 12,
        RelayRepl = 13,
        LeaseQuery = 14,
        LeaseQueryReply = 15,
        LeaseQueryDone = 16,
        LeaseQueryData = 17,
    }
}

impl MessageType {
    /// Query whether this message type uses the relay agent/server message format.
    pub const fn is_relay(&self) -> bool {
        matches!(*self, MessageType::RelayForw | MessageType::RelayRepl)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Solicit => write!(f, "solicit"),
            Self::Advertise => write!(f, "advertise"),
            Self::Request => write!(f, "request"),
            Self::Confirm => write!(f, "confirm"),
            Self::Renew => write!(f, "renew"),
            Self::Rebind => write!(f, "rebind"),
            Self::Reply => write!(f, "reply"),
            Self::Release => write!(f, "release"),
            Self::Decline => write!(f, "decline"),
            Self::Reconfigure => write!(f, "reconfigure"),
            Self::InformationRequest => write!(f, "information-request"),
            Self::RelayForw => write!(f, "relay-forw"),
            Self::RelayRepl => write!(f, "relay-repl"),
            Self::LeaseQuery => write!(f, "lease-query"),
            Self::LeaseQueryReply => write!(f, "lease-query-reply"),
            Self::LeaseQueryDone => write!(f, "lease-query-done"),
            Self::LeaseQueryData => write!(f, "lease-query-data"),
            Self::Unknown(a) => write!(f, "unknown({a})"),
        }
    }
}

enum_with_unknown! {
    /// Option codes this crate knows by name.
    pub enum OptionCode(u16) {
        ClientId = 1,
        ServerId = 2,
        IaNa = 3,
        ElapsedTime = 8,
        RelayMsg = 9,
        InterfaceId = 18,
        DnsServers = 23,
        DomainList = 24,
        RemoteId = 37,
    }
}

// The format of DHCP options is:
//
//     0                   1                   2                   3
//     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |          option-code          |           option-len          |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |                          option-data                          |
//    |                      (option-len octets)                      |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
//                      Figure 12: Option Format
//
/// A representation of a single DHCP option.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dhcpv6Option<'a> {
    pub kind: u16,
    pub data: &'a [u8],
}

impl<'a> Dhcpv6Option<'a> {
    /// Return the option code as a named constant.
    pub fn code(&self) -> OptionCode {
        OptionCode::from(self.kind)
    }
}

/// A lazy cursor over an option list.
///
/// Each step reads a code and a length and yields the value without copying it.
/// A declared length running past the end of the list yields
/// `Err(Error::TruncatedValue)` and between one and three trailing octets yield
/// `Err(Error::TruncatedHeader)`; the iterator is exhausted after an error.
/// The cursor is `Copy`, so a scan can be restarted from any saved position.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dhcpv6OptionsIterator<'a> {
    buffer: &'a [u8],
}

/// Return an iterator over the options in `buf`.
#[inline]
pub fn parse_options(buf: &[u8]) -> Dhcpv6OptionsIterator<'_> {
    Dhcpv6OptionsIterator { buffer: buf }
}

impl<'a> Dhcpv6OptionsIterator<'a> {
    /// Return the first option with the given code.
    ///
    /// Options past the match are not looked at. A structural error ahead of
    /// the match is returned instead of `Ok(None)`.
    pub fn lookup(self, kind: impl Into<u16>) -> Result<Option<Dhcpv6Option<'a>>> {
        let kind = kind.into();
        for option in self {
            let option = option?;
            if option.kind == kind {
                return Ok(Some(option));
            }
        }
        Ok(None)
    }

    /// Walk the whole list, returning the first structural error.
    pub fn check(self) -> Result<()> {
        for option in self {
            option?;
        }
        Ok(())
    }

    /// Return the octets not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        self.buffer
    }
}

impl<'a> Iterator for Dhcpv6OptionsIterator<'a> {
    type Item = Result<Dhcpv6Option<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        let buf = self.buffer;
        if buf.is_empty() {
            return None;
        }
        if buf.len() < field::OPT_DATA.start {
            self.buffer = &[];
            return Some(Err(Error::TruncatedHeader));
        }

        let kind = NetworkEndian::read_u16(&buf[field::OPT_CODE]);
        let len = NetworkEndian::read_u16(&buf[field::OPT_LEN]) as usize;
        let end = field::OPT_DATA.start + len;
        if buf.len() < end {
            self.buffer = &[];
            return Some(Err(Error::TruncatedValue));
        }

        #[cfg(feature = "verbose")]
        net_trace!("dhcpv6: option {} len {}", kind, len);

        self.buffer = &buf[end..];
        Some(Ok(Dhcpv6Option {
            kind,
            data: &buf[field::OPT_DATA.start..end],
        }))
    }
}

impl<'a> FusedIterator for Dhcpv6OptionsIterator<'a> {}

/// A buffer for DHCP options.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dhcpv6OptionWriter<'a> {
    /// The underlying buffer, directly from the DHCP packet representation.
    buffer: &'a mut [u8],
}

impl<'a> Dhcpv6OptionWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer }
    }

    /// Emit a [`Dhcpv6Option`] into a [`Dhcpv6OptionWriter`].
    pub fn emit(&mut self, option: Dhcpv6Option<'_>) -> Result<()> {
        if option.data.len() > u16::MAX as usize {
            return Err(Error::OptionTooLong);
        }

        let total_len = field::OPT_DATA.start + option.data.len();
        if self.buffer.len() < total_len {
            return Err(Error::BufferTooSmall);
        }

        let (buf, rest) = core::mem::take(&mut self.buffer).split_at_mut(total_len);
        self.buffer = rest;

        NetworkEndian::write_u16(&mut buf[field::OPT_CODE], option.kind);
        NetworkEndian::write_u16(&mut buf[field::OPT_LEN], option.data.len() as u16);
        buf[field::OPT_DATA.start..].copy_from_slice(option.data);

        Ok(())
    }

    /// Return the number of octets still available.
    pub fn remaining(&self) -> usize {
        self.buffer.len()
    }
}

pub(crate) mod field {
    #![allow(non_snake_case)]
    #![allow(unused)]

    use crate::wire::field::*;

    pub const MTYPE: usize = 0;

    // Client/server messages.
    pub const XID: Field = 1..4;
    pub const OPTIONS: Rest = 4..;

    // Relay agent/server messages.
    pub const HOP_COUNT: usize = 1;
    pub const LINK_ADDR: Field = 2..18;
    pub const PEER_ADDR: Field = 18..34;
    pub const RELAY_OPTIONS: Rest = 34..;

    // Option framing.
    pub const OPT_CODE: Field = 0..2;
    pub const OPT_LEN: Field = 2..4;
    pub const OPT_DATA: Rest = 4..;
}

/// A read/write wrapper around a DHCPv6 client/server message buffer.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Imbue a raw octet buffer with DHCP packet structure.
    pub const fn new_unchecked(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(buffer: T) -> Result<Packet<T>> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::TruncatedMessageHeader)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        let len = self.buffer.as_ref().len();
        if len < field::OPTIONS.start {
            Err(Error::TruncatedMessageHeader)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Returns the message type.
    pub fn message_type(&self) -> MessageType {
        MessageType::from(self.buffer.as_ref()[field::MTYPE])
    }

    /// Returns the transaction ID.
    ///
    /// The transaction ID (called `xid` in RFC 8415) is a random number used to
    /// associate messages and responses between client and server. The number is chosen by
    /// the client.
    pub fn transaction_id(&self) -> u32 {
        let field = &self.buffer.as_ref()[field::XID];
        NetworkEndian::read_u24(field)
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> Packet<&'a T> {
    /// Return an iterator over the options.
    #[inline]
    pub fn options(&self) -> Dhcpv6OptionsIterator<'a> {
        parse_options(&self.buffer.as_ref()[field::OPTIONS])
    }

    /// Return the DUID carried in the first Client Identifier option, if any.
    pub fn client_id(&self) -> Result<Option<&'a [u8]>> {
        Ok(self
            .options()
            .lookup(OptionCode::ClientId)?
            .map(|option| option.data))
    }

    /// Return the DUID carried in the first Server Identifier option, if any.
    pub fn server_id(&self) -> Result<Option<&'a [u8]>> {
        Ok(self
            .options()
            .lookup(OptionCode::ServerId)?
            .map(|option| option.data))
    }

    /// Return the whole message, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Sets the message type.
    pub fn set_message_type(&mut self, value: MessageType) {
        let field = &mut self.buffer.as_mut()[field::MTYPE];
        *field = value.into();
    }

    /// Sets the transaction ID.
    ///
    /// The transaction ID (called `xid` in RFC 8415) is a random number used to
    /// associate messages and responses between client and server. The number is chosen by
    /// the client.
    pub fn set_transaction_id(&mut self, value: u32) {
        let value = value & 0xff_ffff;
        let field = &mut self.buffer.as_mut()[field::XID];
        NetworkEndian::write_u24(field, value)
    }
}

impl<'a, T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> Packet<&'a mut T> {
    /// Return a pointer to the options.
    #[inline]
    pub fn options_mut(&mut self) -> Dhcpv6OptionWriter<'_> {
        Dhcpv6OptionWriter::new(&mut self.buffer.as_mut()[field::OPTIONS])
    }
}

// Relay agents and servers use the following message format to exchange
// messages with each other:
//
//     0                   1                   2                   3
//     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |    msg-type   |   hop-count   |                               |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               |
//    |                                                               |
//    |                         link-address                          |
//    |                                                               |
//    |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |                               |                               |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               |
//    |                                                               |
//    |                         peer-address                          |
//    |                                                               |
//    |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |                               |                               |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               |
//    .                                                               .
//    .            options (variable number and length)   ....        .
//    |                                                               |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
//                  Figure 3: Relay Agent/Server Message Format
//
//    msg-type             RELAY-FORW (12) or RELAY-REPL (13).
//    hop-count            Number of relay agents that have already
//                         relayed this message.  A 1-octet field.
//    link-address         An address that may be used by the server
//                         to identify the link on which the client is
//                         located.  A 16-octet field.
//    peer-address         The address of the client or relay agent
//                         from which the message to be relayed was
//                         received.  A 16-octet field.
//    options              Options carried in this message.
/// A read/write wrapper around a Relay-Forward or Relay-Reply message buffer.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RelayPacket<T: AsRef<[u8]>> {
    buffer: T,
}

impl<T: AsRef<[u8]>> RelayPacket<T> {
    /// Imbue a raw octet buffer with DHCP relay message structure.
    pub const fn new_unchecked(buffer: T) -> RelayPacket<T> {
        RelayPacket { buffer }
    }

    /// Shorthand for a combination of [new_unchecked] and [check_len].
    ///
    /// [new_unchecked]: #method.new_unchecked
    /// [check_len]: #method.check_len
    pub fn new_checked(buffer: T) -> Result<RelayPacket<T>> {
        let packet = Self::new_unchecked(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::TruncatedRelayHeader)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        let len = self.buffer.as_ref().len();
        if len < field::RELAY_OPTIONS.start {
            Err(Error::TruncatedRelayHeader)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Returns the message type.
    pub fn message_type(&self) -> MessageType {
        MessageType::from(self.buffer.as_ref()[field::MTYPE])
    }

    /// Returns the number of relay agents that already relayed this message.
    pub fn hop_count(&self) -> u8 {
        self.buffer.as_ref()[field::HOP_COUNT]
    }

    /// Returns the address identifying the link the client is on.
    pub fn link_address(&self) -> Ipv6Address {
        read_address(&self.buffer.as_ref()[field::LINK_ADDR])
    }

    /// Returns the address of the client or relay agent this message was received from.
    pub fn peer_address(&self) -> Ipv6Address {
        read_address(&self.buffer.as_ref()[field::PEER_ADDR])
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> RelayPacket<&'a T> {
    /// Return an iterator over the options.
    #[inline]
    pub fn options(&self) -> Dhcpv6OptionsIterator<'a> {
        parse_options(&self.buffer.as_ref()[field::RELAY_OPTIONS])
    }

    /// Return the message carried in the first Relay-Message option.
    pub fn relay_message(&self) -> Result<&'a [u8]> {
        match self.options().lookup(OptionCode::RelayMsg)? {
            Some(option) => Ok(option.data),
            None => Err(Error::MissingRelayMessageOption),
        }
    }

    /// Return the value of the first Interface-Id option, if any.
    pub fn interface_id(&self) -> Result<Option<&'a [u8]>> {
        Ok(self
            .options()
            .lookup(OptionCode::InterfaceId)?
            .map(|option| option.data))
    }

    /// Return the value of the first Remote-Id option, if any.
    ///
    /// The value starts with the four-octet enterprise number of the relay vendor.
    pub fn remote_id(&self) -> Result<Option<&'a [u8]>> {
        Ok(self
            .options()
            .lookup(OptionCode::RemoteId)?
            .map(|option| option.data))
    }

    /// Return the whole message, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.buffer.as_ref()
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> RelayPacket<T> {
    /// Sets the message type.
    pub fn set_message_type(&mut self, value: MessageType) {
        self.buffer.as_mut()[field::MTYPE] = value.into();
    }

    /// Sets the hop count.
    pub fn set_hop_count(&mut self, value: u8) {
        self.buffer.as_mut()[field::HOP_COUNT] = value;
    }

    /// Sets the link address.
    pub fn set_link_address(&mut self, value: Ipv6Address) {
        self.buffer.as_mut()[field::LINK_ADDR].copy_from_slice(&value.octets());
    }

    /// Sets the peer address.
    pub fn set_peer_address(&mut self, value: Ipv6Address) {
        self.buffer.as_mut()[field::PEER_ADDR].copy_from_slice(&value.octets());
    }
}

impl<'a, T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> RelayPacket<&'a mut T> {
    /// Return a pointer to the options.
    #[inline]
    pub fn options_mut(&mut self) -> Dhcpv6OptionWriter<'_> {
        Dhcpv6OptionWriter::new(&mut self.buffer.as_mut()[field::RELAY_OPTIONS])
    }
}

fn read_address(data: &[u8]) -> Ipv6Address {
    let mut octets = [0; 16];
    octets.copy_from_slice(data);
    Ipv6Address::from(octets)
}

/// One layer of a DHCPv6 datagram, classified by its message type.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message<'a> {
    /// A Relay-Forward or Relay-Reply envelope.
    Relay(RelayPacket<&'a [u8]>),
    /// A message exchanged between a client and a server.
    Direct(Packet<&'a [u8]>),
}

impl<'a> Message<'a> {
    /// Classify `buffer` by its leading octet and check that the fixed header is present.
    ///
    /// Message types 12 and 13 need a 34-octet relay header, every other value a
    /// 4-octet client/server header. Unknown message types are not rejected.
    pub fn parse(buffer: &'a [u8]) -> Result<Message<'a>> {
        match buffer.first() {
            None => Err(Error::TruncatedMessageHeader),
            Some(&mtype) if MessageType::from(mtype).is_relay() => {
                RelayPacket::new_checked(buffer).map(Message::Relay)
            }
            Some(_) => Packet::new_checked(buffer).map(Message::Direct),
        }
    }

    /// Returns the message type.
    pub fn message_type(&self) -> MessageType {
        match self {
            Message::Relay(packet) => packet.message_type(),
            Message::Direct(packet) => packet.message_type(),
        }
    }

    /// Returns the hop count of a relay message.
    pub fn hop_count(&self) -> Result<u8> {
        match self {
            Message::Relay(packet) => Ok(packet.hop_count()),
            Message::Direct(_) => Err(Error::NotARelayMessage),
        }
    }

    /// Return an iterator over the options of this layer.
    pub fn options(&self) -> Dhcpv6OptionsIterator<'a> {
        match self {
            Message::Relay(packet) => packet.options(),
            Message::Direct(packet) => packet.options(),
        }
    }

    /// Check that every option of this layer lies within the buffer.
    pub fn check_options(&self) -> Result<()> {
        self.options().check()
    }

    /// Return the whole layer, header included.
    pub fn as_bytes(&self) -> &'a [u8] {
        match self {
            Message::Relay(packet) => packet.as_bytes(),
            Message::Direct(packet) => packet.as_bytes(),
        }
    }
}

impl<'a> fmt::Display for Message<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Message::Relay(packet) => write!(f, "{packet}"),
            Message::Direct(packet) => write!(f, "{packet}"),
        }
    }
}

// All DHCP messages sent between clients and servers share an identical
// fixed-format header and a variable-format area for options.
//
// All values in the message header and in options are in network byte
// order.
//
//     0                   1                   2                   3
//     0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |    msg-type   |               transaction-id                  |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//    |                                                               |
//    .                            options                            .
//    .                 (variable number and length)                  .
//    |                                                               |
//    +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//
//                Figure 2: Client/Server Message Format
#[derive(Debug, PartialEq, Eq, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Repr<'a> {
    /// This field is also known as `msg-type` in the RFC. It indicates the type of DHCP
    /// message this packet represents.
    pub message_type: MessageType,
    /// This field is also known as `transaction-id` in the RFC. It is a random number
    /// chosen by the client, used by the client and server to associate messages and
    /// responses between a client and a server.
    /// Note: Only the first 24bits of this ID are actually used
    pub transaction_id: u32,
    /// The client DUID
    pub client_id: Option<&'a [u8]>,
    /// The server DUID
    pub server_id: Option<&'a [u8]>,
    /// The elapsed time in hundreds of a second
    pub elapsed_time: Option<u16>,
    /// When returned from [`Repr::parse`], this field will be empty.
    /// However, when calling [`Repr::emit`], this field should contain only
    /// additional DHCP options not known to this crate.
    pub additional_options: &'a [Dhcpv6Option<'a>],
}

impl<'a> Repr<'a> {
    /// Return the length of a packet that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        let mut len = field::OPTIONS.start;

        if let Some(id) = self.client_id.as_ref() {
            len += 4 + id.len();
        }
        if let Some(id) = self.server_id.as_ref() {
            len += 4 + id.len();
        }
        if self.elapsed_time.is_some() {
            len += 4 + 2;
        }
        for opt in self.additional_options {
            len += 4 + opt.data.len()
        }

        len
    }

    /// Parse a DHCP packet and return a high-level representation.
    ///
    /// The first Client Identifier and Server Identifier options win. Every
    /// option is bounds-checked, so a malformed option list fails the parse.
    pub fn parse<T>(packet: &Packet<&'a T>) -> Result<Self>
    where
        T: AsRef<[u8]> + ?Sized,
    {
        let mut client_id = None;
        let mut server_id = None;
        let mut elapsed_time = None;

        for option in packet.options() {
            let option = option?;
            let data = option.data;
            match (option.code(), data.len()) {
                (OptionCode::ClientId, _) if client_id.is_none() => {
                    client_id = Some(data);
                }
                (OptionCode::ServerId, _) if server_id.is_none() => {
                    server_id = Some(data);
                }
                (OptionCode::ElapsedTime, 2) => {
                    elapsed_time = Some(NetworkEndian::read_u16(data));
                }
                _ => {}
            }
        }

        Ok(Repr {
            message_type: packet.message_type(),
            transaction_id: packet.transaction_id(),
            client_id,
            server_id,
            elapsed_time,
            additional_options: &[],
        })
    }

    /// Emit a high-level representation into a Dynamic Host
    /// Configuration Protocol packet.
    pub fn emit<T>(&self, packet: &mut Packet<&mut T>) -> Result<()>
    where
        T: AsRef<[u8]> + AsMut<[u8]> + ?Sized,
    {
        packet.check_len()?;
        packet.set_message_type(self.message_type);
        packet.set_transaction_id(self.transaction_id);

        let mut options = packet.options_mut();

        if let Some(val) = self.client_id {
            options.emit(Dhcpv6Option {
                kind: OptionCode::ClientId.into(),
                data: val,
            })?;
        }

        if let Some(val) = self.server_id {
            options.emit(Dhcpv6Option {
                kind: OptionCode::ServerId.into(),
                data: val,
            })?;
        }

        if let Some(val) = self.elapsed_time {
            options.emit(Dhcpv6Option {
                kind: OptionCode::ElapsedTime.into(),
                data: &val.to_be_bytes(),
            })?;
        }

        for option in self.additional_options {
            options.emit(*option)?;
        }

        Ok(())
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> fmt::Display for Packet<&'a T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match Repr::parse(self) {
            Ok(repr) => write!(f, "{repr}"),
            Err(err) => {
                write!(f, "DHCPv6 ({err})")
            }
        }
    }
}

impl<'a> fmt::Display for Repr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "DHCPv6 msg-type={} trans-id={:#08x}",
            self.message_type, self.transaction_id
        )?;

        if let Some(server_id) = self.server_id.as_ref() {
            write!(f, " server-id={:02x?}", server_id)?;
        }
        if let Some(client_id) = self.client_id.as_ref() {
            write!(f, " client-id={:02x?}", client_id)?;
        }
        if let Some(elapsed_time) = self.elapsed_time.as_ref() {
            write!(f, " elapsed-time={}/100s", elapsed_time)?;
        }
        Ok(())
    }
}

/// A high-level representation of a Relay-Forward or Relay-Reply message.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct RelayRepr<'a> {
    pub message_type: MessageType,
    pub hop_count: u8,
    pub link_address: Ipv6Address,
    pub peer_address: Ipv6Address,
    /// The complete message being relayed, carried in the Relay-Message option.
    pub relay_message: &'a [u8],
    pub interface_id: Option<&'a [u8]>,
    pub remote_id: Option<&'a [u8]>,
}

impl<'a> RelayRepr<'a> {
    /// Return the length of a packet that will be emitted from this high-level representation.
    pub fn buffer_len(&self) -> usize {
        let mut len = field::RELAY_OPTIONS.start;
        len += 4 + self.relay_message.len();
        if let Some(id) = self.remote_id {
            len += 4 + id.len();
        }
        if let Some(id) = self.interface_id {
            len += 4 + id.len();
        }
        len
    }

    /// Parse a relay message and return a high-level representation.
    pub fn parse<T>(packet: &RelayPacket<&'a T>) -> Result<Self>
    where
        T: AsRef<[u8]> + ?Sized,
    {
        let mut relay_message = None;
        let mut interface_id = None;
        let mut remote_id = None;

        for option in packet.options() {
            let option = option?;
            match option.code() {
                OptionCode::RelayMsg if relay_message.is_none() => {
                    relay_message = Some(option.data);
                }
                OptionCode::InterfaceId if interface_id.is_none() => {
                    interface_id = Some(option.data);
                }
                OptionCode::RemoteId if remote_id.is_none() => {
                    remote_id = Some(option.data);
                }
                _ => {}
            }
        }

        Ok(RelayRepr {
            message_type: packet.message_type(),
            hop_count: packet.hop_count(),
            link_address: packet.link_address(),
            peer_address: packet.peer_address(),
            relay_message: relay_message.ok_or(Error::MissingRelayMessageOption)?,
            interface_id,
            remote_id,
        })
    }

    /// Emit a high-level representation into a relay message buffer.
    ///
    /// The Relay-Message option comes first, followed by Remote-Id and
    /// Interface-Id when present.
    pub fn emit<T>(&self, packet: &mut RelayPacket<&mut T>) -> Result<()>
    where
        T: AsRef<[u8]> + AsMut<[u8]> + ?Sized,
    {
        packet.check_len()?;
        packet.set_message_type(self.message_type);
        packet.set_hop_count(self.hop_count);
        packet.set_link_address(self.link_address);
        packet.set_peer_address(self.peer_address);

        let mut options = packet.options_mut();
        options.emit(Dhcpv6Option {
            kind: OptionCode::RelayMsg.into(),
            data: self.relay_message,
        })?;
        if let Some(val) = self.remote_id {
            options.emit(Dhcpv6Option {
                kind: OptionCode::RemoteId.into(),
                data: val,
            })?;
        }
        if let Some(val) = self.interface_id {
            options.emit(Dhcpv6Option {
                kind: OptionCode::InterfaceId.into(),
                data: val,
            })?;
        }

        Ok(())
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> fmt::Display for RelayPacket<&'a T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match RelayRepr::parse(self) {
            Ok(repr) => write!(f, "{repr}"),
            Err(err) => {
                write!(f, "DHCPv6 relay ({err})")
            }
        }
    }
}

impl<'a> fmt::Display for RelayRepr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "DHCPv6 msg-type={} hop-count={} link-addr={} peer-addr={} relay-msg-len={}",
            self.message_type,
            self.hop_count,
            self.link_address,
            self.peer_address,
            self.relay_message.len()
        )?;
        if let Some(id) = self.interface_id {
            write!(f, " interface-id={:02x?}", id)?;
        }
        if let Some(id) = self.remote_id {
            write!(f, " remote-id={:02x?}", id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static SOLICIT_BYTES: [u8; 40] = [
        0x01, 0x00, 0xcd, 0x2e, 0x00, 0x08, 0x00, 0x02, 0xff, 0xff, 0x00, 0x01, 0x00, 0x0a, 0x00,
        0x03, 0x00, 0x01, 0x90, 0xe2, 0xba, 0x76, 0x33, 0x44, 0x00, 0x03, 0x00, 0x0c, 0x01, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    ];

    static CLIENT_DUID: [u8; 10] = [0x00, 0x03, 0x00, 0x01, 0x90, 0xe2, 0xba, 0x76, 0x33, 0x44];

    static RELAY_FORW_BYTES: [u8; 104] = [
        0x0c, 0x00, 0x24, 0x01, 0xdb, 0x00, 0x30, 0x10, 0xc0, 0xfa, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x0a, 0xfe, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x92, 0xe2, 0xba, 0xff,
        0xfe, 0x76, 0x33, 0x44, 0x00, 0x09, 0x00, 0x28, 0x01, 0x00, 0xcd, 0x2e, 0x00, 0x08, 0x00,
        0x02, 0xff, 0xff, 0x00, 0x01, 0x00, 0x0a, 0x00, 0x03, 0x00, 0x01, 0x90, 0xe2, 0xba, 0x76,
        0x33, 0x44, 0x00, 0x03, 0x00, 0x0c, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x25, 0x00, 0x0e, 0x00, 0x00, 0x00, 0x09, 0x00, 0x03, 0x08, 0x00,
        0x88, 0x5a, 0x92, 0xde, 0x8a, 0xbc, 0x00, 0x12, 0x00, 0x04, 0x09, 0x01, 0x08, 0xca,
    ];

    fn link_address() -> Ipv6Address {
        "2401:db00:3010:c0fa::a".parse().unwrap()
    }

    fn peer_address() -> Ipv6Address {
        "fe80::92e2:baff:fe76:3344".parse().unwrap()
    }

    #[test]
    fn test_options_iter() {
        let mut options = parse_options(&SOLICIT_BYTES[4..]);
        assert_eq!(
            options.next(),
            Some(Ok(Dhcpv6Option {
                kind: 8,
                data: &[0xff, 0xff],
            }))
        );
        assert_eq!(
            options.next(),
            Some(Ok(Dhcpv6Option {
                kind: 1,
                data: &CLIENT_DUID,
            }))
        );
        let ia_na = options.next().unwrap().unwrap();
        assert_eq!(ia_na.code(), OptionCode::IaNa);
        assert_eq!(ia_na.data.len(), 12);
        assert_eq!(options.next(), None);
        assert_eq!(options.next(), None);
    }

    #[test]
    fn test_options_restartable() {
        let options = parse_options(&SOLICIT_BYTES[4..]);
        assert_eq!(options.count(), 3);
        assert_eq!(options.count(), 3);
        assert_eq!(options.remaining().len(), 36);
    }

    #[test]
    fn test_options_empty() {
        assert_eq!(parse_options(&[]).next(), None);
        assert_eq!(parse_options(&[]).check(), Ok(()));
        assert_eq!(parse_options(&[]).lookup(OptionCode::ClientId), Ok(None));
    }

    #[test]
    fn test_options_truncated_header() {
        let bytes = [0x00, 0x08, 0x00, 0x02, 0xff, 0xff, 0x00, 0x01, 0x00];
        let mut options = parse_options(&bytes);
        assert!(options.next().unwrap().is_ok());
        assert_eq!(options.next(), Some(Err(Error::TruncatedHeader)));
        assert_eq!(options.next(), None);
    }

    #[test]
    fn test_options_truncated_value() {
        for cut in 1..CLIENT_DUID.len() {
            let bytes = &SOLICIT_BYTES[4..10 + 4 + cut];
            let mut options = parse_options(bytes);
            assert!(options.next().unwrap().is_ok());
            assert_eq!(options.next(), Some(Err(Error::TruncatedValue)));
            assert_eq!(options.next(), None);
        }
    }

    #[test]
    fn test_options_max_length() {
        let bytes = [0x00, 0x01, 0xff, 0xff, 0x00];
        assert_eq!(parse_options(&bytes).check(), Err(Error::TruncatedValue));
    }

    #[test]
    fn test_lookup_first_match() {
        let bytes = [
            0x00, 0x01, 0x00, 0x01, 0xaa, 0x00, 0x01, 0x00, 0x01, 0xbb, 0x00, 0x02,
        ];
        let option = parse_options(&bytes).lookup(OptionCode::ClientId).unwrap();
        assert_eq!(option.map(|opt| opt.data), Some(&[0xaa][..]));
        // The trailing garbage is never reached.
        assert_eq!(parse_options(&bytes).check(), Err(Error::TruncatedHeader));
        // An error ahead of a match is reported.
        assert_eq!(
            parse_options(&bytes).lookup(OptionCode::ServerId),
            Err(Error::TruncatedHeader)
        );
    }

    #[test]
    fn test_deconstruct() {
        let packet = Packet::new_checked(&SOLICIT_BYTES[..]).unwrap();
        assert_eq!(packet.message_type(), MessageType::Solicit);
        assert_eq!(packet.transaction_id(), 0x00cd2e);
        assert_eq!(packet.client_id(), Ok(Some(&CLIENT_DUID[..])));
        assert_eq!(packet.server_id(), Ok(None));
        assert_eq!(packet.as_bytes(), &SOLICIT_BYTES[..]);
    }

    #[test]
    fn test_check_len() {
        assert_eq!(
            Packet::new_checked(&SOLICIT_BYTES[..3]),
            Err(Error::TruncatedMessageHeader)
        );
        assert!(Packet::new_checked(&SOLICIT_BYTES[..4]).is_ok());
        assert_eq!(
            RelayPacket::new_checked(&RELAY_FORW_BYTES[..33]),
            Err(Error::TruncatedRelayHeader)
        );
        assert!(RelayPacket::new_checked(&RELAY_FORW_BYTES[..34]).is_ok());
    }

    #[test]
    fn test_parse() {
        let packet = Packet::new_unchecked(&SOLICIT_BYTES[..]);
        let repr = Repr::parse(&packet).unwrap();
        assert_eq!(
            repr,
            Repr {
                message_type: MessageType::Solicit,
                transaction_id: 0x00cd2e,
                client_id: Some(&CLIENT_DUID),
                server_id: None,
                elapsed_time: Some(0xffff),
                additional_options: &[],
            }
        );
    }

    #[test]
    fn test_parse_malformed() {
        let mut bytes = SOLICIT_BYTES;
        bytes[13] = 0x20;
        let packet = Packet::new_unchecked(&bytes[..]);
        assert_eq!(Repr::parse(&packet), Err(Error::TruncatedValue));
        assert_eq!(packet.client_id(), Err(Error::TruncatedValue));
    }

    #[test]
    fn test_emit() {
        let ia_na = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        let repr = Repr {
            message_type: MessageType::Solicit,
            transaction_id: 0x00cd2e,
            client_id: Some(&CLIENT_DUID),
            server_id: None,
            elapsed_time: None,
            additional_options: &[Dhcpv6Option {
                kind: OptionCode::IaNa.into(),
                data: &ia_na,
            }],
        };
        let mut bytes = vec![0; repr.buffer_len()];
        let mut packet = Packet::new_unchecked(&mut bytes[..]);
        repr.emit(&mut packet).unwrap();
        // Same as SOLICIT_BYTES without the elapsed-time option.
        assert_eq!(&bytes[..4], &SOLICIT_BYTES[..4]);
        assert_eq!(&bytes[4..], &SOLICIT_BYTES[10..]);
    }

    #[test]
    fn test_emit_buffer_too_small() {
        let repr = Repr {
            message_type: MessageType::Solicit,
            transaction_id: 1,
            client_id: Some(&CLIENT_DUID),
            server_id: None,
            elapsed_time: None,
            additional_options: &[],
        };
        let mut bytes = vec![0; repr.buffer_len() - 1];
        let mut packet = Packet::new_unchecked(&mut bytes[..]);
        assert_eq!(repr.emit(&mut packet), Err(Error::BufferTooSmall));

        let mut bytes = [0; 2];
        let mut packet = Packet::new_unchecked(&mut bytes[..]);
        assert_eq!(repr.emit(&mut packet), Err(Error::TruncatedMessageHeader));
    }

    #[test]
    fn test_option_writer_too_long() {
        let data = vec![0; u16::MAX as usize + 1];
        let mut buffer = vec![0; data.len() + 4];
        let mut writer = Dhcpv6OptionWriter::new(&mut buffer);
        assert_eq!(
            writer.emit(Dhcpv6Option { kind: 1, data: &data }),
            Err(Error::OptionTooLong)
        );
        assert_eq!(writer.remaining(), data.len() + 4);
    }

    #[test]
    fn test_relay_deconstruct() {
        let packet = RelayPacket::new_checked(&RELAY_FORW_BYTES[..]).unwrap();
        assert_eq!(packet.message_type(), MessageType::RelayForw);
        assert_eq!(packet.hop_count(), 0);
        assert_eq!(packet.link_address(), link_address());
        assert_eq!(packet.peer_address(), peer_address());
        assert_eq!(packet.relay_message(), Ok(&SOLICIT_BYTES[..]));
        assert_eq!(packet.interface_id(), Ok(Some(&[0x09, 0x01, 0x08, 0xca][..])));
        assert_eq!(
            packet.remote_id(),
            Ok(Some(
                &[
                    0x00, 0x00, 0x00, 0x09, 0x00, 0x03, 0x08, 0x00, 0x88, 0x5a, 0x92, 0xde, 0x8a,
                    0xbc
                ][..]
            ))
        );
    }

    #[test]
    fn test_relay_missing_relay_message() {
        let packet = RelayPacket::new_checked(&RELAY_FORW_BYTES[..34]).unwrap();
        assert_eq!(packet.relay_message(), Err(Error::MissingRelayMessageOption));
        assert_eq!(packet.interface_id(), Ok(None));
    }

    #[test]
    fn test_relay_parse_emit() {
        let packet = RelayPacket::new_unchecked(&RELAY_FORW_BYTES[..]);
        let repr = RelayRepr::parse(&packet).unwrap();
        assert_eq!(repr.relay_message, &SOLICIT_BYTES[..]);
        assert_eq!(repr.buffer_len(), RELAY_FORW_BYTES.len());

        let mut bytes = vec![0; repr.buffer_len()];
        let mut packet = RelayPacket::new_unchecked(&mut bytes[..]);
        repr.emit(&mut packet).unwrap();
        assert_eq!(&bytes[..], &RELAY_FORW_BYTES[..]);
    }

    #[test]
    fn test_message_classify() {
        match Message::parse(&RELAY_FORW_BYTES).unwrap() {
            Message::Relay(packet) => assert_eq!(packet.hop_count(), 0),
            Message::Direct(_) => panic!("expected a relay message"),
        }
        let message = Message::parse(&SOLICIT_BYTES).unwrap();
        assert_eq!(message.message_type(), MessageType::Solicit);
        assert_eq!(message.hop_count(), Err(Error::NotARelayMessage));
        assert_eq!(message.check_options(), Ok(()));
    }

    #[test]
    fn test_message_truncated() {
        assert_eq!(Message::parse(&[]), Err(Error::TruncatedMessageHeader));
        assert_eq!(
            Message::parse(&[0x01, 0x00, 0xcd]),
            Err(Error::TruncatedMessageHeader)
        );
        assert_eq!(Message::parse(&[0x0c, 0x00]), Err(Error::TruncatedRelayHeader));
        assert_eq!(
            Message::parse(&RELAY_FORW_BYTES[..20]),
            Err(Error::TruncatedRelayHeader)
        );
    }

    #[test]
    fn test_message_unknown_type() {
        let bytes = [0xc8, 0x12, 0x34, 0x56];
        let message = Message::parse(&bytes).unwrap();
        assert_eq!(message.message_type(), MessageType::Unknown(200));
        assert_eq!(format!("{}", message.message_type()), "unknown(200)");
    }

    #[test]
    fn test_display() {
        let packet = Packet::new_unchecked(&SOLICIT_BYTES[..]);
        assert_eq!(
            format!("{packet}"),
            "DHCPv6 msg-type=solicit trans-id=0x00cd2e \
             client-id=[00, 03, 00, 01, 90, e2, ba, 76, 33, 44] elapsed-time=65535/100s"
        );
        let packet = RelayPacket::new_unchecked(&RELAY_FORW_BYTES[..34]);
        assert_eq!(format!("{packet}"), "DHCPv6 relay (missing relay message option)");
    }
}

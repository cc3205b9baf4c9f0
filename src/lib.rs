#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(unsafe_code)]

//! The _dhcp6relay_ library decodes the DHCPv6 datagrams a DHCP load balancer
//! receives and re-encapsulates them for forwarding to a backend server.
//!
//! DHCPv6 messages that crossed relay agents arrive wrapped in one or more
//! Relay-Forward or Relay-Reply envelopes, each of which carries the next layer
//! in its Relay-Message option. Every length in that structure is chosen by
//! whoever sent the datagram, so the decoder never trusts one: all accessors
//! return a [`wire::Result`] and no input makes them read past the buffer,
//! loop, or panic.
//!
//! # The wire layer
//! The `wire` module deals with the packet *representation*. It provides two
//! levels of functionality.
//!
//!  * First, it provides functions to extract fields from sequences of octets,
//!    and to insert fields into sequences of octets. This happens through the
//!    `Packet` and `RelayPacket` families of structures, e.g.
//!    [`Dhcpv6Packet`](wire::Dhcpv6Packet), and through the lazy
//!    option cursor returned by [`parse_options`](wire::parse_options).
//!  * Second, in cases where the space of valid field values is much smaller
//!    than the space of possible field values, it provides a compact, high-level
//!    representation of packet data that can be parsed from and emitted into
//!    a sequence of octets. This happens through the `Repr` family of structs.
//!
//! # The relay chain
//! The `chain` module walks nested relay envelopes down to the client or
//! server message and answers the questions a load-balancing policy asks:
//! transaction ID, client DUID, client MAC address, hop count and the peer
//! address recorded by the relay agent closest to the client. It also wraps a
//! datagram in one more Relay-Forward envelope.
//!
//! # Minimum Supported Rust Version (MSRV)
//!
//! This crate is guaranteed to compile on stable Rust 1.77 and up with any
//! valid set of features.

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(all(feature = "log", feature = "defmt"))]
compile_error!("You must enable at most one of the following features: defmt, log");

#[macro_use]
mod macros;

pub mod chain;
pub mod wire;

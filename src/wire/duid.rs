// See https://datatracker.ietf.org/doc/html/rfc8415#section-11 for the DUID formats.

use byteorder::{ByteOrder, NetworkEndian};
use core::fmt;

use super::{Error, EthernetAddress, Result};

enum_with_unknown! {
    /// The type of a DHCP Unique Identifier.
    pub enum DuidType(u16) {
        /// Link-layer address plus time.
        Llt = 1,
        /// Vendor-assigned unique ID based on enterprise number.
        En = 2,
        /// Link-layer address.
        Ll = 3,
        /// Universally unique identifier.
        Uuid = 4,
    }
}

impl fmt::Display for DuidType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Llt => write!(f, "DUID-LLT"),
            Self::En => write!(f, "DUID-EN"),
            Self::Ll => write!(f, "DUID-LL"),
            Self::Uuid => write!(f, "DUID-UUID"),
            Self::Unknown(a) => write!(f, "unknown({a})"),
        }
    }
}

mod field {
    #![allow(non_snake_case)]
    #![allow(unused)]

    use crate::wire::field::*;

    pub const TYPE: Field = 0..2;

    // DUID-LLT: hardware type, time, link-layer address.
    pub const LLT_HTYPE: Field = 2..4;
    pub const LLT_TIME: Field = 4..8;
    pub const LLT_LLADDR: Rest = 8..;

    // DUID-EN: enterprise number, identifier.
    pub const EN_NUMBER: Field = 2..6;
    pub const EN_IDENTIFIER: Rest = 6..;

    // DUID-LL: hardware type, link-layer address.
    pub const LL_HTYPE: Field = 2..4;
    pub const LL_LLADDR: Rest = 4..;

    pub const UUID: Rest = 2..;
}

/// A DHCP Unique Identifier, viewed through its leading type code.
///
/// All variants borrow from the option value they were parsed from. Apart from
/// the fixed fields named here the DUID is opaque.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duid<'a> {
    Llt {
        hardware_type: u16,
        /// Seconds since midnight (UTC), January 1, 2000, modulo 2^32.
        time: u32,
        link_layer_address: &'a [u8],
    },
    En {
        enterprise_number: u32,
        identifier: &'a [u8],
    },
    Ll {
        hardware_type: u16,
        link_layer_address: &'a [u8],
    },
    Uuid(&'a [u8]),
    Unknown {
        duid_type: u16,
        data: &'a [u8],
    },
}

impl<'a> Duid<'a> {
    /// Parse the value of a Client Identifier or Server Identifier option.
    ///
    /// Returns `Err(Error::TruncatedDuid)` if `data` is shorter than the type
    /// code plus the fixed fields of that type.
    pub fn parse(data: &'a [u8]) -> Result<Duid<'a>> {
        if data.len() < field::TYPE.end {
            return Err(Error::TruncatedDuid);
        }

        let duid = match DuidType::from(NetworkEndian::read_u16(&data[field::TYPE])) {
            DuidType::Llt => {
                if data.len() < field::LLT_LLADDR.start {
                    return Err(Error::TruncatedDuid);
                }
                Duid::Llt {
                    hardware_type: NetworkEndian::read_u16(&data[field::LLT_HTYPE]),
                    time: NetworkEndian::read_u32(&data[field::LLT_TIME]),
                    link_layer_address: &data[field::LLT_LLADDR],
                }
            }
            DuidType::En => {
                if data.len() < field::EN_IDENTIFIER.start {
                    return Err(Error::TruncatedDuid);
                }
                Duid::En {
                    enterprise_number: NetworkEndian::read_u32(&data[field::EN_NUMBER]),
                    identifier: &data[field::EN_IDENTIFIER],
                }
            }
            DuidType::Ll => {
                if data.len() < field::LL_LLADDR.start {
                    return Err(Error::TruncatedDuid);
                }
                Duid::Ll {
                    hardware_type: NetworkEndian::read_u16(&data[field::LL_HTYPE]),
                    link_layer_address: &data[field::LL_LLADDR],
                }
            }
            DuidType::Uuid => Duid::Uuid(&data[field::UUID]),
            DuidType::Unknown(duid_type) => Duid::Unknown {
                duid_type,
                data: &data[field::TYPE.end..],
            },
        };

        Ok(duid)
    }

    /// Return the type code of this DUID.
    pub fn duid_type(&self) -> DuidType {
        match *self {
            Duid::Llt { .. } => DuidType::Llt,
            Duid::En { .. } => DuidType::En,
            Duid::Ll { .. } => DuidType::Ll,
            Duid::Uuid(_) => DuidType::Uuid,
            Duid::Unknown { duid_type, .. } => DuidType::Unknown(duid_type),
        }
    }

    /// Return the link-layer address embedded in this DUID, if its type carries one.
    ///
    /// The address is taken from the trailing six octets of the link-layer
    /// address field, whatever the hardware type says. DUID-EN, DUID-UUID and
    /// unknown types never embed one.
    pub fn mac(&self) -> Option<EthernetAddress> {
        match *self {
            Duid::Llt {
                link_layer_address, ..
            }
            | Duid::Ll {
                link_layer_address, ..
            } => {
                let start = link_layer_address.len().checked_sub(6)?;
                EthernetAddress::from_bytes(&link_layer_address[start..])
            }
            Duid::En { .. } | Duid::Uuid(_) | Duid::Unknown { .. } => None,
        }
    }
}

impl<'a> fmt::Display for Duid<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Duid::Llt {
                hardware_type,
                time,
                link_layer_address,
            } => write!(
                f,
                "{} htype={} time={} lladdr={:02x?}",
                self.duid_type(),
                hardware_type,
                time,
                link_layer_address
            ),
            Duid::En {
                enterprise_number,
                identifier,
            } => write!(
                f,
                "{} enterprise={} id={:02x?}",
                self.duid_type(),
                enterprise_number,
                identifier
            ),
            Duid::Ll {
                hardware_type,
                link_layer_address,
            } => write!(
                f,
                "{} htype={} lladdr={:02x?}",
                self.duid_type(),
                hardware_type,
                link_layer_address
            ),
            Duid::Uuid(uuid) => write!(f, "{} uuid={:02x?}", self.duid_type(), uuid),
            Duid::Unknown { data, .. } => write!(f, "{} data={:02x?}", self.duid_type(), data),
        }
    }
}

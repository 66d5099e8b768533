//! Transmission lines and converters between AC regions.
use crate::region::RegionID;
use crate::units::Power;
use serde_string_enum::DeserializeLabeledStringEnum;

/// How power is transferred along a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, DeserializeLabeledStringEnum, strum::Display)]
pub enum TransferType {
    /// An ordinary AC corridor between two AC regions
    #[string = "AC"]
    #[strum(serialize = "AC")]
    Ac,
    /// A converter-based corridor, modelled between the DC twins of its endpoints
    #[string = "VSC"]
    #[strum(serialize = "VSC")]
    Vsc,
}

/// Transfer capability in one direction between two AC regions
#[derive(Debug, Clone, PartialEq)]
pub struct TransmissionLine {
    /// The region power flows from
    pub from_region: RegionID,
    /// The region power flows to
    pub to_region: RegionID,
    /// The kind of corridor
    pub transfer_type: TransferType,
    /// Transfer limit (MW)
    pub capacity: Power,
}

/// An AC/DC converter located in an AC region
#[derive(Debug, Clone, PartialEq)]
pub struct Converter {
    /// The AC region the converter sits in
    pub region: RegionID,
    /// Rated capacity (MW), usable in either direction
    pub capacity: Power,
}

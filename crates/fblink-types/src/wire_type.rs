use crate::error::{Result, TypeError};

/// On-wire tag bytes. These must match the values FORTE emits exactly.
pub mod tags {
    /// BOOL carrying `true` (the tag byte is the value, no payload follows).
    pub const BOOL_TRUE: u8 = 64;
    /// BOOL carrying `false`.
    pub const BOOL_FALSE: u8 = 65;
    pub const SINT: u8 = 66;
    pub const INT: u8 = 67;
    pub const DINT: u8 = 68;
    pub const LINT: u8 = 69;
    pub const USINT: u8 = 70;
    pub const UINT: u8 = 71;
    pub const UDINT: u8 = 72;
    pub const ULINT: u8 = 73;
    pub const REAL: u8 = 74;
    pub const LREAL: u8 = 75;
    pub const DATE_AND_TIME: u8 = 79;
    pub const STRING: u8 = 80;
    /// Marks an array slot: followed by a 2-byte element count.
    pub const ARRAY: u8 = 118;
    /// Acknowledgement frame with no payload slots.
    pub const ACK: u8 = 5;
}

/// The IEC 61499 data kinds this stack can encode and decode.
///
/// Several wire types collapse to a single decoded value type (all short
/// integer kinds decode to `i32`, both long kinds to `i64`) but keep distinct
/// encoded byte lengths: the remote side sizes its reads by the declared
/// type, so the asymmetry must be preserved on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Bool,
    Sint,
    Int,
    Dint,
    Lint,
    Usint,
    Uint,
    Udint,
    Ulint,
    Real,
    Lreal,
    DateAndTime,
    String,
    /// No payload; the slot only ever carries an acknowledgement.
    None,
}

impl WireType {
    /// The tag byte written ahead of a scalar payload.
    ///
    /// For `Bool` this is the `true` tag; the encoder picks between the two
    /// BOOL tags based on the value.
    pub fn tag(self) -> u8 {
        match self {
            WireType::Bool => tags::BOOL_TRUE,
            WireType::Sint => tags::SINT,
            WireType::Int => tags::INT,
            WireType::Dint => tags::DINT,
            WireType::Lint => tags::LINT,
            WireType::Usint => tags::USINT,
            WireType::Uint => tags::UINT,
            WireType::Udint => tags::UDINT,
            WireType::Ulint => tags::ULINT,
            WireType::Real => tags::REAL,
            WireType::Lreal => tags::LREAL,
            WireType::DateAndTime => tags::DATE_AND_TIME,
            WireType::String => tags::STRING,
            WireType::None => tags::ACK,
        }
    }

    /// Encoded length of one scalar of this type: header tag plus payload.
    ///
    /// For `String` this is the worst case (2-byte length header addresses
    /// at most 65533 content bytes).
    pub fn encoded_len(self) -> usize {
        match self {
            WireType::Bool => 1,
            WireType::Sint | WireType::Usint => 2,
            WireType::Int | WireType::Uint => 3,
            WireType::Dint | WireType::Udint => 5,
            WireType::Lint | WireType::Ulint => 9,
            WireType::Real => 5,
            WireType::Lreal => 9,
            WireType::DateAndTime => 9,
            WireType::String => 65535,
            WireType::None => 1,
        }
    }

    /// Looks up the wire type named by a received tag byte.
    ///
    /// Both BOOL tags resolve to [`WireType::Bool`].
    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            tags::BOOL_TRUE | tags::BOOL_FALSE => Ok(WireType::Bool),
            tags::SINT => Ok(WireType::Sint),
            tags::INT => Ok(WireType::Int),
            tags::DINT => Ok(WireType::Dint),
            tags::LINT => Ok(WireType::Lint),
            tags::USINT => Ok(WireType::Usint),
            tags::UINT => Ok(WireType::Uint),
            tags::UDINT => Ok(WireType::Udint),
            tags::ULINT => Ok(WireType::Ulint),
            tags::REAL => Ok(WireType::Real),
            tags::LREAL => Ok(WireType::Lreal),
            tags::DATE_AND_TIME => Ok(WireType::DateAndTime),
            tags::STRING => Ok(WireType::String),
            tags::ACK => Ok(WireType::None),
            _ => Err(TypeError::UnsupportedTag { tag }),
        }
    }

    /// True for the wire types that decode to `i32`.
    pub fn is_int_kind(self) -> bool {
        matches!(
            self,
            WireType::Sint
                | WireType::Usint
                | WireType::Int
                | WireType::Uint
                | WireType::Dint
                | WireType::Udint
        )
    }

    /// True for the wire types that decode to `i64`.
    pub fn is_long_kind(self) -> bool {
        matches!(self, WireType::Lint | WireType::Ulint)
    }

    /// Name of the decoded value kind, used in accessor mismatch messages.
    pub fn kind_name(self) -> &'static str {
        match self {
            WireType::Bool => "bool",
            WireType::Sint
            | WireType::Usint
            | WireType::Int
            | WireType::Uint
            | WireType::Dint
            | WireType::Udint => "int",
            WireType::Lint | WireType::Ulint => "long",
            WireType::Real => "float",
            WireType::Lreal => "double",
            WireType::DateAndTime => "date and time",
            WireType::String => "string",
            WireType::None => "acknowledgement",
        }
    }
}

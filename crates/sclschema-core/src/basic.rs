//! The fixed set of NSD basic types.

use serde::{Deserialize, Serialize};

/// One of the standard's built-in basic attribute types.
///
/// The set is closed: validation rules are built into the engine rather than
/// data-driven, so a schema document can only refer to these by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    /// `BOOLEAN` - one of `0`, `1`, `false`, `true`.
    Boolean,
    /// `INT8` - signed 8-bit integer.
    Int8,
    /// `INT16` - signed 16-bit integer.
    Int16,
    /// `INT32` - signed 32-bit integer.
    Int32,
    /// `INT64` - signed 64-bit integer.
    Int64,
    /// `INT8U` - unsigned integer in `0..=255`.
    Int8U,
    /// `INT16U` - unsigned integer in `0..=65535`.
    Int16U,
    /// `INT32U` - unsigned integer in `0..=4294967295`.
    Int32U,
    /// `FLOAT32` - IEEE-754 single precision.
    Float32,
    /// `Octet64` - at most 64 encoded bytes.
    Octet64,
    /// `VisString64` - visible string, at most 64 encoded bytes.
    VisString64,
    /// `VisString129` - visible string, at most 129 encoded bytes.
    VisString129,
    /// `VisString255` - visible string, at most 255 encoded bytes.
    VisString255,
    /// `Unicode255` - unicode string, at most 255 encoded bytes.
    Unicode255,
    /// `Currency` - an ISO 4217 three-letter currency code.
    Currency,
    /// `PhyComAddr` - accepted without content validation.
    PhyComAddr,
    /// `ObjRef` - accepted without content validation.
    ObjRef,
    /// `EntryID` - accepted without content validation.
    EntryId,
    /// `Timestamp` - accepted without content validation.
    Timestamp,
    /// `Quality` - accepted without content validation.
    Quality,
    /// `EntryTime` - accepted without content validation.
    EntryTime,
    /// `TrgOps` - accepted without content validation.
    TrgOps,
    /// `OptFlds` - accepted without content validation.
    OptFlds,
    /// `SvOptFlds` - accepted without content validation.
    SvOptFlds,
    /// `Check` - accepted without content validation.
    Check,
    /// `Tcmd` - accepted without content validation.
    Tcmd,
    /// `Dbpos` - accepted without content validation.
    Dbpos,
}

impl BasicType {
    /// All members of the closed set, in declaration order.
    pub const ALL: [BasicType; 27] = [
        BasicType::Boolean,
        BasicType::Int8,
        BasicType::Int16,
        BasicType::Int32,
        BasicType::Int64,
        BasicType::Int8U,
        BasicType::Int16U,
        BasicType::Int32U,
        BasicType::Float32,
        BasicType::Octet64,
        BasicType::VisString64,
        BasicType::VisString129,
        BasicType::VisString255,
        BasicType::Unicode255,
        BasicType::Currency,
        BasicType::PhyComAddr,
        BasicType::ObjRef,
        BasicType::EntryId,
        BasicType::Timestamp,
        BasicType::Quality,
        BasicType::EntryTime,
        BasicType::TrgOps,
        BasicType::OptFlds,
        BasicType::SvOptFlds,
        BasicType::Check,
        BasicType::Tcmd,
        BasicType::Dbpos,
    ];

    /// Resolve a basic type from its standard name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|bt| bt.name() == name)
    }

    /// The standard name of this basic type.
    pub fn name(&self) -> &'static str {
        match self {
            BasicType::Boolean => "BOOLEAN",
            BasicType::Int8 => "INT8",
            BasicType::Int16 => "INT16",
            BasicType::Int32 => "INT32",
            BasicType::Int64 => "INT64",
            BasicType::Int8U => "INT8U",
            BasicType::Int16U => "INT16U",
            BasicType::Int32U => "INT32U",
            BasicType::Float32 => "FLOAT32",
            BasicType::Octet64 => "Octet64",
            BasicType::VisString64 => "VisString64",
            BasicType::VisString129 => "VisString129",
            BasicType::VisString255 => "VisString255",
            BasicType::Unicode255 => "Unicode255",
            BasicType::Currency => "Currency",
            BasicType::PhyComAddr => "PhyComAddr",
            BasicType::ObjRef => "ObjRef",
            BasicType::EntryId => "EntryID",
            BasicType::Timestamp => "Timestamp",
            BasicType::Quality => "Quality",
            BasicType::EntryTime => "EntryTime",
            BasicType::TrgOps => "TrgOps",
            BasicType::OptFlds => "OptFlds",
            BasicType::SvOptFlds => "SvOptFlds",
            BasicType::Check => "Check",
            BasicType::Tcmd => "Tcmd",
            BasicType::Dbpos => "Dbpos",
        }
    }

    /// Whether the engine has a content rule for this type. Types without
    /// one accept every value and surface a `not-implemented` warning.
    pub fn has_content_rule(&self) -> bool {
        !matches!(
            self,
            BasicType::PhyComAddr
                | BasicType::ObjRef
                | BasicType::EntryId
                | BasicType::Timestamp
                | BasicType::Quality
                | BasicType::EntryTime
                | BasicType::TrgOps
                | BasicType::OptFlds
                | BasicType::SvOptFlds
                | BasicType::Check
                | BasicType::Tcmd
                | BasicType::Dbpos
        )
    }
}

impl std::fmt::Display for BasicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for bt in BasicType::ALL {
            assert_eq!(BasicType::from_name(bt.name()), Some(bt));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert_eq!(BasicType::from_name("INT128"), None);
        assert_eq!(BasicType::from_name("boolean"), None);
    }

    #[test]
    fn test_content_rules() {
        assert!(BasicType::Int8U.has_content_rule());
        assert!(BasicType::Currency.has_content_rule());
        assert!(!BasicType::Quality.has_content_rule());
        assert!(!BasicType::Timestamp.has_content_rule());
    }
}

//! Presence conditions for NSD slot declarations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while parsing a `(code, args)` pair from an NSD document.
///
/// These are schema-authoring defects: the registry builder reports them as
/// build-time warnings and falls back to [`PresenceCondition::Optional`]
/// rather than aborting setup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionParseError {
    /// The condition code is not part of the supported set.
    #[error("unknown presence condition code '{code}'")]
    UnknownCode {
        /// The offending code as written in the schema document.
        code: String,
    },

    /// The condition code requires an argument that was not supplied.
    #[error("presence condition '{code}' requires an argument")]
    MissingArgument {
        /// The condition code.
        code: String,
    },

    /// The argument string could not be parsed for this condition code.
    #[error("malformed argument '{args}' for presence condition '{code}'")]
    MalformedArgument {
        /// The condition code.
        code: String,
        /// The raw argument string.
        args: String,
    },
}

/// A parsed presence condition governing one declared slot.
///
/// This is the closed set of condition kinds the engine understands. NSD
/// documents carry these as a string code plus a raw argument string; the
/// pair is parsed once, at schema-build time, via
/// [`PresenceCondition::parse`]. Validation-time dispatch is an exhaustive
/// match over this enum, so an unimplemented kind cannot silently pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PresenceCondition {
    /// `M` - the slot must be present exactly once, as a bare (non-numbered)
    /// occurrence.
    Mandatory,
    /// `O` - no constraint.
    Optional,
    /// `F` - the slot must be absent.
    Forbidden,
    /// `Mmulti` - at least one numbered instance; a bare occurrence is an
    /// error.
    MandatoryMulti,
    /// `Omulti` - any number of numbered instances; a bare occurrence is an
    /// error.
    OptionalMulti,
    /// `AtLeastOne(n)` - across all slots tagged with group `n`, at least
    /// one must be present.
    AtLeastOne(u32),
    /// `AtMostOne` - at most one slot among the marked set may be present.
    /// The grouped variant carries a group id; the ungrouped variant spans
    /// every slot marked `AtMostOne` without a group.
    AtMostOne(Option<u32>),
    /// `AllOrNonePerGroup(n)` - within group `n`, either every marked slot
    /// is present or none are.
    AllOrNonePerGroup(u32),
    /// `AllOnlyOneGroup(n)` - exactly one group (among all groups carrying
    /// this kind) may have all its members present; a partially-present
    /// group is an error in its own right.
    AllOnlyOneGroup(u32),
    /// `AllAtLeastOneGroup(n)` - at least one group must have all its
    /// members present.
    AllAtLeastOneGroup(u32),
    /// `MF` - mandatory if the named sibling is present, forbidden
    /// otherwise.
    MandatoryIfSiblingElseForbidden(String),
    /// `MO` - mandatory if the named sibling is present, otherwise
    /// unconstrained.
    MandatoryIfSiblingElseOptional(String),
    /// `OM` - mandatory if the named sibling is absent.
    OptionalIfSiblingElseMandatory(String),
    /// `FM` - forbidden if the named sibling is present, mandatory if it is
    /// absent.
    ForbiddenIfSiblingElseMandatory(String),
    /// `OF` - may be present only if the named sibling is present.
    OptionalIfSiblingElseForbidden(String),
    /// `MOcond` - mandatory under a textual condition that the engine
    /// cannot evaluate; reported informationally, never as a hard error.
    MandatoryIfTextCondElseOptional(String),
    /// `MFcond` - mandatory/forbidden under a textual condition; reported
    /// informationally.
    MandatoryIfTextCondElseForbidden(String),
    /// `OFcond` - optional/forbidden under a textual condition; reported
    /// informationally.
    OptionalIfTextCondElseForbidden(String),
    /// `MmultiRange(min, max)` - like `Mmulti`, and every instance number
    /// must fall within `[min, max]`.
    MandatoryMultiRange(u32, u32),
    /// `OmultiRange(min, max)` - like `Omulti`, and every instance number
    /// must fall within `[min, max]`.
    OptionalMultiRange(u32, u32),
    /// `MOln0` - mandatory when the containing logical node is LLN0,
    /// otherwise unconstrained.
    MandatoryInLln0ElseOptional,
    /// `MFln0` - mandatory when the containing logical node is LLN0,
    /// forbidden otherwise.
    MandatoryInLln0ElseForbidden,
    /// `MOrootLD` - mandatory when the containing logical device is the
    /// document's root device, otherwise unconstrained.
    MandatoryInRootDeviceElseOptional,
}

impl PresenceCondition {
    /// Parse a condition code plus raw argument string from an NSD document.
    ///
    /// Group and range arguments must be numeric; sibling and textual
    /// conditions take the argument verbatim. Unknown codes and malformed
    /// arguments are reported to the caller, which is expected to degrade
    /// the slot to [`PresenceCondition::Optional`] with a warning.
    pub fn parse(code: &str, args: Option<&str>) -> Result<Self, ConditionParseError> {
        let args = args.map(str::trim).filter(|a| !a.is_empty());

        let group = || -> Result<u32, ConditionParseError> {
            let raw = args.ok_or_else(|| ConditionParseError::MissingArgument {
                code: code.to_string(),
            })?;
            raw.parse().map_err(|_| ConditionParseError::MalformedArgument {
                code: code.to_string(),
                args: raw.to_string(),
            })
        };
        let text = || -> Result<String, ConditionParseError> {
            args.map(str::to_string)
                .ok_or_else(|| ConditionParseError::MissingArgument {
                    code: code.to_string(),
                })
        };
        let range = || -> Result<(u32, u32), ConditionParseError> {
            let raw = args.ok_or_else(|| ConditionParseError::MissingArgument {
                code: code.to_string(),
            })?;
            let malformed = || ConditionParseError::MalformedArgument {
                code: code.to_string(),
                args: raw.to_string(),
            };
            let (lo, hi) = raw
                .split_once("..")
                .or_else(|| raw.split_once(','))
                .ok_or_else(malformed)?;
            let min: u32 = lo.trim().parse().map_err(|_| malformed())?;
            let max: u32 = hi.trim().parse().map_err(|_| malformed())?;
            if min > max {
                return Err(malformed());
            }
            Ok((min, max))
        };

        match code {
            "M" => Ok(Self::Mandatory),
            "O" | "na" => Ok(Self::Optional),
            "F" => Ok(Self::Forbidden),
            "Mmulti" => Ok(Self::MandatoryMulti),
            "Omulti" => Ok(Self::OptionalMulti),
            "AtLeastOne" => Ok(Self::AtLeastOne(group()?)),
            "AtMostOne" => match args {
                Some(_) => Ok(Self::AtMostOne(Some(group()?))),
                None => Ok(Self::AtMostOne(None)),
            },
            "AllOrNonePerGroup" => Ok(Self::AllOrNonePerGroup(group()?)),
            "AllOnlyOneGroup" => Ok(Self::AllOnlyOneGroup(group()?)),
            "AllAtLeastOneGroup" => Ok(Self::AllAtLeastOneGroup(group()?)),
            "MF" => Ok(Self::MandatoryIfSiblingElseForbidden(text()?)),
            "MO" => Ok(Self::MandatoryIfSiblingElseOptional(text()?)),
            "OM" => Ok(Self::OptionalIfSiblingElseMandatory(text()?)),
            "FM" => Ok(Self::ForbiddenIfSiblingElseMandatory(text()?)),
            "OF" => Ok(Self::OptionalIfSiblingElseForbidden(text()?)),
            "MOcond" => Ok(Self::MandatoryIfTextCondElseOptional(text()?)),
            "MFcond" => Ok(Self::MandatoryIfTextCondElseForbidden(text()?)),
            "OFcond" => Ok(Self::OptionalIfTextCondElseForbidden(text()?)),
            "MmultiRange" => {
                let (min, max) = range()?;
                Ok(Self::MandatoryMultiRange(min, max))
            }
            "OmultiRange" => {
                let (min, max) = range()?;
                Ok(Self::OptionalMultiRange(min, max))
            }
            "MOln0" => Ok(Self::MandatoryInLln0ElseOptional),
            "MFln0" => Ok(Self::MandatoryInLln0ElseForbidden),
            "MOrootLD" => Ok(Self::MandatoryInRootDeviceElseOptional),
            _ => {
                tracing::debug!(code, "unknown presence condition code");
                Err(ConditionParseError::UnknownCode {
                    code: code.to_string(),
                })
            }
        }
    }

    /// The canonical condition code, as it appears in NSD documents.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Mandatory => "M",
            Self::Optional => "O",
            Self::Forbidden => "F",
            Self::MandatoryMulti => "Mmulti",
            Self::OptionalMulti => "Omulti",
            Self::AtLeastOne(_) => "AtLeastOne",
            Self::AtMostOne(_) => "AtMostOne",
            Self::AllOrNonePerGroup(_) => "AllOrNonePerGroup",
            Self::AllOnlyOneGroup(_) => "AllOnlyOneGroup",
            Self::AllAtLeastOneGroup(_) => "AllAtLeastOneGroup",
            Self::MandatoryIfSiblingElseForbidden(_) => "MF",
            Self::MandatoryIfSiblingElseOptional(_) => "MO",
            Self::OptionalIfSiblingElseMandatory(_) => "OM",
            Self::ForbiddenIfSiblingElseMandatory(_) => "FM",
            Self::OptionalIfSiblingElseForbidden(_) => "OF",
            Self::MandatoryIfTextCondElseOptional(_) => "MOcond",
            Self::MandatoryIfTextCondElseForbidden(_) => "MFcond",
            Self::OptionalIfTextCondElseForbidden(_) => "OFcond",
            Self::MandatoryMultiRange(_, _) => "MmultiRange",
            Self::OptionalMultiRange(_, _) => "OmultiRange",
            Self::MandatoryInLln0ElseOptional => "MOln0",
            Self::MandatoryInLln0ElseForbidden => "MFln0",
            Self::MandatoryInRootDeviceElseOptional => "MOrootLD",
        }
    }

    /// The sibling slot name this condition refers to, if any.
    pub fn sibling(&self) -> Option<&str> {
        match self {
            Self::MandatoryIfSiblingElseForbidden(s)
            | Self::MandatoryIfSiblingElseOptional(s)
            | Self::OptionalIfSiblingElseMandatory(s)
            | Self::ForbiddenIfSiblingElseMandatory(s)
            | Self::OptionalIfSiblingElseForbidden(s) => Some(s),
            _ => None,
        }
    }

    /// Whether occurrences of this slot must carry an instance number.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Self::MandatoryMulti
                | Self::OptionalMulti
                | Self::MandatoryMultiRange(_, _)
                | Self::OptionalMultiRange(_, _)
        )
    }

    /// Whether evaluating this condition needs ambient document context
    /// (containing logical node / logical device) beyond the local slot map.
    pub fn needs_ambient(&self) -> bool {
        matches!(
            self,
            Self::MandatoryInLln0ElseOptional
                | Self::MandatoryInLln0ElseForbidden
                | Self::MandatoryInRootDeviceElseOptional
        )
    }
}

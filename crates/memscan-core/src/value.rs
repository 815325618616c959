//! Conversion between user-typed values and fixed-width byte patterns.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, FromRepr, IntoStaticStr};

use crate::error::{Error, Result};

/// Marker rendered for byte widths the codec does not know
pub const UNKNOWN_VALUE: &str = "???";

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    FromRepr,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Display,
)]
#[repr(u8)]
pub enum ValueType {
    #[strum(to_string = "byte", serialize = "1")]
    Byte = 0,
    #[strum(to_string = "2bytes", serialize = "2")]
    TwoBytes = 1,
    #[default]
    #[strum(to_string = "4bytes", serialize = "4")]
    FourBytes = 2,
    #[strum(to_string = "8bytes", serialize = "8")]
    EightBytes = 3,
}

impl ValueType {
    /// Resolve the raw selector index used by the shell (0: byte .. 3: 8 bytes)
    pub fn from_index(index: u8) -> Result<Self> {
        Self::from_repr(index).ok_or_else(|| Error::UnknownValueType(index.to_string()))
    }

    pub fn width(&self) -> usize {
        match self {
            Self::Byte => 1,
            Self::TwoBytes => 2,
            Self::FourBytes => 4,
            Self::EightBytes => 8,
        }
    }

    pub fn max_value(&self) -> u64 {
        match self {
            Self::Byte => u8::MAX as u64,
            Self::TwoBytes => u16::MAX as u64,
            Self::FourBytes => u32::MAX as u64,
            Self::EightBytes => u64::MAX,
        }
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Value being searched for during one scan or refine pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetPattern {
    value_type: ValueType,
    value: u64,
    bytes: [u8; 8],
}

impl TargetPattern {
    pub fn new(value_type: ValueType, value: u64) -> Result<Self> {
        if value > value_type.max_value() {
            return Err(Error::ValueOutOfRange {
                text: value.to_string(),
                value_type,
            });
        }
        let mut bytes = [0u8; 8];
        let width = value_type.width();
        let raw = value.to_ne_bytes();
        if cfg!(target_endian = "little") {
            bytes[..width].copy_from_slice(&raw[..width]);
        } else {
            bytes[..width].copy_from_slice(&raw[8 - width..]);
        }
        Ok(Self {
            value_type,
            value,
            bytes,
        })
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn width(&self) -> usize {
        self.value_type.width()
    }

    /// Bytes as they appear in the target's memory
    pub fn bytes(&self) -> &[u8] {
        &self.bytes[..self.width()]
    }

    pub fn matches(&self, window: &[u8]) -> bool {
        window == self.bytes()
    }
}

/// Parse decimal or `0x`-prefixed hexadecimal text into a pattern of `value_type`'s width
pub fn parse_value(text: &str, value_type: ValueType) -> Result<TargetPattern> {
    let trimmed = text.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };

    // from_str_radix tolerates a leading '+', the shell never sends one
    if !digits.chars().next().is_some_and(|c| c.is_digit(radix)) {
        return Err(Error::InvalidValue(text.to_string()));
    }

    let value = u64::from_str_radix(digits, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => Error::ValueOutOfRange {
            text: text.to_string(),
            value_type,
        },
        _ => Error::InvalidValue(text.to_string()),
    })?;

    if value > value_type.max_value() {
        return Err(Error::ValueOutOfRange {
            text: text.to_string(),
            value_type,
        });
    }

    TargetPattern::new(value_type, value)
}

/// Render raw memory bytes as unsigned decimal text
pub fn format_value(bytes: &[u8]) -> String {
    match bytes.len() {
        1 => bytes[0].to_string(),
        2 => u16::from_ne_bytes([bytes[0], bytes[1]]).to_string(),
        4 => u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]).to_string(),
        8 => {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            u64::from_ne_bytes(raw).to_string()
        }
        _ => UNKNOWN_VALUE.to_string(),
    }
}

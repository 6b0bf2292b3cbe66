use super::{deserialize_u32_opt, deserialize_u64_opt, Access, AccessWrapper, WriteConstraint};
use serde::Deserialize;

/// Bit-field properties of a register.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Define the number of elements in an array.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub dim: Option<u32>,
    /// Specify the bit increment between two neighboring array members.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub dim_increment: Option<u64>,
    /// Name string used to identify the field.
    pub name: String,
    /// String describing the details of the field.
    pub description: Option<String>,
    /// The position of the least significant bit of the field within the
    /// register.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub bit_offset: Option<u32>,
    /// The bit-width of the bitfield within the register.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub bit_width: Option<u32>,
    /// The bit position of the least significant bit within the register.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub lsb: Option<u32>,
    /// The bit position of the most significant bit within the register.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub msb: Option<u32>,
    /// The bit range in the `[<msb>:<lsb>]` pattern.
    pub bit_range: Option<String>,
    /// The access type.
    #[serde(default, with = "AccessWrapper")]
    pub access: Option<Access>,
    /// The constraints for writing values to the field.
    pub write_constraint: Option<WriteConstraint>,
}

/// An inclusive range of register bits occupied by a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BitRange {
    /// The position of the least significant bit.
    pub lsb: u32,
    /// The position of the most significant bit.
    pub msb: u32,
}

impl BitRange {
    /// Returns the number of bits in the range.
    pub fn width(&self) -> u32 {
        self.msb - self.lsb + 1
    }
}

impl Field {
    /// Resolves the bit range from whichever of the three SVD spellings the
    /// field defines.
    ///
    /// Returns `None` if no spelling is complete.
    pub fn bit_range(&self) -> Option<BitRange> {
        if let (Some(offset), Some(width)) = (self.bit_offset, self.bit_width) {
            return (width > 0).then(|| BitRange { lsb: offset, msb: offset + width - 1 });
        }
        if let (Some(lsb), Some(msb)) = (self.lsb, self.msb) {
            return (lsb <= msb).then(|| BitRange { lsb, msb });
        }
        if let Some(text) = &self.bit_range {
            let text = text.strip_prefix('[')?.strip_suffix(']')?;
            let (msb, lsb) = text.split_once(':')?;
            let msb = msb.trim().parse().ok()?;
            let lsb = lsb.trim().parse().ok()?;
            return (lsb <= msb).then(|| BitRange { lsb, msb });
        }
        None
    }
}

use super::Access;
use serde::Deserialize;

/// Register attribute defaults inheritable down the description tree.
///
/// Every level of the tree may define a subset of these attributes; the
/// effective value for a node is obtained by [`merging`](Self::merging) its
/// own partial record into the one accumulated from its ancestors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegisterProperties {
    /// Bit-width of a register.
    pub size: Option<u32>,
    /// Access rights.
    pub access: Option<Access>,
    /// Protection rights.
    pub protection: Option<Protection>,
    /// Register value at RESET.
    pub reset_value: Option<u64>,
    /// Register bits that have a defined reset value.
    pub reset_mask: Option<u64>,
}

impl RegisterProperties {
    /// Merges `self` into the defaults inherited from the ancestors.
    ///
    /// Every attribute defined by `self` wins over the inherited one.
    pub fn merging(&self, inherited: &Self) -> Self {
        Self {
            size: self.size.or(inherited.size),
            access: self.access.or(inherited.access),
            protection: self.protection.or(inherited.protection),
            reset_value: self.reset_value.or(inherited.reset_value),
            reset_mask: self.reset_mask.or(inherited.reset_mask),
        }
    }
}

/// Predefined protection rights.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub enum Protection {
    /// Secure permission required for access.
    #[serde(rename = "s")]
    Secure,
    /// Non-secure or secure permission required for access.
    #[serde(rename = "n")]
    NonSecure,
    /// Privileged permission required for access.
    #[serde(rename = "p")]
    Privileged,
}

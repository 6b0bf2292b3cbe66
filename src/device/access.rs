use serde::{de, Deserialize, Deserializer};

const VARIANTS: &[&str] =
    &["read-only", "write-only", "read-write", "writeOnce", "read-writeOnce"];

/// Predefined access rights.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Read access is permitted. Write operations have an undefined result.
    ReadOnly,
    /// Read operations have an undefined result. Write access is permitted.
    WriteOnly,
    /// Read and write accesses are permitted. Writes affect the state of the
    /// register and reads return the register value.
    ReadWrite,
    /// Only the first write access after a reset will have an effect on the
    /// content. Read operations have an undefined result.
    WriteOnce,
    /// Read access is always permitted. Only the first write access after a
    /// reset will have an effect on the content.
    ReadWriteOnce,
}

pub(crate) struct AccessWrapper;

impl AccessWrapper {
    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<Access>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|value| match value.as_str() {
                "read-only" => Ok(Access::ReadOnly),
                "write-only" => Ok(Access::WriteOnly),
                "read-write" => Ok(Access::ReadWrite),
                "writeOnce" => Ok(Access::WriteOnce),
                "read-writeOnce" => Ok(Access::ReadWriteOnce),
                other => Err(de::Error::unknown_variant(other, VARIANTS)),
            })
            .transpose()
    }
}

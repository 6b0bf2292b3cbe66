use thiserror::Error;

/// Errors produced while configuring or running the export.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A selected peripheral does not exist in the device description.
    #[error("unknown peripheral `{name}`, valid peripherals: {}", valid.join(", "))]
    UnknownPeripheral {
        /// The selected name.
        name: String,
        /// All peripheral names present in the description.
        valid: Vec<String>,
    },
    /// A `derivedFrom` reference points at a name that does not exist.
    #[error("`{name}` is derived from `{target}`, which is not defined")]
    DanglingDerivedFrom {
        /// The name of the derived element.
        name: String,
        /// The missing target name.
        target: String,
    },
    /// Address or bit-range arithmetic overflowed 64 bits.
    #[error("address arithmetic overflowed while exporting `{name}`")]
    AddressOverflow {
        /// The name of the element being exported.
        name: String,
    },
}

use super::{
    deserialize_u32_opt, deserialize_u64, deserialize_u64_opt, Access, AccessWrapper, Cluster,
    Protection, Register, RegisterProperties,
};
use serde::Deserialize;

/// Peripheral of the device.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peripheral {
    /// The peripheral name from which to inherit data.
    pub derived_from: Option<String>,
    /// Define the number of elements in an array.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub dim: Option<u32>,
    /// Specify the address increment, in Bytes, between two neighboring array
    /// members in the address map.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub dim_increment: Option<u64>,
    /// The string identifies the peripheral.
    pub name: String,
    /// The string provides an overview of the purpose and functionality of the
    /// peripheral.
    pub description: Option<String>,
    /// Lowest address reserved or used by the peripheral.
    #[serde(deserialize_with = "deserialize_u64", default)]
    pub base_address: u64,
    /// Default bit-width of any register contained in the peripheral.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// Default access rights for all registers in the peripheral.
    #[serde(default, with = "AccessWrapper")]
    pub access: Option<Access>,
    /// Default protection rights for all registers in the peripheral.
    pub protection: Option<Protection>,
    /// Default value for all registers in the peripheral at RESET.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_value: Option<u64>,
    /// Default register bits that have a defined reset value.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_mask: Option<u64>,
    /// The registers of the peripheral. Absent for a derived peripheral that
    /// carries no body of its own.
    pub registers: Option<Registers>,
}

/// The ordered register and cluster lists owned by a peripheral.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registers {
    /// The registers declared directly below the peripheral.
    #[serde(default)]
    pub register: Vec<Register>,
    /// The register clusters declared directly below the peripheral.
    #[serde(default)]
    pub cluster: Vec<Cluster>,
}

impl Peripheral {
    /// Returns a mutable reference to the register with name `name`.
    pub fn reg(&mut self, name: &str) -> &mut Register {
        self.registers
            .as_mut()
            .and_then(|registers| {
                registers.register.iter_mut().find(|register| register.name == name)
            })
            .unwrap()
    }

    /// Adds a new register `register`.
    pub fn add_reg(&mut self, register: Register) {
        self.registers.get_or_insert_with(Registers::default).register.push(register);
    }

    /// Adds a new register initialized by `f`.
    pub fn new_reg(&mut self, f: impl FnOnce(&mut Register)) {
        let mut register = Register::default();
        f(&mut register);
        self.add_reg(register);
    }

    /// Adds a new cluster initialized by `f`.
    pub fn new_cluster(&mut self, f: impl FnOnce(&mut Cluster)) {
        let mut cluster = Cluster::default();
        f(&mut cluster);
        self.registers.get_or_insert_with(Registers::default).cluster.push(cluster);
    }

    /// Returns the partial register properties defined by the peripheral
    /// itself.
    pub fn register_properties(&self) -> RegisterProperties {
        RegisterProperties {
            size: self.size,
            access: self.access,
            protection: self.protection,
            reset_value: self.reset_value,
            reset_mask: self.reset_mask,
        }
    }
}

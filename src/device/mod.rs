mod access;
mod field;
mod peripheral;
mod properties;
mod register;
mod write_constraint;

pub use self::access::Access;
pub(crate) use self::access::AccessWrapper;
pub use self::field::{BitRange, Field};
pub use self::peripheral::{Peripheral, Registers};
pub use self::properties::{Protection, RegisterProperties};
pub use self::register::{Cluster, Register};
pub use self::write_constraint::{WriteConstraint, WriteConstraintRange};

use indexmap::IndexMap;
use serde::{de, Deserialize, Deserializer};
use std::num::ParseIntError;

/// The outermost frame of the description.
#[non_exhaustive]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// The string identifies the device or device series.
    pub name: String,
    /// The string describes the main features of the device.
    pub description: Option<String>,
    /// Default bit-width of any register contained in the device.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// Default access rights for all registers.
    #[serde(default, with = "AccessWrapper")]
    pub access: Option<Access>,
    /// Default protection rights for all registers.
    pub protection: Option<Protection>,
    /// Default value for all registers at RESET.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_value: Option<u64>,
    /// Default register bits that have a defined reset value.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_mask: Option<u64>,
    #[serde(default, with = "PeripheralsWrapper")]
    pub(crate) peripherals: IndexMap<String, Peripheral>,
}

#[derive(Deserialize)]
struct PeripheralsWrapper {
    #[serde(rename = "$value")]
    values: Vec<Peripheral>,
}

impl Device {
    /// Creates a new empty device definition.
    pub fn new(name: String) -> Self {
        Self {
            name,
            description: None,
            size: None,
            access: None,
            protection: None,
            reset_value: None,
            reset_mask: None,
            peripherals: IndexMap::new(),
        }
    }

    /// Returns an iterator over all peripheral names.
    pub fn periph_names(&self) -> impl Iterator<Item = &String> + '_ {
        self.peripherals.keys()
    }

    /// Returns a mutable reference to the peripheral with name `name`.
    pub fn periph(&mut self, name: &str) -> &mut Peripheral {
        self.peripherals.get_mut(name).unwrap()
    }

    /// Inserts a new peripheral `peripheral`.
    pub fn add_periph(&mut self, peripheral: Peripheral) {
        self.peripherals.insert(peripheral.name.clone(), peripheral);
    }

    /// Inserts a new peripheral initialized by `f`.
    pub fn new_periph(&mut self, f: impl FnOnce(&mut Peripheral)) {
        let mut peripheral = Peripheral::default();
        f(&mut peripheral);
        self.add_periph(peripheral);
    }

    /// Removes the peripheral with name `name`.
    pub fn remove_periph(&mut self, name: &str) -> Peripheral {
        self.peripherals.remove(name).unwrap()
    }

    /// Returns the device-level register property defaults.
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

impl PeripheralsWrapper {
    fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<String, Peripheral>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut map = IndexMap::new();
        for peripheral in <Self as Deserialize>::deserialize(deserializer)?.values {
            map.insert(peripheral.name.clone(), peripheral);
        }
        Ok(map)
    }
}

pub(crate) fn deserialize_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    parse_u64(&String::deserialize(deserializer)?).map_err(de::Error::custom)
}

pub(crate) fn deserialize_u64_opt<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map_or(Ok(None), |s| parse_u64(&s).map(Some).map_err(de::Error::custom))
}

pub(crate) fn deserialize_u32_opt<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map_or(Ok(None), |s| parse_u32(&s).map(Some).map_err(de::Error::custom))
}

pub(crate) fn parse_u64(src: &str) -> Result<u64, ParseIntError> {
    let (digits, radix) = split_radix(src);
    u64::from_str_radix(digits, radix)
}

pub(crate) fn parse_u32(src: &str) -> Result<u32, ParseIntError> {
    let (digits, radix) = split_radix(src);
    u32::from_str_radix(digits, radix)
}

fn split_radix(src: &str) -> (&str, u32) {
    if src.starts_with("0x") || src.starts_with("0X") {
        (&src[2..], 16)
    } else if src.starts_with('0') && src.len() > 1 {
        (&src[1..], 8)
    } else {
        (src, 10)
    }
}

use super::{
    deserialize_u32_opt, deserialize_u64, deserialize_u64_opt, Access, AccessWrapper, Field,
    Protection, RegisterProperties,
};
use serde::{Deserialize, Deserializer};

/// A group of registers nested below a peripheral or another cluster.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// The name of the cluster from which to inherit data.
    pub derived_from: Option<String>,
    /// Define the number of elements in an array.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub dim: Option<u32>,
    /// Specify the address increment, in Bytes, between two neighboring array
    /// members in the address map.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub dim_increment: Option<u64>,
    /// String to identify the cluster.
    pub name: String,
    /// String describing the details of the register cluster.
    pub description: Option<String>,
    /// Cluster address relative to the enclosing element.
    #[serde(deserialize_with = "deserialize_u64", default)]
    pub address_offset: u64,
    /// Default bit-width of any register contained in the cluster.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// Default access rights for all registers in the cluster.
    #[serde(default, with = "AccessWrapper")]
    pub access: Option<Access>,
    /// Default protection rights for all registers in the cluster.
    pub protection: Option<Protection>,
    /// Default value for all registers in the cluster at RESET.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_value: Option<u64>,
    /// Default register bits that have a defined reset value.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_mask: Option<u64>,
    /// The registers owned by the cluster, absent for derived clusters.
    pub register: Option<Vec<Register>>,
    /// The clusters nested inside the cluster, absent for derived clusters.
    pub cluster: Option<Vec<Cluster>>,
}

/// The description of a register.
#[non_exhaustive]
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Register {
    /// Define the number of elements in an array.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub dim: Option<u32>,
    /// Specify the address increment, in Bytes, between two neighboring array
    /// members in the address map.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub dim_increment: Option<u64>,
    /// String to identify the register.
    pub name: String,
    /// String describing the details of the register.
    pub description: Option<String>,
    /// The address offset relative to the enclosing element.
    #[serde(deserialize_with = "deserialize_u64", default)]
    pub address_offset: u64,
    /// The bit-width of the register.
    #[serde(default, deserialize_with = "deserialize_u32_opt")]
    pub size: Option<u32>,
    /// The access rights for the register.
    #[serde(default, with = "AccessWrapper")]
    pub access: Option<Access>,
    /// The protection rights for the register.
    pub protection: Option<Protection>,
    /// The default value for the register at RESET.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_value: Option<u64>,
    /// The register bits that have a defined reset value.
    #[serde(default, deserialize_with = "deserialize_u64_opt")]
    pub reset_mask: Option<u64>,
    /// The bit-fields of the register.
    #[serde(default, with = "FieldsWrapper")]
    pub fields: Vec<Field>,
}

#[derive(Deserialize)]
struct FieldsWrapper {
    #[serde(rename = "$value")]
    values: Vec<Field>,
}

impl Cluster {
    /// Returns the partial register properties defined by the cluster itself.
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

impl Register {
    /// Returns a mutable reference to the field with name `name`.
    pub fn field(&mut self, name: &str) -> &mut Field {
        self.fields.iter_mut().find(|field| field.name == name).unwrap()
    }

    /// Adds a new field `field`.
    pub fn add_field(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Adds a new field initialized by `f`.
    pub fn new_field(&mut self, f: impl FnOnce(&mut Field)) {
        let mut field = Field::default();
        f(&mut field);
        self.add_field(field);
    }

    /// Removes the field with name `name`.
    pub fn remove_field(&mut self, name: &str) -> Field {
        let index = self.fields.iter().position(|field| field.name == name).unwrap();
        self.fields.remove(index)
    }

    /// Returns the partial register properties defined by the register itself.
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

impl FieldsWrapper {
    fn deserialize<'de, D>(deserializer: D) -> Result<Vec<Field>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(<Self as Deserialize>::deserialize(deserializer)?.values)
    }
}

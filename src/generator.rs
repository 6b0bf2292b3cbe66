use crate::device::{Access, Cluster, Device, Field, Peripheral, Register, RegisterProperties};
use crate::error::Error;
use crate::ident;
use crate::output::{Indentation, Output, OutputWriter};
use eyre::Result;
use log::warn;
use std::collections::HashSet;

const FILE_HEADER: &str = "// Generated by svd2swift.\n\nimport MMIO\n\n";

/// Swift access level applied uniformly to all generated declarations.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessLevel {
    /// `private` declarations.
    Private,
    /// `fileprivate` declarations.
    Fileprivate,
    /// `internal` declarations.
    Internal,
    /// `package` declarations.
    Package,
    /// `public` declarations.
    Public,
    /// `open` declarations.
    Open,
}

impl AccessLevel {
    fn keyword(self) -> &'static str {
        match self {
            Self::Private => "private",
            Self::Fileprivate => "fileprivate",
            Self::Internal => "internal",
            Self::Package => "package",
            Self::Public => "public",
            Self::Open => "open",
        }
    }
}

/// Swift MMIO interface generator.
pub struct Generator<'a> {
    indentation: Indentation,
    access_level: Option<AccessLevel>,
    select_peripherals: Vec<&'a str>,
    namespace_under_device: bool,
    instance_member_peripherals: bool,
    device_name: Option<&'a str>,
}

impl Default for Generator<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Generator<'a> {
    /// Creates a blank new set of options ready for configuration.
    pub fn new() -> Self {
        Self {
            indentation: Indentation::default(),
            access_level: None,
            select_peripherals: Vec::new(),
            namespace_under_device: false,
            instance_member_peripherals: false,
            device_name: None,
        }
    }

    /// Sets the indentation style of the generated interfaces.
    pub fn indentation(&mut self, indentation: Indentation) -> &mut Self {
        self.indentation = indentation;
        self
    }

    /// Sets the access level prefixed to every generated declaration.
    pub fn access_level(&mut self, access_level: AccessLevel) -> &mut Self {
        self.access_level = Some(access_level);
        self
    }

    /// Extends the list of peripherals to export. When the list is empty, all
    /// peripherals are exported.
    pub fn select_peripherals(&mut self, select_peripherals: &[&'a str]) -> &mut Self {
        self.select_peripherals.extend(select_peripherals);
        self
    }

    /// Namespaces the peripheral accessors under a device-level type.
    pub fn namespace_under_device(&mut self, namespace_under_device: bool) -> &mut Self {
        self.namespace_under_device = namespace_under_device;
        self
    }

    /// Generates peripheral accessors as instance members of the device type
    /// instead of static members.
    pub fn instance_member_peripherals(&mut self, instance_member_peripherals: bool) -> &mut Self {
        self.instance_member_peripherals = instance_member_peripherals;
        self
    }

    /// Overrides the device name used for the device-level type.
    pub fn device_name(&mut self, device_name: &'a str) -> &mut Self {
        self.device_name = Some(device_name);
        self
    }

    /// Generates the Swift interfaces for `device` into `output`.
    ///
    /// One compilation unit is produced for the device and one per exported
    /// peripheral.
    pub fn generate(&self, device: &Device, output: &mut dyn Output) -> Result<()> {
        validate_derived_from(device)?;
        let selected = self.select(device)?;
        let inherited = device.register_properties();
        let mut exportable = Vec::new();
        for peripheral in selected {
            let properties = peripheral.register_properties().merging(&inherited);
            let instance_name = ident::sanitize(&peripheral.name).to_lowercase();
            if let Some(expansion) = expand_dim(
                &instance_name,
                peripheral.dim,
                peripheral.dim_increment,
                properties.size.map(u64::from),
            ) {
                exportable.push((peripheral, expansion));
            }
        }
        let mut writer = OutputWriter::new(output, self.indentation);
        self.export_device_unit(device, &exportable, &mut writer)?;
        for (peripheral, _) in &exportable {
            self.export_peripheral_unit(device, peripheral, &mut writer)?;
        }
        Ok(())
    }

    fn select<'d>(&self, device: &'d Device) -> Result<Vec<&'d Peripheral>> {
        let mut selected = if self.select_peripherals.is_empty() {
            device.peripherals.values().collect::<Vec<_>>()
        } else {
            let mut selected = Vec::with_capacity(self.select_peripherals.len());
            for &name in &self.select_peripherals {
                let peripheral =
                    device.peripherals.get(name).ok_or_else(|| Error::UnknownPeripheral {
                        name: name.to_string(),
                        valid: {
                            let mut valid =
                                device.periph_names().cloned().collect::<Vec<_>>();
                            valid.sort();
                            valid
                        },
                    })?;
                selected.push(peripheral);
            }
            selected
        };
        selected.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(selected)
    }

    fn access_prefix(&self) -> String {
        match self.access_level {
            Some(access_level) => format!("{} ", access_level.keyword()),
            None => String::new(),
        }
    }

    fn device_type_name(&self, device: &Device) -> String {
        ident::sanitize(self.device_name.unwrap_or(&device.name))
    }

    fn export_device_unit(
        &self,
        device: &Device,
        exportable: &[(&Peripheral, (u32, u64))],
        writer: &mut OutputWriter<'_>,
    ) -> Result<()> {
        writer.append(FILE_HEADER);
        if self.namespace_under_device {
            append_comment(writer, device.description.as_deref());
            let declaration = if self.instance_member_peripherals { "struct" } else { "enum" };
            writer.append(&format!(
                "{}{declaration} {} {{\n",
                self.access_prefix(),
                self.device_type_name(device)
            ));
            writer.indent();
        }
        let mut emitted_any = false;
        for (peripheral, expansion) in exportable {
            if self.export_peripheral_accessor(peripheral, *expansion, writer, emitted_any)? {
                emitted_any = true;
            }
        }
        if self.namespace_under_device {
            writer.outdent();
            writer.append("}\n");
        }
        writer.flush("Device.swift")
    }

    fn export_peripheral_unit(
        &self,
        device: &Device,
        peripheral: &Peripheral,
        writer: &mut OutputWriter<'_>,
    ) -> Result<()> {
        writer.append(FILE_HEADER);
        let mut parent_types = Vec::new();
        if self.namespace_under_device {
            parent_types.push(self.device_type_name(device));
        }
        let mut queue: Vec<(Vec<Node<'_>>, Vec<String>, RegisterProperties)> =
            vec![(vec![Node::Peripheral(peripheral)], parent_types, device.register_properties())];
        // The queue advances by index cursor instead of popping the front,
        // keeping dequeue amortized O(1).
        let mut cursor = 0;
        while cursor < queue.len() {
            let (elements, parent_types, inherited) = queue[cursor].clone();
            if cursor != 0 {
                writer.append("\n");
            }
            if !parent_types.is_empty() {
                writer.append(&format!("extension {} {{\n", parent_types.join(".")));
                writer.indent();
            }
            for (index, element) in elements.iter().enumerate() {
                let (children, properties) = self.export_type(*element, writer, &inherited)?;
                if !children.is_empty() {
                    let mut child_types = parent_types.clone();
                    child_types.push(element.type_name());
                    queue.push((children, child_types, properties));
                }
                if index + 1 < elements.len() {
                    writer.append("\n");
                }
            }
            if !parent_types.is_empty() {
                writer.outdent();
                writer.append("}\n");
            }
            cursor += 1;
        }
        writer.flush(&format!("{}.swift", ident::sanitize(&peripheral.name)))
    }

    fn export_type<'d>(
        &self,
        node: Node<'d>,
        writer: &mut OutputWriter<'_>,
        inherited: &RegisterProperties,
    ) -> Result<(Vec<Node<'d>>, RegisterProperties)> {
        match node {
            Node::Peripheral(peripheral) => {
                let properties = peripheral.register_properties().merging(inherited);
                let children = if let Some(derived_from) = &peripheral.derived_from {
                    self.export_alias(&node.type_name(), derived_from, writer);
                    Vec::new()
                } else {
                    let registers = peripheral.registers.as_ref();
                    self.export_block_type(
                        &node.type_name(),
                        peripheral.description.as_deref(),
                        registers.map_or(&[], |registers| registers.register.as_slice()),
                        registers.map_or(&[], |registers| registers.cluster.as_slice()),
                        writer,
                        &properties,
                    )?
                };
                Ok((children, properties))
            }
            Node::Cluster(cluster) => {
                let properties = cluster.register_properties().merging(inherited);
                let children = if let Some(derived_from) = &cluster.derived_from {
                    self.export_alias(&node.type_name(), derived_from, writer);
                    Vec::new()
                } else {
                    self.export_block_type(
                        &node.type_name(),
                        cluster.description.as_deref(),
                        cluster.register.as_deref().unwrap_or(&[]),
                        cluster.cluster.as_deref().unwrap_or(&[]),
                        writer,
                        &properties,
                    )?
                };
                Ok((children, properties))
            }
            Node::Register(register) => {
                let properties = register.register_properties().merging(inherited);
                self.export_register_type(register, writer, &properties)?;
                Ok((Vec::new(), properties))
            }
        }
    }

    fn export_alias(&self, type_name: &str, derived_from: &str, writer: &mut OutputWriter<'_>) {
        writer.append(&format!(
            "{}typealias {type_name} = {}\n",
            self.access_prefix(),
            ident::sanitize(derived_from)
        ));
    }

    fn export_block_type<'d>(
        &self,
        type_name: &str,
        description: Option<&str>,
        registers: &'d [Register],
        clusters: &'d [Cluster],
        writer: &mut OutputWriter<'_>,
        properties: &RegisterProperties,
    ) -> Result<Vec<Node<'d>>> {
        let mut children = Vec::new();
        append_comment(writer, description);
        writer.append("@RegisterBlock\n");
        writer.append(&format!("{}struct {type_name} {{\n", self.access_prefix()));
        writer.indent();
        let mut emitted_any = false;
        for register in registers {
            if self.export_register_accessor(register, writer, properties, emitted_any)? {
                children.push(Node::Register(register));
                emitted_any = true;
            }
        }
        for cluster in clusters {
            if self.export_cluster_accessor(cluster, writer, properties, emitted_any)? {
                children.push(Node::Cluster(cluster));
                emitted_any = true;
            }
        }
        writer.outdent();
        writer.append("}\n");
        Ok(children)
    }

    fn export_peripheral_accessor(
        &self,
        peripheral: &Peripheral,
        (count, stride): (u32, u64),
        writer: &mut OutputWriter<'_>,
        separate: bool,
    ) -> Result<bool> {
        let type_name = ident::sanitize(&peripheral.name);
        let instance_name = type_name.to_lowercase();
        let modifier = if self.namespace_under_device && !self.instance_member_peripherals {
            "static "
        } else {
            ""
        };
        let mut emitted_any = false;
        for index in 0..count {
            let address =
                checked_address(&peripheral.name, peripheral.base_address, index.into(), stride)?;
            let instance_name = if peripheral.dim.is_some() {
                format!("{instance_name}{index}")
            } else {
                instance_name.clone()
            };
            if separate || emitted_any {
                writer.append("\n");
            }
            append_comment(writer, peripheral.description.as_deref());
            writer.append(&format!(
                "{}{modifier}let {} = {type_name}(unsafeAddress: {address:#x})\n",
                self.access_prefix(),
                ident::escape(&instance_name)
            ));
            emitted_any = true;
        }
        Ok(emitted_any)
    }

    fn export_cluster_accessor(
        &self,
        cluster: &Cluster,
        writer: &mut OutputWriter<'_>,
        inherited: &RegisterProperties,
        separate: bool,
    ) -> Result<bool> {
        let type_name = ident::sanitize(&cluster.name);
        let instance_name = type_name.to_lowercase();
        let properties = cluster.register_properties().merging(inherited);
        let Some((count, stride)) = expand_dim(
            &instance_name,
            cluster.dim,
            cluster.dim_increment,
            properties.size.map(u64::from),
        ) else {
            return Ok(false);
        };
        let mut emitted_any = false;
        for index in 0..count {
            let offset =
                checked_address(&cluster.name, cluster.address_offset, index.into(), stride)?;
            let instance_name = if cluster.dim.is_some() {
                format!("{instance_name}{index}")
            } else {
                instance_name.clone()
            };
            if separate || emitted_any {
                writer.append("\n");
            }
            append_comment(writer, cluster.description.as_deref());
            writer.append(&format!("@RegisterBlock(offset: {offset:#x})\n"));
            writer.append(&format!(
                "{}var {}: {type_name}\n",
                self.access_prefix(),
                ident::escape(&instance_name)
            ));
            emitted_any = true;
        }
        Ok(emitted_any)
    }

    fn export_register_accessor(
        &self,
        register: &Register,
        writer: &mut OutputWriter<'_>,
        inherited: &RegisterProperties,
        separate: bool,
    ) -> Result<bool> {
        let type_name = ident::sanitize(&register.name);
        let instance_name = type_name.to_lowercase();
        let properties = register.register_properties().merging(inherited);
        if register.dim.is_some() {
            let Some((count, stride)) = expand_dim(
                &instance_name,
                register.dim,
                register.dim_increment,
                properties.size.map(u64::from),
            ) else {
                return Ok(false);
            };
            if separate {
                writer.append("\n");
            }
            append_comment(writer, register.description.as_deref());
            writer.append(&format!(
                "@RegisterBlock(offset: {:#x}, stride: {stride:#x}, count: {count})\n",
                register.address_offset
            ));
            writer.append(&format!(
                "{}var {}: RegisterArray<{type_name}>\n",
                self.access_prefix(),
                ident::escape(&instance_name)
            ));
        } else {
            if separate {
                writer.append("\n");
            }
            append_comment(writer, register.description.as_deref());
            writer.append(&format!("@RegisterBlock(offset: {:#x})\n", register.address_offset));
            writer.append(&format!(
                "{}var {}: Register<{type_name}>\n",
                self.access_prefix(),
                ident::escape(&instance_name)
            ));
        }
        Ok(true)
    }

    fn export_register_type(
        &self,
        register: &Register,
        writer: &mut OutputWriter<'_>,
        properties: &RegisterProperties,
    ) -> Result<()> {
        let type_name = ident::sanitize(&register.name);
        let Some(size) = properties.size else {
            warn!("skipped exporting {type_name}: unknown register size");
            return Ok(());
        };
        append_comment(writer, register.description.as_deref());
        writer.append(&format!("@Register(bitWidth: {size})\n"));
        writer.append(&format!("{}struct {type_name} {{\n", self.access_prefix()));
        writer.indent();
        let mut emitted_any = false;
        for field in &register.fields {
            if self.export_field_accessor(field, &type_name, writer, properties, emitted_any)? {
                emitted_any = true;
            }
        }
        writer.outdent();
        writer.append("}\n");
        Ok(())
    }

    fn export_field_accessor(
        &self,
        field: &Field,
        register_type_name: &str,
        writer: &mut OutputWriter<'_>,
        properties: &RegisterProperties,
        separate: bool,
    ) -> Result<bool> {
        let type_name = ident::field_type_name(&field.name, register_type_name);
        let instance_name = type_name.to_lowercase();
        let Some(range) = field.bit_range() else {
            warn!("skipped exporting {instance_name}: missing bit range");
            return Ok(false);
        };
        let attribute = match field.access.or(properties.access) {
            Some(Access::ReadOnly) => "ReadOnly",
            Some(Access::WriteOnly | Access::WriteOnce) => "WriteOnly",
            Some(Access::ReadWrite | Access::ReadWriteOnce) => "ReadWrite",
            None => "Reserved",
        };
        let Some((count, stride)) = expand_dim(
            &instance_name,
            field.dim,
            field.dim_increment,
            Some(u64::from(range.width())),
        ) else {
            return Ok(false);
        };
        let mut emitted_any = false;
        for index in 0..count {
            let low = checked_address(&field.name, u64::from(range.lsb), index.into(), stride)?;
            let high =
                checked_address(&field.name, u64::from(range.msb) + 1, index.into(), stride)?;
            if separate || emitted_any {
                writer.append("\n");
            }
            append_comment(writer, field.description.as_deref());
            writer.append(&format!("@{attribute}(bits: {low}..<{high})\n"));
            if field.dim.is_some() {
                writer.append(&format!(
                    "{}var {}: {type_name}{index}\n",
                    self.access_prefix(),
                    ident::escape(&format!("{instance_name}{index}"))
                ));
            } else {
                writer.append(&format!(
                    "{}var {}: {type_name}\n",
                    self.access_prefix(),
                    ident::escape(&instance_name)
                ));
            }
            emitted_any = true;
        }
        Ok(emitted_any)
    }
}

/// One exportable level of the description tree.
#[derive(Clone, Copy)]
enum Node<'a> {
    Peripheral(&'a Peripheral),
    Cluster(&'a Cluster),
    Register(&'a Register),
}

impl Node<'_> {
    fn type_name(&self) -> String {
        match self {
            Node::Peripheral(peripheral) => ident::sanitize(&peripheral.name),
            Node::Cluster(cluster) => ident::sanitize(&cluster.name),
            Node::Register(register) => ident::sanitize(&register.name),
        }
    }
}

/// Resolves the replica count and stride of a possibly dimensioned element.
///
/// Returns `None` when the element is dimensioned but no stride can be
/// determined; the caller skips the element after the diagnostic. A zero
/// count produces zero replicas without a diagnostic.
fn expand_dim(
    instance_name: &str,
    dim: Option<u32>,
    dim_increment: Option<u64>,
    default_stride: Option<u64>,
) -> Option<(u32, u64)> {
    match dim {
        None => Some((1, 0)),
        Some(0) => Some((0, dim_increment.or(default_stride).unwrap_or(0))),
        Some(count) => match dim_increment.or(default_stride) {
            Some(stride) => Some((count, stride)),
            None => {
                warn!("skipped exporting {instance_name}: unknown stride");
                None
            }
        },
    }
}

fn checked_address(name: &str, base: u64, index: u64, stride: u64) -> Result<u64, Error> {
    index
        .checked_mul(stride)
        .and_then(|offset| base.checked_add(offset))
        .ok_or_else(|| Error::AddressOverflow { name: name.to_string() })
}

fn validate_derived_from(device: &Device) -> Result<(), Error> {
    for peripheral in device.peripherals.values() {
        if let Some(target) = &peripheral.derived_from {
            if !device.peripherals.contains_key(target) {
                return Err(Error::DanglingDerivedFrom {
                    name: peripheral.name.clone(),
                    target: target.clone(),
                });
            }
        }
        if let Some(registers) = &peripheral.registers {
            let mut names = HashSet::new();
            collect_cluster_names(&registers.cluster, &mut names);
            check_cluster_targets(&registers.cluster, &names)?;
        }
    }
    Ok(())
}

fn collect_cluster_names<'a>(clusters: &'a [Cluster], names: &mut HashSet<&'a str>) {
    for cluster in clusters {
        names.insert(cluster.name.as_str());
        if let Some(children) = &cluster.cluster {
            collect_cluster_names(children, names);
        }
    }
}

fn check_cluster_targets(clusters: &[Cluster], names: &HashSet<&str>) -> Result<(), Error> {
    for cluster in clusters {
        if let Some(target) = &cluster.derived_from {
            if !names.contains(target.as_str()) {
                return Err(Error::DanglingDerivedFrom {
                    name: cluster.name.clone(),
                    target: target.clone(),
                });
            }
        }
        if let Some(children) = &cluster.cluster {
            check_cluster_targets(children, names)?;
        }
    }
    Ok(())
}

fn append_comment(writer: &mut OutputWriter<'_>, description: Option<&str>) {
    if let Some(description) = description {
        for line in description.lines() {
            let line = line.trim();
            if !line.is_empty() {
                writer.append(&format!("/// {line}\n"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_elements_expand_to_one_replica() {
        assert_eq!(expand_dim("x", None, None, None), Some((1, 0)));
    }

    #[test]
    fn explicit_stride_wins_over_default() {
        assert_eq!(expand_dim("x", Some(4), Some(0x10), Some(0x20)), Some((4, 0x10)));
    }

    #[test]
    fn missing_stride_falls_back_to_default() {
        assert_eq!(expand_dim("x", Some(2), None, Some(0x20)), Some((2, 0x20)));
    }

    #[test]
    fn undeterminable_stride_skips_the_element() {
        assert_eq!(expand_dim("x", Some(2), None, None), None);
    }

    #[test]
    fn zero_count_expands_to_zero_replicas() {
        assert_eq!(expand_dim("x", Some(0), None, None), Some((0, 0)));
    }

    #[test]
    fn address_arithmetic_overflow_is_an_error() {
        assert!(checked_address("x", u64::MAX, 1, 1).is_err());
        assert!(checked_address("x", 0, 2, u64::MAX).is_err());
        assert_eq!(checked_address("x", 0x1000, 3, 0x10).unwrap(), 0x1030);
    }

    #[test]
    fn dangling_peripheral_reference_is_rejected() {
        let mut device = Device::new("TEST".to_string());
        device.new_periph(|peripheral| {
            peripheral.name = "UART2".to_string();
            peripheral.derived_from = Some("UART1".to_string());
        });
        let err = validate_derived_from(&device).unwrap_err();
        match err {
            Error::DanglingDerivedFrom { name, target } => {
                assert_eq!(name, "UART2");
                assert_eq!(target, "UART1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn dangling_cluster_reference_is_rejected() {
        let mut device = Device::new("TEST".to_string());
        device.new_periph(|peripheral| {
            peripheral.name = "DMA".to_string();
            peripheral.new_cluster(|cluster| {
                cluster.name = "CH1".to_string();
                cluster.derived_from = Some("CH0".to_string());
            });
        });
        assert!(validate_derived_from(&device).is_err());
    }
}

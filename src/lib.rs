//! Compiles CMSIS-SVD register-map descriptions into Swift MMIO interfaces.
//!
//! The crate parses the code-generating subtree of an SVD document (device,
//! peripherals, clusters, registers, fields and their inheritable register
//! properties) and exports one Swift compilation unit for the device plus
//! one per peripheral, built on the
//! [Swift MMIO](https://github.com/apple/swift-mmio) register macros.
//!
//! # Usage
//!
//! Place the following to the Cargo.toml:
//!
//! ```toml
//! [dependencies]
//! svd2swift = { version = "0.1.0" }
//! ```
//!
//! Then parse a description and generate interfaces:
//!
//! ```no_run
//! use svd2swift::{Generator, InMemoryOutput};
//!
//! # fn main() -> eyre::Result<()> {
//! let device = svd2swift::parse("STM32F103.svd")?;
//! let mut output = InMemoryOutput::new();
//! Generator::new().select_peripherals(&["GPIOA", "GPIOB"]).generate(&device, &mut output)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

mod device;
mod error;
mod generator;
mod ident;
mod output;

pub use crate::device::{
    Access, BitRange, Cluster, Device, Field, Peripheral, Protection, Register, RegisterProperties,
    Registers, WriteConstraint, WriteConstraintRange,
};
pub use crate::error::Error;
pub use crate::generator::{AccessLevel, Generator};
pub use crate::output::{InMemoryOutput, Indentation, Output};

use eyre::{Result, WrapErr};
use std::fs::File;
use std::io::{prelude::*, BufReader};
use std::path::Path;

/// Parses the SVD file at `path`.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Device> {
    let path = path.as_ref();
    let mut input = BufReader::new(
        File::open(path).wrap_err_with(|| format!("failed to open {}", path.display()))?,
    );
    let mut xml = String::new();
    input.read_to_string(&mut xml)?;
    parse_str(&xml)
}

/// Parses an SVD document from `xml`.
pub fn parse_str(xml: &str) -> Result<Device> {
    quick_xml::de::from_str(xml).wrap_err("failed to decode SVD document")
}

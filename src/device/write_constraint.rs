use super::deserialize_u64;
use serde::{de, Deserialize, Deserializer};

/// Constraints for writing values to a field.
///
/// The three options are mutually exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteConstraint {
    /// If `true`, only the last read value can be written.
    WriteAsRead(bool),
    /// If `true`, only the values listed in the enumerated values can be
    /// written.
    UseEnumeratedValues(bool),
    /// Only values inside the range can be written.
    Range(WriteConstraintRange),
}

/// The value range of a [`WriteConstraint::Range`] constraint.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WriteConstraintRange {
    /// The smallest number that can be written to the field.
    #[serde(deserialize_with = "deserialize_u64")]
    pub minimum: u64,
    /// The largest number that can be written to the field.
    #[serde(deserialize_with = "deserialize_u64")]
    pub maximum: u64,
}

impl<'de> Deserialize<'de> for WriteConstraint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Shape {
            write_as_read: Option<bool>,
            use_enumerated_values: Option<bool>,
            range: Option<WriteConstraintRange>,
        }
        let shape = Shape::deserialize(deserializer)?;
        if let Some(value) = shape.write_as_read {
            Ok(Self::WriteAsRead(value))
        } else if let Some(value) = shape.use_enumerated_values {
            Ok(Self::UseEnumeratedValues(value))
        } else if let Some(range) = shape.range {
            Ok(Self::Range(range))
        } else {
            Err(de::Error::custom(
                "`writeConstraint` must contain one of `writeAsRead`, `useEnumeratedValues`, or \
                 `range`",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(xml: &str) -> Result<WriteConstraint, quick_xml::DeError> {
        quick_xml::de::from_str(xml)
    }

    #[test]
    fn decodes_write_as_read() {
        let constraint = decode("<writeConstraint><writeAsRead>true</writeAsRead></writeConstraint>");
        assert_eq!(constraint.unwrap(), WriteConstraint::WriteAsRead(true));
    }

    #[test]
    fn decodes_use_enumerated_values() {
        let constraint = decode(
            "<writeConstraint><useEnumeratedValues>false</useEnumeratedValues></writeConstraint>",
        );
        assert_eq!(constraint.unwrap(), WriteConstraint::UseEnumeratedValues(false));
    }

    #[test]
    fn decodes_range() {
        let constraint = decode(
            "<writeConstraint><range><minimum>2</minimum><maximum>0x10</maximum></range>\
             </writeConstraint>",
        );
        assert_eq!(
            constraint.unwrap(),
            WriteConstraint::Range(WriteConstraintRange { minimum: 2, maximum: 0x10 })
        );
    }

    #[test]
    fn rejects_empty_constraint() {
        assert!(decode("<writeConstraint></writeConstraint>").is_err());
    }
}

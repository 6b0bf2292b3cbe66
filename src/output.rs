use eyre::Result;
use indexmap::IndexMap;

/// The sink consuming generated compilation units.
///
/// The generator produces each unit as one complete string; where the units
/// end up (files, memory, a build-system pipe) is the caller's business.
pub trait Output {
    /// Receives the complete contents of the compilation unit `name`.
    fn write_unit(&mut self, name: &str, contents: &str) -> Result<()>;
}

/// An [`Output`] collecting compilation units in memory.
#[derive(Debug, Default)]
pub struct InMemoryOutput {
    /// The written units, keyed by unit name in emission order.
    pub units: IndexMap<String, String>,
}

impl InMemoryOutput {
    /// Creates a new empty sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Output for InMemoryOutput {
    fn write_unit(&mut self, name: &str, contents: &str) -> Result<()> {
        self.units.insert(name.to_string(), contents.to_string());
        Ok(())
    }
}

/// The whitespace emitted per nesting level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Indentation {
    /// One tab character per level.
    Tab,
    /// The given number of spaces per level.
    Spaces(u8),
}

impl Default for Indentation {
    fn default() -> Self {
        Self::Spaces(4)
    }
}

/// Accumulates declaration text for one compilation unit at a time.
///
/// Indentation is a stack depth applied at the start of every non-blank
/// line; it must be balanced before a unit is flushed.
pub(crate) struct OutputWriter<'a> {
    output: &'a mut dyn Output,
    indentation: Indentation,
    depth: usize,
    buffer: String,
    at_line_start: bool,
}

impl<'a> OutputWriter<'a> {
    pub(crate) fn new(output: &'a mut dyn Output, indentation: Indentation) -> Self {
        Self { output, indentation, depth: 0, buffer: String::new(), at_line_start: true }
    }

    pub(crate) fn append(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            if self.at_line_start && piece != "\n" {
                for _ in 0..self.depth {
                    match self.indentation {
                        Indentation::Tab => self.buffer.push('\t'),
                        Indentation::Spaces(count) => {
                            for _ in 0..count {
                                self.buffer.push(' ');
                            }
                        }
                    }
                }
            }
            self.buffer.push_str(piece);
            self.at_line_start = piece.ends_with('\n');
        }
    }

    pub(crate) fn indent(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn outdent(&mut self) {
        debug_assert!(self.depth > 0, "unbalanced outdent");
        self.depth -= 1;
    }

    pub(crate) fn flush(&mut self, unit: &str) -> Result<()> {
        debug_assert_eq!(self.depth, 0, "unbalanced indentation at flush");
        self.output.write_unit(unit, &self.buffer)?;
        self.buffer.clear();
        self.at_line_start = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indents_line_starts_only() {
        let mut output = InMemoryOutput::new();
        let mut writer = OutputWriter::new(&mut output, Indentation::Spaces(2));
        writer.append("struct A {\n");
        writer.indent();
        writer.append("var x: ");
        writer.append("X\n");
        writer.outdent();
        writer.append("}\n");
        writer.flush("A.swift").unwrap();
        assert_eq!(output.units["A.swift"], "struct A {\n  var x: X\n}\n");
    }

    #[test]
    fn blank_lines_carry_no_indentation() {
        let mut output = InMemoryOutput::new();
        let mut writer = OutputWriter::new(&mut output, Indentation::Spaces(4));
        writer.indent();
        writer.append("a\n\nb\n");
        writer.outdent();
        writer.flush("unit").unwrap();
        assert_eq!(output.units["unit"], "    a\n\n    b\n");
    }

    #[test]
    fn tabs_and_flush_reset() {
        let mut output = InMemoryOutput::new();
        let mut writer = OutputWriter::new(&mut output, Indentation::Tab);
        writer.indent();
        writer.append("x\n");
        writer.outdent();
        writer.flush("one").unwrap();
        writer.append("y\n");
        writer.flush("two").unwrap();
        assert_eq!(output.units["one"], "\tx\n");
        assert_eq!(output.units["two"], "y\n");
    }
}

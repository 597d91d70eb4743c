//! Units of information flowing from one endpoint toward the other.

use std::fmt;

/// A monitored input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlLine {
    Cts,
    Dsr,
}

impl ControlLine {
    /// The output line that mirrors this input on the opposite port.
    pub fn mirrored(self) -> OutputLine {
        match self {
            Self::Cts => OutputLine::Rts,
            Self::Dsr => OutputLine::Dtr,
        }
    }
}

impl fmt::Display for ControlLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cts => f.write_str("CTS"),
            Self::Dsr => f.write_str("DSR"),
        }
    }
}

/// A driven output line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLine {
    Rts,
    Dtr,
}

impl fmt::Display for OutputLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rts => f.write_str("RTS"),
            Self::Dtr => f.write_str("DTR"),
        }
    }
}

/// An event observed on one port, to be applied to the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortEvent {
    /// An input line changed to `asserted`.
    Control { line: ControlLine, asserted: bool },
    /// Bytes returned by a single read, never empty.
    Data(Vec<u8>),
}

impl PortEvent {
    pub fn control(line: ControlLine, asserted: bool) -> Self {
        Self::Control { line, asserted }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_lines_mirror_to_outputs() {
        assert_eq!(ControlLine::Cts.mirrored(), OutputLine::Rts);
        assert_eq!(ControlLine::Dsr.mirrored(), OutputLine::Dtr);
    }

    #[test]
    fn test_line_names() {
        assert_eq!(ControlLine::Cts.to_string(), "CTS");
        assert_eq!(OutputLine::Dtr.to_string(), "DTR");
    }
}

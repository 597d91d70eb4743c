//! The two sides of the bridge.

use crate::port::PortHandle;
use std::fmt;
use std::sync::Arc;

/// Which side of the bridge an endpoint sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
        }
    }
}

/// One opened port together with the names used when logging about it.
#[derive(Debug)]
pub struct Endpoint {
    port: Arc<dyn PortHandle>,
    label: String,
    /// Forwarding direction of traffic applied *to* this endpoint.
    direction: String,
}

impl Endpoint {
    /// Build both endpoints of a bridge from their ports and labels.
    pub fn pair(
        left: Arc<dyn PortHandle>,
        left_label: &str,
        right: Arc<dyn PortHandle>,
        right_label: &str,
    ) -> (Self, Self) {
        let left_endpoint = Self {
            port: left,
            label: left_label.to_string(),
            direction: format!("{left_label} <- {right_label}"),
        };
        let right_endpoint = Self {
            port: right,
            label: right_label.to_string(),
            direction: format!("{left_label} -> {right_label}"),
        };
        (left_endpoint, right_endpoint)
    }

    pub fn port(&self) -> &dyn PortHandle {
        self.port.as_ref()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn direction(&self) -> &str {
        &self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;

    #[test]
    fn test_pair_directions_point_at_destination() {
        let (left, right) = Endpoint::pair(
            Arc::new(MockSerialPort::new("A")),
            "PLC",
            Arc::new(MockSerialPort::new("B")),
            "HMI",
        );

        assert_eq!(left.label(), "PLC");
        assert_eq!(left.direction(), "PLC <- HMI");
        assert_eq!(right.label(), "HMI");
        assert_eq!(right.direction(), "PLC -> HMI");
        assert_eq!(right.port().name(), "B");
    }

    #[test]
    fn test_opposite_side() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite(), Side::Left);
    }
}

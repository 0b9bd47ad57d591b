//! Gate nodes and their boolean operations.

use std::fmt;
use std::str::FromStr;

use crate::error::SparkError;

/// A gate's boolean operation.
///
/// `Buffer` doubles as a user-settable input (its raw value passes through
/// when slot 0 is unconnected); `Light` is a sink-only probe reporting the
/// boolean on its single input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    And,
    Or,
    Not,
    Nand,
    Nor,
    Xor,
    Xnor,
    Buffer,
    Light,
}

impl Operation {
    /// Uppercase tag used by the placement layer and in logs.
    pub fn tag(&self) -> &'static str {
        match self {
            Operation::And => "AND",
            Operation::Or => "OR",
            Operation::Not => "NOT",
            Operation::Nand => "NAND",
            Operation::Nor => "NOR",
            Operation::Xor => "XOR",
            Operation::Xnor => "XNOR",
            Operation::Buffer => "BUFFER",
            Operation::Light => "LIGHT",
        }
    }

    /// Apply the truth function to resolved input values.
    ///
    /// `Xor` is true for an odd number of true inputs, `Xnor` for an even
    /// number. Single-input operations read the first value and treat a
    /// missing one as false.
    pub fn apply(&self, inputs: &[bool]) -> bool {
        let first = inputs.first().copied().unwrap_or(false);
        match self {
            Operation::And => inputs.iter().all(|v| *v),
            Operation::Or => inputs.iter().any(|v| *v),
            Operation::Not => !first,
            Operation::Nand => !inputs.iter().all(|v| *v),
            Operation::Nor => !inputs.iter().any(|v| *v),
            Operation::Xor => inputs.iter().filter(|v| **v).count() % 2 == 1,
            Operation::Xnor => inputs.iter().filter(|v| **v).count() % 2 == 0,
            Operation::Buffer | Operation::Light => first,
        }
    }

    /// Whether gates of this operation may feed other gates.
    pub fn can_drive(&self) -> bool {
        !matches!(self, Operation::Light)
    }
}

impl FromStr for Operation {
    type Err = SparkError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.to_ascii_uppercase().as_str() {
            "AND" => Ok(Operation::And),
            "OR" => Ok(Operation::Or),
            "NOT" => Ok(Operation::Not),
            "NAND" => Ok(Operation::Nand),
            "NOR" => Ok(Operation::Nor),
            "XOR" => Ok(Operation::Xor),
            "XNOR" => Ok(Operation::Xnor),
            "BUFFER" => Ok(Operation::Buffer),
            "LIGHT" => Ok(Operation::Light),
            _ => Err(SparkError::unknown_operation(tag)),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A node in the logic-gate graph.
///
/// Input slots hold the ids of feeding gates (`None` for an unconnected
/// slot); `consumers` mirrors those edges from the other side as
/// `(gate id, slot)` pairs. The registry keeps both directions in sync.
#[derive(Debug, Clone)]
pub struct Gate {
    pub(crate) id: String,
    pub(crate) operation: Operation,
    pub(crate) inputs: Vec<Option<String>>,
    pub(crate) consumers: Vec<(String, usize)>,
    pub(crate) raw_value: bool,
    pub(crate) cached_output: bool,
    pub(crate) dirty: bool,
}

impl Gate {
    /// Create a gate. `Buffer` and `Light` gates start with their single
    /// input slot open; other operations grow slots as edges connect.
    pub(crate) fn new(operation: Operation, id: impl Into<String>) -> Self {
        let inputs = match operation {
            Operation::Buffer | Operation::Light => vec![None],
            _ => Vec::new(),
        };
        Self {
            id: id.into(),
            operation,
            inputs,
            consumers: Vec::new(),
            raw_value: false,
            cached_output: false,
            dirty: true,
        }
    }

    /// The gate id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The gate's operation.
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The id feeding a slot, if connected.
    pub fn input_source(&self, slot: usize) -> Option<&str> {
        self.inputs.get(slot).and_then(|s| s.as_deref())
    }

    /// Number of connected input slots.
    pub fn connected_input_count(&self) -> usize {
        self.inputs.iter().flatten().count()
    }

    /// Downstream edges as `(gate id, slot)` pairs.
    pub fn consumers(&self) -> &[(String, usize)] {
        &self.consumers
    }

    /// Whether no gate consumes this one's output.
    pub fn is_sink(&self) -> bool {
        self.consumers.is_empty()
    }

    /// The user-set raw value (meaningful for `Buffer` gates).
    pub fn raw_value(&self) -> bool {
        self.raw_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_or_truth() {
        assert!(Operation::And.apply(&[true, true]));
        assert!(!Operation::And.apply(&[true, false]));
        assert!(Operation::Or.apply(&[false, true]));
        assert!(!Operation::Or.apply(&[false, false]));
    }

    #[test]
    fn test_negated_forms() {
        assert!(!Operation::Not.apply(&[true]));
        assert!(Operation::Not.apply(&[false]));
        assert!(Operation::Nand.apply(&[true, false]));
        assert!(!Operation::Nand.apply(&[true, true]));
        assert!(Operation::Nor.apply(&[false, false]));
        assert!(!Operation::Nor.apply(&[false, true]));
    }

    #[test]
    fn test_parity_forms() {
        // XOR is an odd-parity test, not pairwise
        assert!(Operation::Xor.apply(&[true, true, true]));
        assert!(!Operation::Xor.apply(&[true, true]));
        assert!(Operation::Xnor.apply(&[true, true]));
        assert!(!Operation::Xnor.apply(&[true, false]));
    }

    #[test]
    fn test_passthrough_forms() {
        assert!(Operation::Buffer.apply(&[true]));
        assert!(!Operation::Buffer.apply(&[false]));
        assert!(Operation::Light.apply(&[true]));
        assert!(!Operation::Light.apply(&[]));
    }

    #[test]
    fn test_tag_round_trip() {
        for op in [
            Operation::And,
            Operation::Or,
            Operation::Not,
            Operation::Nand,
            Operation::Nor,
            Operation::Xor,
            Operation::Xnor,
            Operation::Buffer,
            Operation::Light,
        ] {
            assert_eq!(op.tag().parse::<Operation>().unwrap(), op);
        }
        assert_eq!("xor".parse::<Operation>().unwrap(), Operation::Xor);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let err = "FLIPFLOP".parse::<Operation>().unwrap_err();
        assert!(matches!(
            err,
            SparkError::UnknownOperation { ref tag } if tag == "FLIPFLOP"
        ));
    }

    #[test]
    fn test_new_gate_slot_layout() {
        assert_eq!(Gate::new(Operation::Buffer, "in1").inputs.len(), 1);
        assert_eq!(Gate::new(Operation::Light, "l1").inputs.len(), 1);
        assert!(Gate::new(Operation::And, "a1").inputs.is_empty());
        assert!(Gate::new(Operation::And, "a1").dirty);
    }
}

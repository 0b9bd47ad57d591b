//! Gate registry: connection management and memoized evaluation.

use std::collections::{HashMap, HashSet};

use log::debug;

use super::gate::{Gate, Operation};
use crate::error::{Result, SparkError};

/// The logic-gate graph: a flat registry of gates wired by id.
///
/// The graph is acyclic at all times: edges that would close a cycle are
/// refused at connection time. Outputs are evaluated lazily; a mutation
/// dirties the affected gate and its transitive consumers, and a dirty
/// gate recomputes once on the next read.
#[derive(Debug, Default)]
pub struct Circuit {
    gates: HashMap<String, Gate>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new gate. Errors on a duplicate id.
    pub fn add_gate(&mut self, operation: Operation, id: impl Into<String>) -> Result<()> {
        let id = id.into();
        if self.gates.contains_key(&id) {
            return Err(SparkError::duplicate_gate(id));
        }
        self.gates.insert(id.clone(), Gate::new(operation, id));
        Ok(())
    }

    /// Register a new gate from an operation tag (e.g. `"NAND"`). Errors on
    /// an unknown tag or a duplicate id.
    pub fn add_gate_tag(&mut self, tag: &str, id: impl Into<String>) -> Result<()> {
        let operation = tag.parse::<Operation>()?;
        self.add_gate(operation, id)
    }

    /// Connect `source`'s output to `destination`'s first free input slot
    /// (appending a slot if all are taken). Returns whether the edge was
    /// applied; refusals leave the graph unchanged.
    pub fn connect(&mut self, source: &str, destination: &str) -> bool {
        let Some(dest) = self.gates.get(destination) else {
            return false;
        };
        let slot = dest
            .inputs
            .iter()
            .position(Option::is_none)
            .unwrap_or(dest.inputs.len());
        self.connect_slot(source, destination, slot)
    }

    /// Connect `source`'s output to a specific input slot of `destination`.
    ///
    /// Refused (returns false, graph unchanged) when either id is unknown,
    /// the source is a light, the slot is occupied, the slot exceeds a
    /// light's single input, or the edge would create a cycle.
    pub fn connect_slot(&mut self, source: &str, destination: &str, slot: usize) -> bool {
        let Some(src) = self.gates.get(source) else {
            return false;
        };
        if !src.operation.can_drive() {
            debug!("cannot connect '{source}': lights are sink-only probes");
            return false;
        }
        let Some(dest) = self.gates.get(destination) else {
            return false;
        };
        if dest.operation == Operation::Light && slot > 0 {
            debug!("cannot connect to '{destination}' slot {slot}: lights take one input");
            return false;
        }
        if dest.inputs.get(slot).is_some_and(Option::is_some) {
            debug!("cannot connect to '{destination}' slot {slot}: already occupied");
            return false;
        }
        if self.would_create_cycle(source, destination) {
            debug!("cannot connect '{source}' to '{destination}': would create a cycle");
            return false;
        }

        if let Some(dest) = self.gates.get_mut(destination) {
            if slot >= dest.inputs.len() {
                dest.inputs.resize(slot + 1, None);
            }
            dest.inputs[slot] = Some(source.to_string());
        }
        if let Some(src) = self.gates.get_mut(source) {
            src.consumers.push((destination.to_string(), slot));
        }
        self.mark_dirty(destination);
        true
    }

    /// Whether adding the edge `source -> destination` would make a gate
    /// reachable from itself.
    pub fn would_create_cycle(&self, source: &str, destination: &str) -> bool {
        let mut visited = HashSet::new();
        self.reaches(destination, source, &mut visited)
    }

    fn reaches(&self, from: &str, target: &str, visited: &mut HashSet<String>) -> bool {
        if from == target {
            return true;
        }
        if !visited.insert(from.to_string()) {
            return false;
        }
        let Some(gate) = self.gates.get(from) else {
            return false;
        };
        for (consumer, _) in &gate.consumers {
            if self.reaches(consumer, target, visited) {
                return true;
            }
        }
        false
    }

    /// Remove every edge from `source` into `destination`. Returns whether
    /// anything was removed.
    pub fn disconnect(&mut self, source: &str, destination: &str) -> bool {
        let mut changed = false;
        if let Some(dest) = self.gates.get_mut(destination) {
            for slot in dest.inputs.iter_mut() {
                if slot.as_deref() == Some(source) {
                    *slot = None;
                    changed = true;
                }
            }
        }
        if let Some(src) = self.gates.get_mut(source) {
            let before = src.consumers.len();
            src.consumers.retain(|(consumer, _)| consumer != destination);
            changed |= src.consumers.len() != before;
        }
        if changed {
            self.mark_dirty(destination);
        }
        changed
    }

    /// Remove a gate, severing every edge touching it in both directions
    /// first. Returns whether the gate existed.
    pub fn remove_gate(&mut self, id: &str) -> bool {
        let Some(gate) = self.gates.get(id) else {
            return false;
        };
        let sources: Vec<String> = gate.inputs.iter().flatten().cloned().collect();
        let consumers: Vec<String> = gate.consumers.iter().map(|(c, _)| c.clone()).collect();
        for source in sources {
            self.disconnect(&source, id);
        }
        for consumer in consumers {
            self.disconnect(id, &consumer);
        }
        self.gates.remove(id);
        true
    }

    /// Set a buffer gate's raw value, dirtying everything downstream.
    /// False if the id is unknown or the gate is not a buffer.
    pub fn set_value(&mut self, id: &str, value: bool) -> bool {
        match self.gates.get_mut(id) {
            Some(gate) if gate.operation == Operation::Buffer => gate.raw_value = value,
            _ => return false,
        }
        self.mark_dirty(id);
        true
    }

    /// Mark a gate and its transitive consumers dirty. Stops at gates that
    /// are already dirty: a dirty gate's consumers are dirty too.
    fn mark_dirty(&mut self, id: &str) {
        let Some(gate) = self.gates.get_mut(id) else {
            return;
        };
        if gate.dirty {
            return;
        }
        gate.dirty = true;
        let consumers: Vec<String> = gate.consumers.iter().map(|(c, _)| c.clone()).collect();
        for consumer in consumers {
            self.mark_dirty(&consumer);
        }
    }

    /// A gate's output value, recomputed only if dirty. False on an
    /// unknown id.
    ///
    /// Unconnected slots read the gate's own raw value (false unless set on
    /// a buffer). A gate with zero connected inputs reads low regardless of
    /// its truth function, except buffers (raw value passthrough) and
    /// lights (unfed probe, false anyway).
    pub fn output(&mut self, id: &str) -> bool {
        let dirty = match self.gates.get(id) {
            Some(gate) => gate.dirty,
            None => return false,
        };
        if dirty {
            let (operation, slots, raw) = {
                let gate = &self.gates[id];
                (gate.operation, gate.inputs.clone(), gate.raw_value)
            };
            let mut inputs = Vec::with_capacity(slots.len());
            for slot in &slots {
                inputs.push(match slot {
                    Some(source) => self.output(source),
                    None => raw,
                });
            }
            let value = operation.apply(&inputs);
            if let Some(gate) = self.gates.get_mut(id) {
                gate.cached_output = value;
                gate.dirty = false;
            }
        }
        let Some(gate) = self.gates.get(id) else {
            return false;
        };
        if gate.connected_input_count() == 0
            && !matches!(gate.operation, Operation::Buffer | Operation::Light)
        {
            return false;
        }
        gate.cached_output
    }

    /// Evaluate every registered gate. Memoization makes the visit order
    /// irrelevant.
    pub fn evaluate(&mut self) -> HashMap<String, bool> {
        let ids: Vec<String> = self.gates.keys().cloned().collect();
        let mut results = HashMap::with_capacity(ids.len());
        for id in ids {
            let value = self.output(&id);
            results.insert(id, value);
        }
        results
    }

    /// Evaluate only the end gates: those no other gate consumes.
    pub fn sink_outputs(&mut self) -> HashMap<String, bool> {
        let ids: Vec<String> = self
            .gates
            .values()
            .filter(|g| g.is_sink())
            .map(|g| g.id.clone())
            .collect();
        let mut results = HashMap::with_capacity(ids.len());
        for id in ids {
            let value = self.output(&id);
            results.insert(id, value);
        }
        results
    }

    /// Look up a gate by id.
    pub fn gate(&self, id: &str) -> Option<&Gate> {
        self.gates.get(id)
    }

    /// Iterate over all registered gates.
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.values()
    }

    /// Number of registered gates.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether the circuit has no gates.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuit_with(gates: &[(&str, Operation)]) -> Circuit {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut circuit = Circuit::new();
        for (id, op) in gates {
            circuit.add_gate(*op, *id).unwrap();
        }
        circuit
    }

    #[test]
    fn test_duplicate_gate_id_is_an_error() {
        let mut circuit = Circuit::new();
        circuit.add_gate(Operation::And, "g1").unwrap();
        let err = circuit.add_gate(Operation::Or, "g1").unwrap_err();
        assert!(matches!(err, SparkError::DuplicateGate { ref id } if id == "g1"));
    }

    #[test]
    fn test_add_gate_tag() {
        let mut circuit = Circuit::new();
        circuit.add_gate_tag("nand", "g1").unwrap();
        assert_eq!(circuit.gate("g1").unwrap().operation(), Operation::Nand);
        assert!(matches!(
            circuit.add_gate_tag("TRISTATE", "g2").unwrap_err(),
            SparkError::UnknownOperation { .. }
        ));
    }

    #[test]
    fn test_and_over_buffers() {
        let mut circuit = circuit_with(&[
            ("in1", Operation::Buffer),
            ("in2", Operation::Buffer),
            ("and1", Operation::And),
        ]);
        assert!(circuit.connect("in1", "and1"));
        assert!(circuit.connect("in2", "and1"));

        assert!(circuit.set_value("in1", true));
        assert!(circuit.set_value("in2", true));
        assert!(circuit.output("and1"));

        circuit.set_value("in2", false);
        assert!(!circuit.output("and1"));
    }

    #[test]
    fn test_connect_fills_first_free_slot() {
        let mut circuit = circuit_with(&[
            ("a", Operation::Buffer),
            ("b", Operation::Buffer),
            ("c", Operation::Buffer),
            ("or1", Operation::Or),
        ]);
        assert!(circuit.connect("a", "or1"));
        assert!(circuit.connect("b", "or1"));
        assert!(circuit.disconnect("a", "or1"));

        // slot 0 opened back up and is reused before a new slot is grown
        assert!(circuit.connect("c", "or1"));
        let or1 = circuit.gate("or1").unwrap();
        assert_eq!(or1.input_source(0), Some("c"));
        assert_eq!(or1.input_source(1), Some("b"));
        assert_eq!(or1.connected_input_count(), 2);
    }

    #[test]
    fn test_occupied_slot_is_refused() {
        let mut circuit = circuit_with(&[
            ("a", Operation::Buffer),
            ("b", Operation::Buffer),
            ("l1", Operation::Light),
        ]);
        assert!(circuit.connect_slot("a", "l1", 0));
        assert!(!circuit.connect_slot("b", "l1", 0));
        assert_eq!(circuit.gate("l1").unwrap().input_source(0), Some("a"));
        assert!(circuit.gate("b").unwrap().consumers().is_empty());
    }

    #[test]
    fn test_light_is_sink_only() {
        let mut circuit = circuit_with(&[
            ("a", Operation::Buffer),
            ("l1", Operation::Light),
            ("and1", Operation::And),
        ]);
        assert!(!circuit.connect("l1", "and1"));
        // a light takes exactly one input
        assert!(!circuit.connect_slot("a", "l1", 1));
        assert!(circuit.connect_slot("a", "l1", 0));
    }

    #[test]
    fn test_cycle_is_refused_and_graph_unchanged() {
        let mut circuit = circuit_with(&[
            ("g1", Operation::And),
            ("g2", Operation::Or),
            ("g3", Operation::Not),
        ]);
        assert!(circuit.connect("g1", "g2"));
        assert!(circuit.connect("g2", "g3"));

        assert!(circuit.would_create_cycle("g3", "g1"));
        assert!(!circuit.connect("g3", "g1"));
        assert!(!circuit.connect("g1", "g1"));

        let g1 = circuit.gate("g1").unwrap();
        assert_eq!(g1.connected_input_count(), 0);
        let g3 = circuit.gate("g3").unwrap();
        assert!(g3.consumers().is_empty());

        // an edge that keeps the graph acyclic is still accepted
        assert!(circuit.connect("g1", "g3"));
    }

    #[test]
    fn test_floating_inputs_read_low() {
        let mut circuit = circuit_with(&[
            ("and1", Operation::And),
            ("not1", Operation::Not),
            ("xnor1", Operation::Xnor),
        ]);
        // AND/XNOR would be vacuously true over no inputs; floating gates
        // read low instead
        assert!(!circuit.output("and1"));
        assert!(!circuit.output("not1"));
        assert!(!circuit.output("xnor1"));
    }

    #[test]
    fn test_buffer_passthrough_and_light_probe() {
        let mut circuit = circuit_with(&[("in1", Operation::Buffer), ("l1", Operation::Light)]);
        assert!(!circuit.output("in1"));
        assert!(circuit.set_value("in1", true));
        assert!(circuit.output("in1"));
        assert!(!circuit.output("l1"));

        assert!(circuit.connect("in1", "l1"));
        assert!(circuit.output("l1"));
    }

    #[test]
    fn test_set_value_only_on_buffers() {
        let mut circuit = circuit_with(&[("and1", Operation::And)]);
        assert!(!circuit.set_value("and1", true));
        assert!(!circuit.set_value("missing", true));
    }

    #[test]
    fn test_raw_value_change_reaches_every_light() {
        let mut circuit = circuit_with(&[
            ("in1", Operation::Buffer),
            ("buf1", Operation::Buffer),
            ("and1", Operation::And),
            ("l1", Operation::Light),
            ("l2", Operation::Light),
        ]);
        assert!(circuit.connect("in1", "buf1"));
        assert!(circuit.connect("in1", "and1"));
        assert!(circuit.connect("buf1", "and1"));
        assert!(circuit.connect("and1", "l1"));
        assert!(circuit.connect("in1", "l2"));

        assert!(!circuit.output("l1"));
        assert!(!circuit.output("l2"));

        circuit.set_value("in1", true);
        assert!(circuit.output("l1"), "diamond-shaped fanout must revalidate");
        assert!(circuit.output("l2"));

        circuit.set_value("in1", false);
        assert!(!circuit.output("l1"));
        assert!(!circuit.output("l2"));
    }

    #[test]
    fn test_disconnect_dirties_downstream() {
        let mut circuit = circuit_with(&[
            ("in1", Operation::Buffer),
            ("or1", Operation::Or),
            ("l1", Operation::Light),
        ]);
        circuit.set_value("in1", true);
        circuit.connect("in1", "or1");
        circuit.connect("or1", "l1");
        assert!(circuit.output("l1"));

        assert!(circuit.disconnect("in1", "or1"));
        // or1 is floating again and reads low
        assert!(!circuit.output("l1"));
        assert!(!circuit.disconnect("in1", "or1"));
    }

    #[test]
    fn test_remove_gate_severs_both_directions() {
        let mut circuit = circuit_with(&[
            ("in1", Operation::Buffer),
            ("and1", Operation::And),
            ("l1", Operation::Light),
        ]);
        circuit.set_value("in1", true);
        circuit.connect("in1", "and1");
        circuit.connect("and1", "l1");
        assert!(circuit.output("l1"));

        assert!(circuit.remove_gate("and1"));
        assert!(circuit.gate("and1").is_none());
        assert!(circuit.gate("in1").unwrap().consumers().is_empty());
        assert_eq!(circuit.gate("l1").unwrap().connected_input_count(), 0);
        assert!(!circuit.output("l1"));

        assert!(!circuit.remove_gate("and1"));
    }

    #[test]
    fn test_evaluate_and_sinks() {
        let mut circuit = circuit_with(&[
            ("in1", Operation::Buffer),
            ("not1", Operation::Not),
            ("l1", Operation::Light),
        ]);
        circuit.connect("in1", "not1");
        circuit.connect("not1", "l1");

        let all = circuit.evaluate();
        assert_eq!(all.len(), 3);
        assert_eq!(all["in1"], false);
        assert_eq!(all["not1"], true);
        assert_eq!(all["l1"], true);

        let sinks = circuit.sink_outputs();
        assert_eq!(sinks.len(), 1);
        assert_eq!(sinks["l1"], true);
    }

    #[test]
    fn test_queries_fail_closed() {
        let mut circuit = Circuit::new();
        assert!(!circuit.output("missing"));
        assert!(!circuit.connect("a", "b"));
        assert!(!circuit.disconnect("a", "b"));
        assert!(!circuit.remove_gate("a"));
        assert!(circuit.evaluate().is_empty());
    }

    // Two inputs driving a two-level AND tree, with a feedback attempt.
    #[test]
    fn test_demo_circuit() {
        let mut circuit = circuit_with(&[
            ("input1", Operation::Buffer),
            ("input2", Operation::Buffer),
            ("and1", Operation::And),
            ("not1", Operation::Not),
            ("and2", Operation::And),
            ("not2", Operation::Not),
        ]);
        circuit.set_value("input1", true);
        circuit.set_value("input2", false);

        assert!(circuit.connect("input1", "and1"));
        assert!(circuit.connect("input2", "not1"));
        assert!(circuit.connect("not1", "and1"));
        assert!(circuit.connect("and1", "and2"));
        assert!(circuit.connect("input1", "and2"));
        assert!(circuit.connect("and2", "not2"));
        assert!(!circuit.connect("and2", "and1"), "feedback edge must be refused");

        let results = circuit.evaluate();
        assert_eq!(results["not1"], true);
        assert_eq!(results["and1"], true);
        assert_eq!(results["and2"], true);
        assert_eq!(results["not2"], false);
    }
}

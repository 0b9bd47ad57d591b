//! Network graph: terminal registry, part list, and the loop search.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use super::terminal::{Position, Terminal};
use crate::parts::{Endpoint, Part, PartKind};

/// Tri-state result of a network simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulateOutcome {
    /// No battery in the network
    NoSource,
    /// A battery is present but no closed conducting loop spans it
    Open,
    /// A closed conducting loop spans the battery terminals
    Closed,
}

impl SimulateOutcome {
    /// Whether current flows.
    pub fn is_closed(&self) -> bool {
        matches!(self, SimulateOutcome::Closed)
    }
}

/// The electrical network: all terminals and parts on the workspace.
///
/// Two guarantees hold after every mutation:
/// - any two part endpoints whose positions fell within the merge radius at
///   insertion reference the same terminal;
/// - no terminal outlives the last part referencing its position.
#[derive(Debug)]
pub struct Network {
    terminals: HashMap<String, Terminal>,
    parts: Vec<Part>,
    merge_radius: f64,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Create a network with the default merge radius.
    pub fn new() -> Self {
        Self::with_merge_radius(crate::DEFAULT_MERGE_RADIUS)
    }

    /// Create a network with a custom merge radius.
    pub fn with_merge_radius(merge_radius: f64) -> Self {
        Self {
            terminals: HashMap::new(),
            parts: Vec::new(),
            merge_radius,
        }
    }

    /// The distance below which two inserted terminal positions collapse
    /// into one electrical node.
    pub fn merge_radius(&self) -> f64 {
        self.merge_radius
    }

    /// Change the merge radius. Applies to subsequent insertions only.
    pub fn set_merge_radius(&mut self, merge_radius: f64) {
        self.merge_radius = merge_radius;
    }

    /// Insert a terminal and return the canonical terminal id.
    ///
    /// Re-inserting a registered id keeps its identity and takes the new
    /// position (part endpoint snapshots follow). A fresh id landing
    /// strictly within the merge radius of a registered terminal is
    /// absorbed by it: adjacency is unioned bidirectionally and every part
    /// endpoint that matched the incoming position is repointed to the
    /// survivor. Otherwise the terminal registers as new.
    pub fn insert_terminal(&mut self, terminal: Terminal) -> String {
        if self.terminals.contains_key(&terminal.id) {
            let Terminal { id, position, .. } = terminal;
            if let Some(existing) = self.terminals.get_mut(&id) {
                existing.position = position;
            }
            for part in &mut self.parts {
                if part.start.terminal == id {
                    part.start.position = position;
                }
                if part.end.terminal == id {
                    part.end.position = position;
                }
            }
            return id;
        }

        let near = self
            .terminals
            .values()
            .find(|t| t.position.distance(&terminal.position) < self.merge_radius)
            .map(|t| (t.id.clone(), t.position));

        if let Some((survivor_id, survivor_pos)) = near {
            let incoming_pos = terminal.position;
            for other_id in &terminal.adjacent {
                if *other_id == survivor_id {
                    continue;
                }
                if let Some(other) = self.terminals.get_mut(other_id) {
                    other.adjacent.remove(&terminal.id);
                    other.adjacent.insert(survivor_id.clone());
                }
            }
            if let Some(survivor) = self.terminals.get_mut(&survivor_id) {
                survivor
                    .adjacent
                    .extend(terminal.adjacent.iter().filter(|a| **a != survivor_id).cloned());
            }
            for part in &mut self.parts {
                if part.start.position == incoming_pos {
                    part.start.terminal = survivor_id.clone();
                    part.start.position = survivor_pos;
                }
                if part.end.position == incoming_pos {
                    part.end.terminal = survivor_id.clone();
                    part.end.position = survivor_pos;
                }
            }
            debug!(
                "merged terminal '{}' at {} into '{}'",
                terminal.id, incoming_pos, survivor_id
            );
            return survivor_id;
        }

        let id = terminal.id.clone();
        self.terminals.insert(id.clone(), terminal);
        id
    }

    /// Add a part, canonicalizing both endpoints through the terminal
    /// registry and recording them as mutually adjacent.
    pub fn add_part(&mut self, mut part: Part) {
        part.start = self.canonical_endpoint(part.start);
        part.end = self.canonical_endpoint(part.end);

        let (s, e) = (part.start.terminal.clone(), part.end.terminal.clone());
        if s != e {
            if let Some(t) = self.terminals.get_mut(&s) {
                t.adjacent.insert(e.clone());
            }
            if let Some(t) = self.terminals.get_mut(&e) {
                t.adjacent.insert(s);
            }
        }
        self.parts.push(part);
    }

    fn canonical_endpoint(&mut self, endpoint: Endpoint) -> Endpoint {
        let id = self.insert_terminal(Terminal::new(
            endpoint.terminal,
            endpoint.position.x,
            endpoint.position.y,
        ));
        let position = self.terminals[&id].position;
        Endpoint { terminal: id, position }
    }

    /// Remove a part by id, garbage-collecting endpoint terminals that no
    /// remaining part references and pruning stale adjacency entries.
    pub fn remove_part(&mut self, part_id: &str) -> Option<Part> {
        let idx = self.parts.iter().position(|p| p.id == part_id)?;
        let removed = self.parts.remove(idx);

        for position in [removed.start.position, removed.end.position] {
            let still_used = self.parts.iter().any(|p| p.is_incident_to(position));
            if !still_used {
                self.terminals.retain(|_, t| t.position != position);
            }
        }

        let live: HashSet<String> = self.terminals.keys().cloned().collect();
        for t in self.terminals.values_mut() {
            t.adjacent.retain(|id| live.contains(id));
        }
        Some(removed)
    }

    /// All parts with an endpoint at the terminal's position. Empty on an
    /// unknown id.
    pub fn incident_parts(&self, terminal_id: &str) -> Vec<&Part> {
        let Some(terminal) = self.terminals.get(terminal_id) else {
            return Vec::new();
        };
        self.parts
            .iter()
            .filter(|p| p.is_incident_to(terminal.position))
            .collect()
    }

    /// Whether the part with this id conducts. False on an unknown id.
    pub fn conducts(&self, part_id: &str) -> bool {
        self.part(part_id).map(Part::conducts).unwrap_or(false)
    }

    /// Whether a closed path of conducting parts connects the two
    /// terminals. False on unknown ids.
    ///
    /// Backtracking depth-first search over incident parts; each part
    /// enters the visited set at most once per active path, so the search
    /// is bounded by the part count. The trivial zero-part "loop" at the
    /// start terminal does not count.
    pub fn has_closed_loop(&self, start_id: &str, target_id: &str) -> bool {
        let (Some(start), Some(target)) =
            (self.terminals.get(start_id), self.terminals.get(target_id))
        else {
            return false;
        };
        let mut visited = HashSet::new();
        self.search_loop(start.position, target.position, &mut visited)
    }

    fn search_loop(
        &self,
        current: Position,
        target: Position,
        visited: &mut HashSet<String>,
    ) -> bool {
        if current == target && !visited.is_empty() {
            return true;
        }
        for part in self.parts.iter().filter(|p| p.is_incident_to(current)) {
            if !part.conducts() || visited.contains(&part.id) {
                continue;
            }
            let Some(next) = part.opposite_end(current) else {
                continue;
            };
            visited.insert(part.id.clone());
            if self.search_loop(next, target, visited) {
                return true;
            }
            visited.remove(&part.id);
        }
        trace!("loop search dead end at {}", current);
        false
    }

    /// Enumerate up to `max_paths` distinct conducting paths between two
    /// terminals, as sequences of part ids. Empty on unknown ids.
    pub fn conductive_paths(
        &self,
        start_id: &str,
        target_id: &str,
        max_paths: usize,
    ) -> Vec<Vec<String>> {
        let mut paths = Vec::new();
        if max_paths == 0 {
            return paths;
        }
        let (Some(start), Some(target)) =
            (self.terminals.get(start_id), self.terminals.get(target_id))
        else {
            return paths;
        };
        let mut visited = HashSet::new();
        let mut trail = Vec::new();
        self.collect_paths(
            start.position,
            target.position,
            &mut visited,
            &mut trail,
            &mut paths,
            max_paths,
        );
        paths
    }

    fn collect_paths(
        &self,
        current: Position,
        target: Position,
        visited: &mut HashSet<String>,
        trail: &mut Vec<String>,
        paths: &mut Vec<Vec<String>>,
        cap: usize,
    ) {
        if paths.len() >= cap {
            return;
        }
        if current == target && !trail.is_empty() {
            paths.push(trail.clone());
            return;
        }
        for part in self.parts.iter().filter(|p| p.is_incident_to(current)) {
            if !part.conducts() || visited.contains(&part.id) {
                continue;
            }
            let Some(next) = part.opposite_end(current) else {
                continue;
            };
            visited.insert(part.id.clone());
            trail.push(part.id.clone());
            self.collect_paths(next, target, visited, trail, paths, cap);
            trail.pop();
            visited.remove(&part.id);
            if paths.len() >= cap {
                return;
            }
        }
    }

    /// Run the simulation: find the first battery and search for a closed
    /// conducting loop between its terminals.
    ///
    /// Reports topology only; the caller drives bulb visuals from the
    /// outcome (see [`Network::set_bulbs_lit`]).
    pub fn simulate(&self) -> SimulateOutcome {
        let Some(battery) = self.battery() else {
            debug!("no battery in network");
            return SimulateOutcome::NoSource;
        };
        if log::log_enabled!(log::Level::Trace) {
            for t in self.terminals.values() {
                trace!(
                    "terminal '{}' at {} adjacent to {:?}",
                    t.id,
                    t.position,
                    t.adjacent
                );
            }
        }
        if self.has_closed_loop(&battery.start.terminal, &battery.end.terminal) {
            debug!("circuit closed, current flows");
            SimulateOutcome::Closed
        } else {
            debug!("circuit open, no current flows");
            SimulateOutcome::Open
        }
    }

    /// Open or close a switch in place. False if the id is unknown or the
    /// part is not a switch.
    pub fn set_switch(&mut self, part_id: &str, on: bool) -> bool {
        for part in &mut self.parts {
            if part.id == part_id {
                if let PartKind::Switch { on: state } = &mut part.kind {
                    *state = on;
                    return true;
                }
                return false;
            }
        }
        false
    }

    /// Batch-update every bulb's lit state after a simulation verdict.
    pub fn set_bulbs_lit(&mut self, lit: bool) {
        for part in &mut self.parts {
            if let PartKind::Bulb { lit: state } = &mut part.kind {
                *state = lit;
            }
        }
    }

    /// The first battery part, if any.
    pub fn battery(&self) -> Option<&Part> {
        self.parts.iter().find(|p| p.is_battery())
    }

    /// All bulb parts.
    pub fn bulbs(&self) -> Vec<&Part> {
        self.parts.iter().filter(|p| p.is_bulb()).collect()
    }

    /// All parts, in insertion order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Look up a part by id.
    pub fn part(&self, part_id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == part_id)
    }

    /// Look up a terminal by id.
    pub fn terminal(&self, terminal_id: &str) -> Option<&Terminal> {
        self.terminals.get(terminal_id)
    }

    /// Iterate over all registered terminals.
    pub fn terminals(&self) -> impl Iterator<Item = &Terminal> {
        self.terminals.values()
    }
}

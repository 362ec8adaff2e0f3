//! FrequencyGrouper (C6): partitions nodes into co-interfering frequency
//! clusters so the interference aggregator only considers nodes that could
//! plausibly interfere.

use crate::{node::NodeId, units::Frequency};

pub const DEFAULT_ADJACENT_THRESHOLD: Frequency = Frequency::from_MHz(50.0);
pub const DEFAULT_ORTHOGONAL_THRESHOLD: Frequency = Frequency::from_MHz(100.0);
pub const COCHANNEL_TOLERANCE: Frequency = Frequency::from_MHz(1.0);

/// A cluster of nodes whose frequencies are within `adjacent_threshold_hz`
/// of the group's anchor frequency (the first member encountered in sorted
/// order). The group center is the mean of member frequencies.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyGroup {
    pub center_frequency: Frequency,
    pub members: Vec<(NodeId, Frequency)>,
}

impl FrequencyGroup {
    pub fn num_nodes(&self) -> usize {
        self.members.len()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.members.iter().any(|(id, _)| id == node)
    }
}

/// Groups nodes by frequency. Ties are broken stably by input order: nodes
/// at the same frequency retain their relative position from
/// `node_frequencies`.
pub fn group_nodes_by_frequency(
    node_frequencies: &[(NodeId, Frequency)],
    adjacent_threshold: Frequency,
) -> Vec<FrequencyGroup> {
    if node_frequencies.is_empty() {
        return Vec::new();
    }

    let mut sorted: Vec<(NodeId, Frequency)> = node_frequencies.to_vec();
    sorted.sort_by(|a, b| a.1.hz().total_cmp(&b.1.hz()));

    let mut groups = Vec::new();
    let mut current: Vec<(NodeId, Frequency)> = Vec::new();
    let mut anchor_hz = None;

    for (node, frequency) in sorted {
        match anchor_hz {
            None => {
                anchor_hz = Some(frequency.hz());
                current.push((node, frequency));
            }
            Some(anchor) if (frequency.hz() - anchor).abs() <= adjacent_threshold.hz() => {
                current.push((node, frequency));
            }
            Some(_) => {
                groups.push(finalize_group(std::mem::take(&mut current)));
                anchor_hz = Some(frequency.hz());
                current.push((node, frequency));
            }
        }
    }

    if !current.is_empty() {
        groups.push(finalize_group(current));
    }

    groups
}

fn finalize_group(members: Vec<(NodeId, Frequency)>) -> FrequencyGroup {
    let sum: f64 = members.iter().map(|(_, f)| f.hz()).sum();
    let center_frequency = Frequency::from_hz(sum / members.len() as f64);
    FrequencyGroup { center_frequency, members }
}

pub fn frequency_separation(a: Frequency, b: Frequency) -> Frequency {
    Frequency::from_hz((a.hz() - b.hz()).abs())
}

pub fn are_orthogonal(a: Frequency, b: Frequency, orthogonal_threshold: Frequency) -> bool {
    frequency_separation(a, b).hz() > orthogonal_threshold.hz()
}

pub fn are_cochannel(a: Frequency, b: Frequency, cochannel_tolerance: Frequency) -> bool {
    frequency_separation(a, b).hz() < cochannel_tolerance.hz()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nodes(pairs: &[(&str, f64)]) -> Vec<(NodeId, Frequency)> {
        pairs
            .iter()
            .map(|(id, ghz)| (NodeId::new(*id), Frequency::from_GHz(*ghz)))
            .collect()
    }

    #[test]
    fn clusters_adjacent_and_cochannel_nodes_together() {
        let input = nodes(&[
            ("node1", 5.18),
            ("node2", 5.18),
            ("node3", 5.20),
            ("node4", 5.50),
        ]);

        let groups = group_nodes_by_frequency(&input, DEFAULT_ADJACENT_THRESHOLD);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].num_nodes(), 3);
        assert_eq!(groups[1].num_nodes(), 1);
    }

    #[test]
    fn empty_input_produces_no_groups() {
        assert!(group_nodes_by_frequency(&[], DEFAULT_ADJACENT_THRESHOLD).is_empty());
    }

    #[test]
    fn single_node_is_its_own_group() {
        let input = nodes(&[("solo", 2.4)]);
        let groups = group_nodes_by_frequency(&input, DEFAULT_ADJACENT_THRESHOLD);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].center_frequency.hz(), Frequency::from_GHz(2.4).hz());
    }

    #[test]
    fn orthogonal_and_cochannel_thresholds() {
        let a = Frequency::from_GHz(5.18);
        let b = Frequency::from_GHz(5.50);
        assert!(are_orthogonal(a, b, DEFAULT_ORTHOGONAL_THRESHOLD));
        assert!(!are_cochannel(a, b, COCHANNEL_TOLERANCE));
        assert!(are_cochannel(a, a, COCHANNEL_TOLERANCE));
    }

    #[test]
    fn ties_are_broken_stably_by_input_order() {
        let input = nodes(&[("b", 5.18), ("a", 5.18)]);
        let groups = group_nodes_by_frequency(&input, DEFAULT_ADJACENT_THRESHOLD);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members[0].0.as_str(), "b");
        assert_eq!(groups[0].members[1].0.as_str(), "a");
    }
}

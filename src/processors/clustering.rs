//! Tolerance clustering of boundary coordinates.
//!
//! A ruled line several pixels thick (or slightly tilted) projects onto many
//! neighbouring coordinates. Clustering collapses each such run into one
//! representative position.

use serde::{Deserialize, Serialize};

/// One grid line: the raw coordinates that were merged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryGroup {
    members: Vec<u32>,
}

impl BoundaryGroup {
    fn start(value: u32) -> Self {
        Self {
            members: vec![value],
        }
    }

    /// Raw coordinates in ascending order.
    pub fn members(&self) -> &[u32] {
        &self.members
    }

    /// Last (largest) member.
    pub fn last(&self) -> u32 {
        // Groups are created with one member and only grow.
        self.members[self.members.len() - 1]
    }

    /// Representative position: the median member, with an even-sized group
    /// resolving to the floor of the mean of its two middle members.
    pub fn median(&self) -> u32 {
        let n = self.members.len();
        let mid = n / 2;
        if n % 2 == 1 {
            self.members[mid]
        } else {
            let sum = self.members[mid - 1] as u64 + self.members[mid] as u64;
            (sum / 2) as u32
        }
    }
}

/// Groups `values` so that a new group starts whenever a value exceeds the
/// previous group's last member by more than `tolerance`.
pub fn group_with_tolerance(values: &[u32], tolerance: u32) -> Vec<BoundaryGroup> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let mut groups: Vec<BoundaryGroup> = Vec::new();
    for value in sorted {
        match groups.last_mut() {
            Some(group) if value - group.last() <= tolerance => group.members.push(value),
            _ => groups.push(BoundaryGroup::start(value)),
        }
    }
    groups
}

/// Clusters `values` and returns one median per group.
///
/// The result is strictly increasing and consecutive entries differ by more
/// than `tolerance`.
pub fn cluster_with_tolerance(values: &[u32], tolerance: u32) -> Vec<u32> {
    group_with_tolerance(values, tolerance)
        .iter()
        .map(BoundaryGroup::median)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert!(cluster_with_tolerance(&[], 10).is_empty());
    }

    #[test]
    fn test_thick_lines_collapse_to_medians() {
        let values = [100, 101, 102, 103, 50, 51, 52, 200];
        assert_eq!(cluster_with_tolerance(&values, 12), vec![51, 101, 200]);
    }

    #[test]
    fn test_chained_values_join_one_group() {
        // Each step is within tolerance of the previous member.
        let groups = group_with_tolerance(&[0, 8, 16, 24], 8);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members(), &[0, 8, 16, 24]);
        assert_eq!(groups[0].median(), 12);
    }

    #[test]
    fn test_gap_larger_than_tolerance_splits() {
        assert_eq!(cluster_with_tolerance(&[10, 19], 8), vec![10, 19]);
        assert_eq!(cluster_with_tolerance(&[10, 18], 8), vec![14]);
    }

    #[test]
    fn test_output_properties_hold_for_noisy_input() {
        let values: Vec<u32> = (0..200u32).map(|i| (i * 37) % 503).collect();
        for tolerance in [1, 4, 12] {
            let lines = cluster_with_tolerance(&values, tolerance);
            assert!(lines.len() <= values.len());
            assert!(lines.windows(2).all(|w| w[1] > w[0] + tolerance));
        }
    }
}

//! Classification of objects into clusters of the WISE 3D color space.
//!
//! Five groups are separated by fixed half-space and box predicates on
//! (x, y, z) = (W1−W2, W2−W3, W3−W4). The first four predicates are evaluated
//! independently of each other; `Other` is the complement of their union.
//!
//! The first four groups are not disjoint. For example `(0, 0, -0.5)` is both
//! carbon-rich and a cool shell, and such objects are drawn once per matching
//! group.
//!
//! # Example
//!
//! ```
//! use wise_stereo::core::loaders::PointSet;
//! use wise_stereo::processors::classification::{classify, Group};
//!
//! let points = PointSet::from_points(&[[1.0, 1.0, 1.0], [3.0, 0.0, 0.0]]);
//! let masks = classify(&points);
//! assert_eq!(masks.indices(Group::OxygenRich), vec![0]);
//! assert_eq!(masks.indices(Group::Other), vec![1]);
//! ```

use std::fmt;

use crate::core::loaders::PointSet;

/// Visual cluster an object can belong to, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Oxygen-rich AGB stars
    OxygenRich,
    /// Carbon-rich AGB stars
    CarbonRich,
    /// Cool and warm YSO shells with constant density and low optical depth
    CoolShell,
    /// Warm YSO shells with constant density and high optical depth
    WarmShell,
    /// Everything not associated with the clusters above
    Other,
}

impl Group {
    pub const ALL: [Group; 5] = [
        Group::OxygenRich,
        Group::CarbonRich,
        Group::CoolShell,
        Group::WarmShell,
        Group::Other,
    ];

    /// The four identified clusters, excluding the catch-all group.
    pub const IDENTIFIED: [Group; 4] = [
        Group::OxygenRich,
        Group::CarbonRich,
        Group::CoolShell,
        Group::WarmShell,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short machine-friendly name.
    pub fn name(self) -> &'static str {
        match self {
            Group::OxygenRich => "oxygen-rich",
            Group::CarbonRich => "carbon-rich",
            Group::CoolShell => "cool-shell",
            Group::WarmShell => "warm-shell",
            Group::Other => "other",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Group::OxygenRich => "O-rich AGB stars",
            Group::CarbonRich => "C-rich AGB stars",
            Group::CoolShell => "cool YSO shells, constant density",
            Group::WarmShell => "warm YSO shells, constant density, high optical depth",
            Group::Other => "other / unidentified",
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[inline]
pub fn is_oxygen_rich(x: f64, y: f64, z: f64) -> bool {
    x > 0.2 && x < 2.0 && y > 0.4 && y < 2.2 && z > 0.0 && z < 1.3 && z > 0.722 * y - 0.289
}

#[inline]
pub fn is_carbon_rich(x: f64, y: f64, z: f64) -> bool {
    x > 0.629 * y - 0.198
        && x < 0.629 * y + 0.359
        && z > 0.722 * y - 0.911
        && z < 0.722 * y - 0.289
}

#[inline]
pub fn is_cool_shell(x: f64, y: f64, _z: f64) -> bool {
    x < 0.2 && y < 0.4
}

#[inline]
pub fn is_warm_shell(x: f64, y: f64, z: f64) -> bool {
    x > 0.3 && x < 1.4 && y > 1.4 && y < 3.5 && z > 1.5 && z < 2.8
}

/// Membership of a single object in each group, indexed by [`Group::index`].
pub fn classify_point(x: f64, y: f64, z: f64) -> [bool; 5] {
    let oxygen = is_oxygen_rich(x, y, z);
    let carbon = is_carbon_rich(x, y, z);
    let cool = is_cool_shell(x, y, z);
    let warm = is_warm_shell(x, y, z);
    let other = !(oxygen || carbon || cool || warm);
    [oxygen, carbon, cool, warm, other]
}

/// One boolean mask per group over the indices of a point set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMasks {
    masks: [Vec<bool>; 5],
}

impl GroupMasks {
    /// Mask of `group`; `mask(g)[i]` is true when object `i` belongs to `g`.
    #[inline]
    pub fn mask(&self, group: Group) -> &[bool] {
        &self.masks[group.index()]
    }

    /// Number of objects the masks were computed for.
    #[inline]
    pub fn len(&self) -> usize {
        self.masks[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, group: Group, i: usize) -> bool {
        self.masks[group.index()][i]
    }

    /// Indices of the objects belonging to `group`.
    pub fn indices(&self, group: Group) -> Vec<usize> {
        self.mask(group)
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| m.then_some(i))
            .collect()
    }

    pub fn count(&self, group: Group) -> usize {
        self.mask(group).iter().filter(|&&m| m).count()
    }

    /// First group in priority order that object `i` belongs to.
    pub fn primary_group(&self, i: usize) -> Group {
        Group::ALL
            .into_iter()
            .find(|&g| self.contains(g, i))
            .unwrap_or(Group::Other)
    }

    /// Number of objects matching more than one identified group.
    pub fn overlap_count(&self) -> usize {
        (0..self.len())
            .filter(|&i| {
                Group::IDENTIFIED
                    .iter()
                    .filter(|&&g| self.contains(g, i))
                    .count()
                    > 1
            })
            .count()
    }
}

/// Compute the group masks for every object of a point set.
pub fn classify(points: &PointSet) -> GroupMasks {
    let n = points.len();
    let mut masks: [Vec<bool>; 5] = std::array::from_fn(|_| Vec::with_capacity(n));

    for p in points.iter() {
        let row = classify_point(p[0], p[1], p[2]);
        for (mask, member) in masks.iter_mut().zip(row) {
            mask.push(member);
        }
    }

    GroupMasks { masks }
}

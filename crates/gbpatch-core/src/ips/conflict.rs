//! Overlap detection between IPS patches.
//!
//! Two patches conflict when they write to at least one common absolute
//! offset. The relation is symmetric but not transitive, and it is recomputed
//! on every call: offset sets are expanded per comparison and never cached.

use std::path::PathBuf;

use tracing::{debug, warn};

use super::patch::IpsPatch;
use crate::error::Error;

/// Whether `a` and `b` write to a common offset.
pub fn has_conflict(a: &IpsPatch, b: &IpsPatch) -> bool {
    let offsets = a.touched_offsets();
    let other_offsets = b.touched_offsets();
    !offsets.is_disjoint(&other_offsets)
}

/// Outcome of a pairwise sweep over a selection of patches.
#[derive(Debug)]
pub enum ConflictCheck {
    /// No two patches overlap
    Clear,
    /// The first overlapping pair found, in selection order
    Conflict { first: String, second: String },
    /// A patch could not be loaded, so the sweep could not finish.
    ///
    /// This is not the same as `Clear`: callers should treat it like a
    /// conflict and ask before writing anything.
    Failed { name: String, error: Error },
}

impl ConflictCheck {
    pub fn is_clear(&self) -> bool {
        matches!(self, ConflictCheck::Clear)
    }
}

/// Load every patch in `selection` and check all pairs for overlap.
///
/// Pairs are checked in order `(0, 1), (0, 2), ..., (1, 2), ...` and the
/// sweep stops at the first overlap. Fewer than two patches is always clear.
pub fn find_first_conflict(selection: &[(String, PathBuf)]) -> ConflictCheck {
    if selection.len() < 2 {
        return ConflictCheck::Clear;
    }

    let mut patches = Vec::with_capacity(selection.len());
    for (name, path) in selection {
        match IpsPatch::open(path) {
            Ok(patch) => patches.push((name.as_str(), patch)),
            Err(error) => {
                warn!("Conflict check could not load {}: {}", name, error);
                return ConflictCheck::Failed {
                    name: name.clone(),
                    error,
                };
            }
        }
    }

    match first_conflicting_pair(patches.iter().map(|(_, p)| p)) {
        Some((i, j)) => {
            let (first, second) = (patches[i].0, patches[j].0);
            warn!("Conflict detected between {} and {}", first, second);
            ConflictCheck::Conflict {
                first: first.to_string(),
                second: second.to_string(),
            }
        }
        None => {
            debug!("No conflicts among {} patches", patches.len());
            ConflictCheck::Clear
        }
    }
}

/// Indices of the first overlapping pair among already-parsed patches.
pub fn first_conflicting_pair<'a, I>(patches: I) -> Option<(usize, usize)>
where
    I: IntoIterator<Item = &'a IpsPatch>,
{
    let patches: Vec<&IpsPatch> = patches.into_iter().collect();
    for i in 0..patches.len() {
        for j in (i + 1)..patches.len() {
            if has_conflict(patches[i], patches[j]) {
                return Some((i, j));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ips::PatchRecord;
    use std::fs;

    fn patch(records: &[(u32, usize)]) -> IpsPatch {
        IpsPatch::from_records(
            records
                .iter()
                .map(|&(offset, len)| PatchRecord::new(offset, vec![0xEA; len]).unwrap())
                .collect(),
        )
    }

    #[test]
    fn test_overlapping_ranges_conflict() {
        let a = patch(&[(16, 2)]);
        let b = patch(&[(17, 3)]);
        assert!(has_conflict(&a, &b));
        assert!(has_conflict(&b, &a));
    }

    #[test]
    fn test_adjacent_ranges_do_not_conflict() {
        let a = patch(&[(16, 2)]);
        let c = patch(&[(18, 2)]);
        assert!(!has_conflict(&a, &c));
        assert!(!has_conflict(&c, &a));
    }

    #[test]
    fn test_self_conflict() {
        let a = patch(&[(0x100, 1)]);
        assert!(has_conflict(&a, &a));
        assert!(a.has_conflict(&a));
    }

    #[test]
    fn test_empty_patch_never_conflicts() {
        let empty = IpsPatch::default();
        let a = patch(&[(0, 0x100)]);
        assert!(!has_conflict(&empty, &a));
        assert!(!has_conflict(&a, &empty));
        assert!(!has_conflict(&empty, &empty));
    }

    #[test]
    fn test_conflict_in_later_record() {
        let a = patch(&[(0x00, 4), (0x200, 8)]);
        let b = patch(&[(0x100, 4), (0x207, 1)]);
        assert!(has_conflict(&a, &b));
    }

    #[test]
    fn test_first_conflicting_pair_order() {
        let a = patch(&[(0x00, 4)]);
        let b = patch(&[(0x10, 4)]);
        let c = patch(&[(0x12, 1)]);
        let d = patch(&[(0x02, 1)]);

        // (0, 3) is found before (1, 2) because the sweep walks i first
        assert_eq!(first_conflicting_pair([&a, &b, &c, &d]), Some((0, 3)));
        assert_eq!(first_conflicting_pair([&a, &b, &c]), Some((1, 2)));
        assert_eq!(first_conflicting_pair([&a, &b]), None);
    }

    #[test]
    fn test_find_first_conflict_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, p: &IpsPatch| {
            let path = dir.path().join(format!("{}.ips", name));
            fs::write(&path, p.to_bytes()).unwrap();
            (name.to_string(), path)
        };

        let a = write("MoonJump", &patch(&[(16, 2)]));
        let b = write("FastSkating", &patch(&[(18, 2)]));
        let c = write("InfiniteLives", &patch(&[(19, 1)]));

        assert!(find_first_conflict(&[a.clone(), b.clone()]).is_clear());

        match find_first_conflict(&[a.clone(), b, c]) {
            ConflictCheck::Conflict { first, second } => {
                assert_eq!(first, "FastSkating");
                assert_eq!(second, "InfiniteLives");
            }
            other => panic!("expected conflict, got {:?}", other),
        }

        assert!(find_first_conflict(&[a]).is_clear());
        assert!(find_first_conflict(&[]).is_clear());
    }

    #[test]
    fn test_find_first_conflict_reports_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.ips");
        fs::write(&good, patch(&[(0, 1)]).to_bytes()).unwrap();
        let bad = dir.path().join("bad.ips");
        fs::write(&bad, b"garbage").unwrap();

        let check = find_first_conflict(&[("good".to_string(), good), ("bad".to_string(), bad)]);
        match check {
            ConflictCheck::Failed { name, error } => {
                assert_eq!(name, "bad");
                assert!(matches!(error, Error::InvalidFormat(_)));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_patch() -> impl Strategy<Value = IpsPatch> {
            prop::collection::vec((0u32..0x400, 1usize..32), 0..6).prop_map(|records| patch(&records))
        }

        proptest! {
            #[test]
            fn test_conflict_is_symmetric(a in arb_patch(), b in arb_patch()) {
                prop_assert_eq!(has_conflict(&a, &b), has_conflict(&b, &a));
            }

            #[test]
            fn test_nonempty_patch_conflicts_with_itself(a in arb_patch()) {
                prop_assert_eq!(has_conflict(&a, &a), !a.is_empty());
            }

            #[test]
            fn test_conflict_matches_range_overlap(a in arb_patch(), b in arb_patch()) {
                let overlap = a.records().iter().any(|x| {
                    b.records()
                        .iter()
                        .any(|y| x.range().start < y.range().end && y.range().start < x.range().end)
                });
                prop_assert_eq!(has_conflict(&a, &b), overlap);
            }
        }
    }
}

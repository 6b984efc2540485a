// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

//! The selector algebra (`§4.5`): a declarative description of which nodes
//! in a DAG to visit, compiled into an executable tree by [`walk`].

pub mod walk;

use crate::{Error, Ipld, PathSegment};
use std::collections::BTreeMap;
use std::ops::SubAssign;

pub use walk::{walk_all, walk_matching, LinkResolver, LastBlockInfo, Progress, VisitReason};

/// How deep an `ExploreRecursive` frame is allowed to go.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecursionLimit {
    /// No depth bound; relies on the DAG being finite (it always is — CIDs
    /// cannot express cycles).
    None,
    /// Stop once `depth` further recursions have been taken.
    Depth(u64),
}

impl RecursionLimit {
    fn is_exhausted(&self) -> bool {
        matches!(self, RecursionLimit::Depth(0))
    }
}

impl SubAssign<u64> for RecursionLimit {
    fn sub_assign(&mut self, rhs: u64) {
        if let RecursionLimit::Depth(d) = self {
            *d = d.saturating_sub(rhs);
        }
    }
}

/// The selector tree. Variants mirror the IPLD selector spec's node kinds;
/// `ExploreRecursiveEdge` is a placeholder that [`compile`] resolves back to
/// its enclosing `ExploreRecursive` frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    /// Visit the current node and stop.
    Matcher,
    /// Recurse into every list element or every map value.
    ExploreAll { next: Box<Selector> },
    /// Recurse into specific named map fields, each with its own selector.
    ExploreFields { fields: BTreeMap<String, Selector> },
    /// Recurse into a single list index.
    ExploreIndex { index: usize, next: Box<Selector> },
    /// Recurse into a contiguous range of list indices, all with `next`.
    ExploreRange {
        start: usize,
        end: usize,
        next: Box<Selector>,
    },
    /// Apply `sequence` repeatedly, substituting this frame for any nested
    /// `ExploreRecursiveEdge`, until `limit` is exhausted.
    ExploreRecursive {
        sequence: Box<Selector>,
        limit: RecursionLimit,
    },
    /// Apply every branch at the current position.
    ExploreUnion(Vec<Selector>),
    /// Resolved by the innermost enclosing `ExploreRecursive` frame.
    ExploreRecursiveEdge,
}

impl Selector {
    /// Checks that every `ExploreRecursiveEdge` is reachable inside a
    /// `ExploreRecursive` frame. Called once at compile time; the walker
    /// assumes this invariant holds and does not re-check it per visit.
    pub fn compile(self) -> Result<Selector, Error> {
        if Self::has_recursive_edge(&self, false) {
            return Err(Error::SelectorCompile(
                "ExploreRecursiveEdge outside of a recursive frame".into(),
            ));
        }
        Ok(self)
    }

    fn has_recursive_edge(selector: &Selector, inside_recursive: bool) -> bool {
        match selector {
            Selector::ExploreRecursiveEdge => !inside_recursive,
            Selector::ExploreAll { next } => Self::has_recursive_edge(next, inside_recursive),
            Selector::ExploreIndex { next, .. } => {
                Self::has_recursive_edge(next, inside_recursive)
            }
            Selector::ExploreRange { next, .. } => {
                Self::has_recursive_edge(next, inside_recursive)
            }
            Selector::ExploreFields { fields } => fields
                .values()
                .any(|s| Self::has_recursive_edge(s, inside_recursive)),
            Selector::ExploreUnion(branches) => branches
                .iter()
                .any(|s| Self::has_recursive_edge(s, inside_recursive)),
            Selector::ExploreRecursive { sequence, .. } => {
                Self::has_recursive_edge(sequence, true)
            }
            Selector::Matcher => false,
        }
    }

    /// Which child selector (and value) to explore next for a single path
    /// segment off of `node`, if this selector's shape covers it.
    fn explore(&self, node: &Ipld, segment: &PathSegment) -> Option<Selector> {
        match self {
            Selector::ExploreAll { next } => Some((**next).clone()),
            Selector::ExploreFields { fields } => match segment {
                PathSegment::String(key) => fields.get(key).cloned(),
                PathSegment::Int(i) => fields.get(&i.to_string()).cloned(),
            },
            Selector::ExploreIndex { index, next } => {
                (segment.to_index()? == *index).then(|| (**next).clone())
            }
            Selector::ExploreRange { start, end, next } => {
                let i = segment.to_index()?;
                (i >= *start && i < *end).then(|| (**next).clone())
            }
            Selector::ExploreUnion(branches) => {
                // First branch whose shape covers this segment wins; the
                // walker itself applies every matching branch (see `walk`),
                // this is only used when a union appears nested as a `next`.
                branches.iter().find_map(|b| b.explore(node, segment))
            }
            // `ExploreRecursive` is expanded by the walker before it ever
            // reaches a per-segment `explore` call (see `walk::walk_node`).
            Selector::ExploreRecursive { .. }
            | Selector::Matcher
            | Selector::ExploreRecursiveEdge => None,
        }
    }

    /// Whether this selector wants to recurse at all (as opposed to only
    /// matching the current node).
    fn interests(&self) -> bool {
        !matches!(self, Selector::Matcher)
    }

    /// One step of recursion: substitutes `ExploreRecursiveEdge` with a
    /// fresh frame whose limit has been decremented, so repeated expansion
    /// terminates under a `Depth(N)` bound.
    pub(crate) fn expand_recursive(sequence: &Selector, limit: &RecursionLimit) -> Selector {
        let mut decremented = limit.clone();
        decremented -= 1;
        let frame = Selector::ExploreRecursive {
            sequence: Box::new(sequence.clone()),
            limit: decremented,
        };
        Self::replace_recursive_edge(sequence, &frame)
    }

    fn replace_recursive_edge(selector: &Selector, frame: &Selector) -> Selector {
        match selector {
            Selector::ExploreRecursiveEdge => frame.clone(),
            Selector::ExploreAll { next } => Selector::ExploreAll {
                next: Box::new(Self::replace_recursive_edge(next, frame)),
            },
            Selector::ExploreIndex { index, next } => Selector::ExploreIndex {
                index: *index,
                next: Box::new(Self::replace_recursive_edge(next, frame)),
            },
            Selector::ExploreRange { start, end, next } => Selector::ExploreRange {
                start: *start,
                end: *end,
                next: Box::new(Self::replace_recursive_edge(next, frame)),
            },
            Selector::ExploreFields { fields } => Selector::ExploreFields {
                fields: fields
                    .iter()
                    .map(|(k, v)| (k.clone(), Self::replace_recursive_edge(v, frame)))
                    .collect(),
            },
            Selector::ExploreUnion(branches) => Selector::ExploreUnion(
                branches
                    .iter()
                    .map(|s| Self::replace_recursive_edge(s, frame))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    /// Builds an `ExploreRecursive` whose edges resolve to its own sequence,
    /// with the given depth limit.
    pub fn recursive(sequence: Selector, limit: RecursionLimit) -> Selector {
        Selector::ExploreRecursive {
            sequence: Box::new(sequence),
            limit,
        }
    }

    /// The UnixFS-aware default selector: a `Matcher` at every node,
    /// recursing through `Links` fields, capped at the depth named in
    /// `§9`'s design notes so that a malformed DAG cannot run away.
    pub fn unixfs_default() -> Selector {
        const DEFAULT_DEPTH: u64 = 50;
        Selector::recursive(
            Selector::ExploreUnion(vec![
                Selector::Matcher,
                Selector::ExploreFields {
                    fields: BTreeMap::from([(
                        "Links".to_string(),
                        Selector::ExploreAll {
                            next: Box::new(Selector::ExploreFields {
                                fields: BTreeMap::from([(
                                    "Hash".to_string(),
                                    Selector::ExploreRecursiveEdge,
                                )]),
                            }),
                        },
                    )]),
                },
            ]),
            RecursionLimit::Depth(DEFAULT_DEPTH),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recursive_edge_outside_frame_fails_to_compile() {
        assert!(Selector::ExploreRecursiveEdge.compile().is_err());
    }

    #[test]
    fn recursive_edge_inside_frame_compiles() {
        let selector = Selector::recursive(Selector::Matcher, RecursionLimit::None);
        assert!(selector.compile().is_ok());
    }

    #[test]
    fn depth_limit_counts_down() {
        let mut limit = RecursionLimit::Depth(2);
        limit -= 1;
        assert_eq!(limit, RecursionLimit::Depth(1));
        limit -= 5;
        assert_eq!(limit, RecursionLimit::Depth(0));
        assert!(limit.is_exhausted());
    }
}

// Copyright 2019-2026 ipld-store contributors
// SPDX-License-Identifier: Apache-2.0, MIT

use super::PathSegment;
use std::fmt;

/// Describes a series of steps across a DAG of Ipld, where each segment is a
/// map key or list index. Used to report traversal progress (`§4.5`).
#[derive(Debug, PartialEq, Default, Clone)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn extend(&mut self, other: &Path) {
        self.segments.extend_from_slice(&other.segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn push(&mut self, seg: PathSegment) {
        self.segments.push(seg)
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }
}

impl From<&str> for Path {
    fn from(s: &str) -> Self {
        let segments: Vec<PathSegment> = s
            .split('/')
            .filter(|s| !s.is_empty())
            .map(PathSegment::from)
            .collect();
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.segments.is_empty() {
            return Ok(());
        }
        write!(f, "{}", self.segments[0])?;
        for v in &self.segments[1..] {
            write!(f, "/{}", v)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PathSegment::*;

    #[test]
    fn path_with_extra_delimiters() {
        let path: Path = "/12/some///1/5.5/".into();
        assert_eq!(
            path.segments,
            vec![
                Int(12),
                String("some".to_owned()),
                Int(1),
                String("5.5".to_owned())
            ]
        );
        assert_eq!(path.to_string(), "12/some/1/5.5")
    }
}

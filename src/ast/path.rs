use std::{fmt, sync::Arc};

#[derive(Debug, PartialEq, Eq, Hash)]
struct Segments {
    full: String,
    parts: Vec<String>,
}

/// A dotted name such as `query.anim_time`, viewed as a chain of segments.
///
/// Every `Path` derived from one input shares the same segment list, so
/// stepping to [`Path::next`] is a cheap clone. [`Path::value`] is the segment
/// this link points at, and [`Path::root`] always returns the first link.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Arc<Segments>,
    index: usize,
}

impl Path {
    /// Splits `text` on `.`. Parsing stops at the first empty segment, so
    /// `a..b` and `a.` both yield just `a`.
    pub fn new(text: &str) -> Self {
        let mut parts: Vec<String> = Vec::new();
        for (i, segment) in text.split('.').enumerate() {
            if i > 0 && segment.trim().is_empty() {
                break;
            }
            parts.push(segment.to_string());
        }
        Self::from_parts(parts)
    }

    fn from_parts(parts: Vec<String>) -> Self {
        Path {
            segments: Arc::new(Segments {
                full: parts.join("."),
                parts,
            }),
            index: 0,
        }
    }

    /// Rewrites the shorthand root aliases (`q`, `v`, `t`, `c`).
    pub fn expand_aliases(self) -> Self {
        let expanded = match self.segments.parts[0].as_str() {
            "q" => "query",
            "v" => "variable",
            "t" => "temp",
            "c" => "context",
            _ => return self,
        };
        let mut parts = self.segments.parts.clone();
        parts[0] = expanded.to_string();
        Self::from_parts(parts)
    }

    /// The segment this link refers to.
    pub fn value(&self) -> &str {
        &self.segments.parts[self.index]
    }

    /// The remainder of the chain, or `None` on the last segment.
    pub fn next(&self) -> Option<Path> {
        if self.has_children() {
            Some(Path {
                segments: Arc::clone(&self.segments),
                index: self.index + 1,
            })
        } else {
            None
        }
    }

    pub fn has_children(&self) -> bool {
        self.index + 1 < self.segments.parts.len()
    }

    pub fn root(&self) -> Path {
        Path {
            segments: Arc::clone(&self.segments),
            index: 0,
        }
    }

    /// The full dotted text of the chain this link belongs to.
    pub fn full(&self) -> &str {
        &self.segments.full
    }

    /// Remaining segments from this link on, joined with dots.
    pub fn remaining(&self) -> String {
        self.segments.parts[self.index..].join(".")
    }

    /// A new chain with `segment` appended after the last segment.
    pub fn join(&self, segment: &str) -> Path {
        let mut parts = self.segments.parts[self.index..].to_vec();
        parts.push(segment.to_string());
        Self::from_parts(parts)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full())
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path({:?} @ {})", self.full(), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_into_linked_segments() {
        let path = Path::new("a.b.c");
        assert_eq!(path.value(), "a");
        let b = path.next().unwrap();
        assert_eq!(b.value(), "b");
        let c = b.next().unwrap();
        assert_eq!(c.value(), "c");
        assert!(c.next().is_none());
        assert_eq!(c.root().value(), "a");
        assert_eq!(c.full(), "a.b.c");
    }

    #[test]
    fn stops_at_empty_segment() {
        assert_eq!(Path::new("a..b").full(), "a");
        assert_eq!(Path::new("a.").full(), "a");
    }

    #[test]
    fn expands_root_aliases() {
        assert_eq!(Path::new("v.foo").expand_aliases().full(), "variable.foo");
        assert_eq!(Path::new("q.life_time").expand_aliases().full(), "query.life_time");
        assert_eq!(Path::new("t.x").expand_aliases().value(), "temp");
        assert_eq!(Path::new("c.item").expand_aliases().value(), "context");
        assert_eq!(Path::new("math.sin").expand_aliases().full(), "math.sin");
        // Only the root segment is rewritten
        assert_eq!(Path::new("variable.v").expand_aliases().full(), "variable.v");
    }

    #[test]
    fn join_appends_from_current_link() {
        let path = Path::new("array.items");
        assert_eq!(path.join("2").full(), "array.items.2");
        assert_eq!(path.next().unwrap().remaining(), "items");
    }
}

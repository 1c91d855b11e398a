//! Comparison output types.

use serde::{Serialize, Serializer};
use std::fmt;

/// Default bound on container nesting entered by the comparator.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// One step in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Location of a comparison inside the documents.
///
/// Rendered dotted: `.tags.key1`, `.list.2`; the root renders as `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The empty path, rendered as `""`
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Child path for an object key
    pub fn key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.to_string()));
        Self(segments)
    }

    /// Child path for an array index
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// Segments from the root outward
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// True for the document root
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments
    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            match segment {
                Segment::Key(k) => write!(f, ".{}", k)?,
                Segment::Index(i) => write!(f, ".{}", i)?,
            }
        }
        Ok(())
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Classification of a comparison violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// An expected key is absent from the observed object
    MissingKey,
    /// Shapes disagree, or a non-scalar reached the scalar resolver
    SchemaMismatch,
    /// Scalars are not equivalent
    ValueMismatch,
    /// Array lengths differ
    SizeMismatch,
    /// An encoded JSON document failed to parse
    MalformedJson,
    /// Nesting exceeded the configured maximum depth
    DepthExceeded,
}

impl ViolationKind {
    /// Stable code for programmatic matching
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::MissingKey => "VIOLATION_MISSING_KEY",
            ViolationKind::SchemaMismatch => "VIOLATION_SCHEMA_MISMATCH",
            ViolationKind::ValueMismatch => "VIOLATION_VALUE_MISMATCH",
            ViolationKind::SizeMismatch => "VIOLATION_SIZE_MISMATCH",
            ViolationKind::MalformedJson => "VIOLATION_MALFORMED_JSON",
            ViolationKind::DepthExceeded => "VIOLATION_DEPTH_EXCEEDED",
        }
    }
}

/// The first violation found by a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub path: Path,
    /// Human-readable detail, without the path prefix
    pub reason: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, path: Path, reason: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            reason: reason.into(),
        }
    }
}

/// `path=[<path>] <reason>`; this is the annotation forwarded to reporting.
impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "path=[{}] {}", self.path, self.reason)
    }
}

/// Outcome of comparing an observed document against its baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Compliant,
    NonCompliant(Violation),
}

impl Verdict {
    pub fn is_compliant(&self) -> bool {
        matches!(self, Verdict::Compliant)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Verdict::Compliant => None,
            Verdict::NonCompliant(v) => Some(v),
        }
    }

    /// Annotation text: empty when compliant
    pub fn annotation(&self) -> String {
        self.violation().map(|v| v.to_string()).unwrap_or_default()
    }
}

/// Comparator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompareOptions {
    /// Maximum container nesting before `DepthExceeded` is reported
    pub max_depth: usize,
    /// Trace every visited node at debug level; never changes the verdict
    pub verbose: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            verbose: false,
        }
    }
}

use crate::scan::Termination;

/// A file and how many matched pull requests touched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotspot {
    pub filename: String,
    pub pulls: usize,
}

/// What gets printed to the terminal once the document is written.
#[derive(Debug)]
pub struct Summary {
    /// "owner/repo"
    pub repository: String,
    pub termination: Termination,
    pub pages_fetched: u32,
    pub pulls_matched: usize,
    /// Decorated file records pulled, before grouping
    pub files_pulled: usize,
    /// Distinct filenames in the document
    pub files_touched: usize,
    /// Most touched files first
    pub hotspots: Vec<Hotspot>,
}

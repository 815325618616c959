use serde::Serialize;

/// Diagnostic counters for a first scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub regions_visited: usize,
    pub regions_skipped: usize,
    pub chunks_scanned: usize,
    pub read_errors: usize,
    pub partial_reads: usize,
    pub matches_found: usize,
}

/// Diagnostic counters for a refine pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefineStats {
    pub addresses_checked: usize,
    pub matches_found: usize,
    pub read_errors: usize,
    pub partial_reads: usize,
}

use std::ops::RangeInclusive;
use tracing::debug;

/// Years that print as exactly four digits
pub const YEARS: RangeInclusive<i32> = 1000..=9999;

/// "HO" + 2024 -> "HO2024"
pub fn reference_prefix(branch_code: &str, year: i32) -> String {
    format!("{}{:04}", branch_code.trim().to_uppercase(), year)
}

/// Next reference number for a branch and year, e.g. "HO20240007".
/// Scans the given references for the highest sequence under the same prefix.
pub fn next_reference_number(branch_code: &str, year: i32, existing: &[String]) -> String {
    let prefix = reference_prefix(branch_code, year);

    let max_seq = existing
        .iter()
        .filter_map(|reference| reference.strip_prefix(&prefix))
        .filter_map(|suffix| suffix.parse::<u32>().ok())
        .filter(|seq| *seq > 0)
        .max()
        .unwrap_or(0);

    let next = format!("{}{:04}", prefix, max_seq.saturating_add(1));
    debug!(%prefix, max_seq, %next, "sequenced reference");
    next
}

/// Split a stored reference into (year, sequence) for the given branch.
/// None unless it is exactly what the sequencer would print for those parts,
/// so "HO202400001" or "HO2024+1" never pass as sequence 1.
pub fn parse_reference(reference: &str, branch_code: &str) -> Option<(i32, u32)> {
    let branch = branch_code.trim().to_uppercase();
    let rest = reference.strip_prefix(branch.as_str())?;
    let year = rest.get(..4)?.parse::<i32>().ok().filter(|y| YEARS.contains(y))?;
    let seq = rest.get(4..)?.parse::<u32>().ok().filter(|seq| *seq > 0)?;

    let canonical = format!("{}{:04}", reference_prefix(&branch, year), seq);
    (canonical == reference).then_some((year, seq))
}

use serde::{Deserialize, Serialize};

use crate::game::{MAX_BOXES, MAX_SIZE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapStats {
    pub boxes: usize,
    pub goals: usize,
    pub player: usize,
}

/// Advisory verdict on a map. Problems are reported, never raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub message: String,
    pub stats: MapStats,
}

/// Split a single-map file into rows. Blank lines before and after the map
/// are dropped; blank lines inside it are kept as empty rows.
pub fn map_rows(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    let is_blank = |line: &&str| line.trim().is_empty();
    let start = lines.iter().position(|line| !is_blank(line)).unwrap_or(lines.len());
    let end = lines.iter().rposition(|line| !is_blank(line)).map_or(start, |end| end + 1);
    lines[start..end].iter().map(|line| line.to_string()).collect()
}

/// Check a raw map before it is handed to the solver: exactly one player, at
/// least one box and one goal, only known symbols, and a board the engine can
/// hold.
pub fn validate_map<S: AsRef<str>>(rows: &[S]) -> ValidationReport {
    let mut stats = MapStats::default();
    let mut unknown: Vec<char> = Vec::new();

    for row in rows {
        for ch in row.as_ref().chars() {
            match ch {
                '@' => stats.player += 1,
                '+' => {
                    stats.player += 1;
                    stats.goals += 1;
                }
                '$' => stats.boxes += 1,
                '*' => {
                    stats.boxes += 1;
                    stats.goals += 1;
                }
                '.' => stats.goals += 1,
                '#' | ' ' => {}
                other => {
                    if !unknown.contains(&other) {
                        unknown.push(other);
                    }
                }
            }
        }
    }

    let mut errors = Vec::new();
    if rows.is_empty() {
        errors.push("No map provided".to_string());
    }
    if !unknown.is_empty() {
        let symbols: Vec<String> = unknown.iter().map(|ch| format!("'{}'", ch)).collect();
        errors.push(format!("Unknown symbols: {}", symbols.join(", ")));
    }
    if stats.player != 1 {
        errors.push(format!(
            "Must have exactly 1 player (found {})",
            stats.player
        ));
    }
    if stats.boxes == 0 {
        errors.push("Must have at least 1 box".to_string());
    }
    if stats.goals == 0 {
        errors.push("Must have at least 1 goal".to_string());
    }

    let width = rows
        .iter()
        .map(|row| row.as_ref().chars().count())
        .max()
        .unwrap_or(0);
    if width > MAX_SIZE || rows.len() > MAX_SIZE {
        errors.push(format!(
            "Map is {}x{}, larger than the {}x{} maximum",
            width,
            rows.len(),
            MAX_SIZE,
            MAX_SIZE
        ));
    }
    if stats.boxes > MAX_BOXES {
        errors.push(format!(
            "Map has {} boxes, more than the maximum of {}",
            stats.boxes, MAX_BOXES
        ));
    }

    if errors.is_empty() {
        ValidationReport {
            valid: true,
            message: "Map is valid".to_string(),
            stats,
        }
    } else {
        ValidationReport {
            valid: false,
            message: errors.join("; "),
            stats,
        }
    }
}

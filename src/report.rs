//! Plain-text renderings for the terminal.

use std::fmt::Write;

use crate::pairing::{Matching, ScoreTable};
use crate::schedule::{Day, Highlight, OverlapResult, SlotCatalog, WeeklyAvailability};

const CELL_WIDTH: usize = 5;

/// One row per slot, one column per day; `#` marks a selection.
pub fn week_grid(availability: &WeeklyAvailability) -> String {
    grid(availability.catalog(), |day, index| {
        if availability.is_selected_index(day, index) {
            '#'
        } else {
            '.'
        }
    })
}

/// Two schedules overlaid: `a`/`b` for one party only, `#` for both.
pub fn overlap_grid(catalog: &SlotCatalog, result: &OverlapResult) -> String {
    grid(catalog, |day, index| match result.highlight(day, index) {
        Highlight::None => '.',
        Highlight::OnlyA => 'a',
        Highlight::OnlyB => 'b',
        Highlight::Both => '#',
    })
}

fn grid(catalog: &SlotCatalog, mark: impl Fn(Day, usize) -> char) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:>CELL_WIDTH$}", "");
    for day in Day::ALL {
        let _ = write!(out, "{:>CELL_WIDTH$}", day.as_str());
    }
    out.push('\n');

    for (index, slot) in catalog.slots_for_day().iter().enumerate() {
        let _ = write!(out, "{:>CELL_WIDTH$}", slot.label());
        for day in Day::ALL {
            let _ = write!(out, "{:>CELL_WIDTH$}", mark(day, index));
        }
        out.push('\n');
    }
    out
}

/// Lower-triangle table of pairwise overlap scores.
pub fn overlap_table(names: &[String], table: &ScoreTable) -> String {
    let labels: Vec<String> = (0..table.len())
        .map(|i| format!("{i} {}", names.get(i).map(String::as_str).unwrap_or("?")))
        .collect();
    let width = labels.iter().map(String::len).max().unwrap_or(0) + 2;
    let mut out = String::new();

    let _ = write!(out, "{:width$}", "");
    for j in 0..table.len() {
        let _ = write!(out, "{j:>6}");
    }
    out.push('\n');

    for (i, label) in labels.iter().enumerate() {
        let _ = write!(out, "{label:width$}");
        for j in 0..i {
            let _ = write!(out, "{:>6}", table.get(i, j));
        }
        out.push('\n');
    }
    out
}

/// Pairs with their scores; the weakest pair is starred.
pub fn matching_summary(names: &[String], matching: &Matching, table: &ScoreTable) -> String {
    let name = |i: usize| names.get(i).map(String::as_str).unwrap_or("?");
    let score = matching.score(table);
    let mut out = String::new();

    for (i, j) in matching.pairs() {
        let marker = if score.lowest_pair == Some((i, j)) { " **" } else { "" };
        let _ = writeln!(out, "{} with {} ({}){}", name(i), name(j), table.get(i, j), marker);
    }
    for solo in matching.unpaired() {
        let _ = writeln!(out, "unmatched:  {}", name(solo));
    }
    let _ = writeln!(out, "score: {}", score.total);
    if let Some(lowest) = score.lowest {
        let _ = writeln!(out, "lowest: {lowest}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::matching_greedy;
    use crate::schedule::WeeklyPayload;
    use std::sync::Arc;

    #[test]
    fn grid_marks_selected_cells() {
        let catalog = SlotCatalog::from_labels(&["900", "930"]).unwrap();
        let mut availability = WeeklyAvailability::new(Arc::new(catalog));
        availability.select_named("Mon", "930").unwrap();

        let text = week_grid(&availability);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Sun") && lines[0].contains("Sat"));
        assert_eq!(lines[1].matches('#').count(), 0);
        assert_eq!(lines[2].matches('#').count(), 1);
    }

    #[test]
    fn overlap_grid_uses_three_marks() {
        let catalog = SlotCatalog::from_labels(&["900", "930", "1000"]).unwrap();
        let mut a = WeeklyPayload::default();
        let mut b = WeeklyPayload::default();
        a.set(Day::Mon, 0b011);
        b.set(Day::Mon, 0b110);
        let text = overlap_grid(&catalog, &OverlapResult::compute(a, b));
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains('a'));
        assert!(lines[2].contains('#'));
        assert!(lines[3].contains('b'));
    }

    #[test]
    fn summary_stars_the_weakest_pair() {
        let mut strong = WeeklyPayload::default();
        strong.set(Day::Tue, 0b1111);
        let mut weak = WeeklyPayload::default();
        weak.set(Day::Tue, 0b11);
        let table = ScoreTable::build(&[strong, strong, weak, weak]);
        let names: Vec<String> = ["Ann", "Bo", "Cy", "Di"].iter().map(|s| s.to_string()).collect();

        let summary = matching_summary(&names, &matching_greedy(&table), &table);
        assert!(summary.contains("Ann with Bo (3)\n"));
        assert!(summary.contains("Cy with Di (1) **"));
        assert!(summary.contains("score: 5"));

        let table_text = overlap_table(&names, &table);
        assert_eq!(table_text.lines().count(), 5);
    }
}

//! Plain-text rendering of list views.

use std::fmt::Write;

use milestones_core::{ListView, RowView};

/// Characters of the id shown in list output; enough for prefix lookups.
pub const SHORT_ID_LEN: usize = 8;

pub fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{text}{}", " ".repeat(width.saturating_sub(len)))
}

fn write_row(out: &mut String, row: &RowView, title_width: usize) {
    let _ = writeln!(
        out,
        "  {}  {}  {}  {}",
        short_id(&row.id),
        pad(&row.title, title_width),
        row.target,
        row.countdown
    );
    if !row.notes.is_empty() {
        let indent = " ".repeat(SHORT_ID_LEN + 4);
        let _ = writeln!(out, "{indent}{}", row.notes);
    }
}

pub fn render_list(view: &ListView) -> String {
    let mut out = String::new();
    match view {
        ListView::Empty { placeholder } => {
            let _ = writeln!(out, "{placeholder}");
        }
        ListView::Sections { sections } => {
            let title_width = sections
                .iter()
                .flat_map(|s| &s.rows)
                .map(|r| r.title.chars().count())
                .max()
                .unwrap_or(0);
            for (i, section) in sections.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                let _ = writeln!(out, "{}", section.label);
                for row in &section.rows {
                    write_row(&mut out, row, title_width);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use milestones_core::SectionView;

    fn row(id: &str, title: &str, notes: &str) -> RowView {
        RowView {
            id: id.into(),
            title: title.into(),
            target: "2024-01-01 10:00".into(),
            countdown: "00d 01h 00m 00s".into(),
            notes: notes.into(),
        }
    }

    #[test]
    fn placeholder_for_empty_view() {
        let view = ListView::Empty {
            placeholder: "Nothing here".into(),
        };
        assert_eq!(render_list(&view), "Nothing here\n");
    }

    #[test]
    fn sections_with_aligned_titles() {
        let view = ListView::Sections {
            sections: vec![SectionView {
                label: "Today".into(),
                rows: vec![
                    row("0123456789ab", "Gym", ""),
                    row("abcdef012345", "Airport", "passport"),
                ],
            }],
        };
        let text = render_list(&view);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Today");
        assert_eq!(lines[1], "  01234567  Gym      2024-01-01 10:00  00d 01h 00m 00s");
        assert_eq!(lines[2], "  abcdef01  Airport  2024-01-01 10:00  00d 01h 00m 00s");
        assert_eq!(lines[3], "            passport");
    }

    #[test]
    fn short_id_tolerates_short_input() {
        assert_eq!(short_id("abc"), "abc");
    }
}

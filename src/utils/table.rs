use console::measure_text_width;

/// Renders tabular rows to text.
pub trait TableRenderer {
    fn render(&self, headers: &[&str], rows: &[Vec<String>]) -> String;
}

/// Left-aligned columns padded to their widest cell, with a dashed rule under
/// the header. Cell widths ignore ANSI escapes, so cells may be pre-coloured.
#[derive(Debug, Clone)]
pub struct PlainTable {
    pub gap: usize,
}

impl Default for PlainTable {
    fn default() -> Self {
        Self { gap: 2 }
    }
}

impl PlainTable {
    fn widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
        let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
        for row in rows {
            for (i, cell) in row.iter().enumerate() {
                let width = measure_text_width(cell);
                match widths.get_mut(i) {
                    Some(w) => *w = (*w).max(width),
                    None => widths.push(width),
                }
            }
        }
        widths
    }

    fn push_line<S: AsRef<str>>(&self, out: &mut String, cells: &[S], widths: &[usize]) {
        let mut line = String::new();
        for (i, width) in widths.iter().enumerate() {
            let cell = cells.get(i).map(AsRef::as_ref).unwrap_or("");
            line.push_str(cell);
            if i + 1 < widths.len() {
                let pad = width.saturating_sub(measure_text_width(cell)) + self.gap;
                line.extend(std::iter::repeat(' ').take(pad));
            }
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
}

impl TableRenderer for PlainTable {
    fn render(&self, headers: &[&str], rows: &[Vec<String>]) -> String {
        let widths = Self::widths(headers, rows);
        let mut out = String::new();

        self.push_line(&mut out, headers, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        self.push_line(&mut out, &rule, &widths);
        for row in rows {
            self.push_line(&mut out, row, &widths);
        }
        out
    }
}

/// Two-column `label: value` listing, labels padded to the longest.
pub fn key_values(pairs: &[(String, String)]) -> String {
    let width = pairs
        .iter()
        .map(|(k, _)| measure_text_width(k))
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for (key, value) in pairs {
        let pad = width - measure_text_width(key);
        out.push_str(&format!("{}:{} {}\n", key, " ".repeat(pad), value));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::style::Palette;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn columns_are_aligned() {
        let rendered = PlainTable::default().render(
            &["ID", "Name", "Status"],
            &[row(&["n-1", "Budget Buddy", "active"]), row(&["n-22", "Quiz", "offline"])],
        );
        let expected = "\
ID    Name          Status
----  ------------  -------
n-1   Budget Buddy  active
n-22  Quiz          offline
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn colored_cells_do_not_break_alignment() {
        let palette = Palette::colored();
        let rendered = PlainTable::default().render(
            &["Status", "Name"],
            &[row(&[&palette.status("active"), "a"]), row(&["idle", "b"])],
        );
        let plain = console::strip_ansi_codes(&rendered);
        let lines: Vec<&str> = plain.lines().collect();
        assert_eq!(lines[2], "● active  a");
        assert_eq!(lines[3], "idle      b");
    }

    #[test]
    fn short_rows_are_padded_and_empty_tables_keep_headers() {
        let rendered = PlainTable { gap: 1 }.render(&["A", "B"], &[row(&["x"])]);
        assert_eq!(rendered, "A B\n- -\nx\n");

        let empty = PlainTable::default().render(&["Only"], &[]);
        assert_eq!(empty, "Only\n----\n");
    }

    #[test]
    fn key_values_align_labels() {
        let text = key_values(&[
            ("URL".to_string(), "http://localhost:5000".to_string()),
            ("Timeout".to_string(), "30000 ms".to_string()),
        ]);
        assert_eq!(text, "URL:     http://localhost:5000\nTimeout: 30000 ms\n");
    }
}

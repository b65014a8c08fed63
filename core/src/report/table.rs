#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

/// Render a markdown table with padded columns.
///
/// Columns without an entry in `align` are left-aligned. Cells of rows shorter than
/// `header` are left empty.
pub fn markdown_table<S: AsRef<str>>(header: &[&str], rows: &[Vec<S>], align: &[Align]) -> Vec<String> {
    let cols = header.len();
    let cell = |row: &[S], i: usize| row.get(i).map_or("", |c| c.as_ref()).to_owned();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count().max(3)).collect();
    for row in rows {
        for (i, w) in widths.iter_mut().enumerate() {
            *w = (*w).max(cell(row.as_slice(), i).chars().count());
        }
    }

    let align_of = |i: usize| align.get(i).copied().unwrap_or(Align::Left);
    let pad = |s: &str, i: usize| {
        let (w, n) = (widths[i], s.chars().count());
        let fill = w.saturating_sub(n);
        match align_of(i) {
            Align::Left => format!("{}{}", s, " ".repeat(fill)),
            Align::Right => format!("{}{}", " ".repeat(fill), s),
            Align::Center => {
                let l = fill / 2;
                format!("{}{}{}", " ".repeat(l), s, " ".repeat(fill - l))
            }
        }
    };
    let format_row = |cells: Vec<String>| format!("| {} |", cells.join(" | "));

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(format_row((0..cols).map(|i| pad(header[i], i)).collect()));
    out.push(format_row(
        (0..cols)
            .map(|i| {
                let dashes = "-".repeat(widths[i].saturating_sub(1));
                match align_of(i) {
                    Align::Left => format!(":{}", dashes),
                    Align::Right => format!("{}:", dashes),
                    Align::Center => format!(":{}:", &dashes[1..]),
                }
            })
            .collect(),
    ));
    for row in rows {
        out.push(format_row((0..cols).map(|i| pad(cell(row.as_slice(), i).as_str(), i)).collect()));
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pads_and_aligns_columns() {
        let rows = vec![
            vec!["1".to_owned(), "0".to_owned(), "14".to_owned()],
            vec!["2".to_owned(), "100".to_owned(), "3".to_owned()],
        ];
        let t = markdown_table(
            &["pid", "arrival", "burst"],
            &rows,
            &[Align::Right, Align::Right, Align::Left],
        );
        assert_eq!(
            t,
            [
                "| pid | arrival | burst |",
                "| --: | ------: | :---- |",
                "|   1 |       0 | 14    |",
                "|   2 |     100 | 3     |",
            ]
        );
    }

    #[test]
    fn centered_and_short_rows() {
        let rows = vec![vec!["a"]];
        let t = markdown_table(&["x", "yy"], &rows, &[Align::Center]);
        assert_eq!(t, ["|  x  | yy  |", "| :-: | :-- |", "|  a  |     |"]);
    }
}

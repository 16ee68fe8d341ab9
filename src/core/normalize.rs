use crate::domain::model::Table;

/// Trims a header and title-cases it: a letter following a non-letter is
/// uppercased, every other letter lowercased.
pub fn normalize_column_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut previous_is_letter = false;

    for ch in name.trim().chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(ch);
            previous_is_letter = false;
        }
    }

    out
}

pub fn normalize_table(table: Table) -> Table {
    table.map_columns(|name| normalize_column_name(name))
}

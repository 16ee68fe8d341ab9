use crate::domain::model::{ClassifiedTable, GroupAggregate, GroupFilter};
use crate::utils::error::{DashboardError, Result};

/// Values offered by the filter control, after the implicit `All`.
pub fn filter_options(groups: &GroupAggregate) -> Vec<String> {
    groups.groups().map(str::to_string).collect()
}

/// Pins a requested selection to one of `options`.
///
/// An exact option wins, then an option equal after trimming both sides.
/// Otherwise `all` in any case means everything, and any other value is kept
/// trimmed (it will select no rows).
pub fn resolve_selection(selection: &GroupFilter, options: &[String]) -> GroupFilter {
    let requested = match selection {
        GroupFilter::All => return GroupFilter::All,
        GroupFilter::Group(value) => value,
    };

    if options.iter().any(|option| option == requested) {
        return selection.clone();
    }

    let trimmed = requested.trim();
    if let Some(option) = options.iter().find(|option| option.trim() == trimmed) {
        return GroupFilter::Group(option.clone());
    }

    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(GroupFilter::ALL_LABEL) {
        GroupFilter::All
    } else {
        GroupFilter::Group(trimmed.to_string())
    }
}

/// Rows of `table` visible under `selection`.
///
/// Selecting a group when the grouping column is missing is an error; a
/// group value nobody has just yields an empty view.
pub fn apply_filter(
    table: &ClassifiedTable,
    group_field: &str,
    selection: &GroupFilter,
) -> Result<ClassifiedTable> {
    let wanted = match selection {
        GroupFilter::All => return Ok(table.clone()),
        GroupFilter::Group(value) => value,
    };

    let index = table.table().column_index(group_field).ok_or_else(|| {
        DashboardError::ValidationError {
            message: format!(
                "cannot filter by {} '{}': the sheet has no '{}' column",
                group_field, wanted, group_field
            ),
        }
    })?;

    let view = table.filtered(|row| {
        row.get(index)
            .map(|value| value.as_text() == wanted.as_str())
            .unwrap_or(false)
    });

    if view.is_empty() {
        tracing::warn!("No rows match {} '{}'", group_field, wanted);
    }

    Ok(view)
}

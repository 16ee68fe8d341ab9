use crate::domain::model::{Dashboard, GroupFilter};

const MAX_CELL_WIDTH: usize = 28;
const BAR_WIDTH: usize = 40;

/// Plain-text dashboard: metrics, filter, table and the per-group bar chart.
pub fn render_dashboard(dashboard: &Dashboard) -> String {
    let heading = format!("🏨 {}", dashboard.title);
    let underline = "=".repeat(heading.chars().count());
    let mut lines = vec![heading, underline, String::new()];

    let summary = &dashboard.summary;
    lines.push(format!(
        "Total Rooms: {}    Booked: {}    Available: {}",
        summary.total_rooms, summary.booked_rooms, summary.available_rooms
    ));
    lines.push(String::new());

    let mut options = vec![GroupFilter::ALL_LABEL.to_string()];
    options.extend(dashboard.filter_options.iter().cloned());
    lines.push(format!(
        "Filter by {}: {}  [{}]",
        dashboard.group_field,
        dashboard.selection,
        options.join(", ")
    ));
    lines.push(String::new());

    lines.extend(render_table(dashboard));

    if dashboard.grouping_available && !dashboard.groups.is_empty() {
        lines.push(String::new());
        lines.push(format!("Bookings per {}", dashboard.group_field));
        lines.extend(render_chart(dashboard));
    }

    lines.push(String::new());
    lines.push(format!(
        "Live data from {} • refreshed {}",
        dashboard.source,
        dashboard.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_no_data(title: &str, source: &str) -> String {
    format!("🏨 {}\n\nNo booking data found in {}.\n", title, source)
}

fn clip(text: &str) -> String {
    if text.chars().count() <= MAX_CELL_WIDTH {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(MAX_CELL_WIDTH - 1).collect();
        clipped.push('…');
        clipped
    }
}

fn render_table(dashboard: &Dashboard) -> Vec<String> {
    let table = dashboard.view.table();
    if table.is_empty() {
        return vec!["(no rows)".to_string()];
    }

    let header: Vec<String> = table.columns().iter().map(|c| clip(c)).collect();
    let body: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.cells.iter().map(|cell| clip(&cell.as_text())).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let separator = widths
        .iter()
        .map(|&w| "-".repeat(w))
        .collect::<Vec<_>>()
        .join("-+-");

    let mut lines = vec![line(header.as_slice()), separator];
    lines.extend(body.iter().map(|row| line(row.as_slice())));
    lines
}

fn render_chart(dashboard: &Dashboard) -> Vec<String> {
    let max = dashboard.groups.iter().map(|(_, n)| n).max().unwrap_or(0);
    let label_width = dashboard
        .groups
        .groups()
        .map(|g| g.chars().count())
        .max()
        .unwrap_or(0);

    dashboard
        .groups
        .iter()
        .map(|(group, count)| {
            let bar = if max == 0 { 0 } else { count * BAR_WIDTH / max };
            let pad = label_width - group.chars().count();
            format!(
                "{}{} | {} {}",
                group,
                " ".repeat(pad),
                "█".repeat(bar),
                count
            )
        })
        .collect()
}

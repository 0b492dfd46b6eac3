use colored::Colorize;

use crate::filter::StatusFilter;
use crate::pagination;
use crate::record::Record;
use crate::state::{Listing, Screen};

pub const LOADING_MESSAGE: &str = "Loading food trucks...";

pub struct Column {
    pub label: &'static str,
    pub width: usize,
    pub value: fn(&Record) -> &str,
}

fn applicant(record: &Record) -> &str {
    record.applicant.as_deref().unwrap_or_default()
}

fn facility_type(record: &Record) -> &str {
    &record.facility_type
}

fn food_items(record: &Record) -> &str {
    &record.food_items
}

fn address(record: &Record) -> &str {
    record.address.as_deref().unwrap_or_default()
}

fn status(record: &Record) -> &str {
    record.status.as_deref().unwrap_or_default()
}

fn permit(record: &Record) -> &str {
    &record.permit
}

/// Table layout, in display order.
pub const COLUMNS: [Column; 6] = [
    Column {
        label: "Applicant",
        width: 28,
        value: applicant,
    },
    Column {
        label: "Facility Type",
        width: 13,
        value: facility_type,
    },
    Column {
        label: "Food Items",
        width: 36,
        value: food_items,
    },
    Column {
        label: "Address",
        width: 26,
        value: address,
    },
    Column {
        label: "Status",
        width: 10,
        value: status,
    },
    Column {
        label: "Permit",
        width: 11,
        value: permit,
    },
];

const COLUMN_GAP: &str = "  ";

/// Cuts `value` to `width` characters, marking the cut with an ellipsis, and
/// pads it to exactly `width`.
pub fn fit(value: &str, width: usize) -> String {
    let value = value.trim();
    let count = value.chars().count();
    if count <= width {
        return format!("{value:<width$}");
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn table_width() -> usize {
    COLUMNS.iter().map(|c| c.width).sum::<usize>() + COLUMN_GAP.len() * (COLUMNS.len() - 1)
}

pub fn render_row(record: &Record) -> String {
    COLUMNS
        .iter()
        .map(|c| fit((c.value)(record), c.width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP)
        .trim_end()
        .to_string()
}

fn render_header() -> String {
    let header = COLUMNS
        .iter()
        .map(|c| fit(c.label, c.width))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    format!(
        "{}\n{}",
        header.trim_end().bold().white(),
        "-".repeat(table_width()).dimmed()
    )
}

/// Every status choice in offer order, the selected one bracketed.
pub fn render_status_choices(selected: StatusFilter) -> String {
    StatusFilter::CHOICES
        .iter()
        .map(|&choice| {
            if choice == selected {
                format!("[{}]", choice.label()).bold().cyan().to_string()
            } else {
                choice.label().dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_control(label: &str, enabled: bool) -> String {
    let control = format!("[{label}]");
    if enabled {
        control.bold().cyan().to_string()
    } else {
        control.dimmed().to_string()
    }
}

fn render_page_strip(total_pages: usize, current: usize) -> String {
    pagination::page_window(total_pages, current)
        .into_iter()
        .map(|page| match page {
            Some(p) if p == current => format!("[{p}]").bold().to_string(),
            Some(p) => p.to_string(),
            None => "…".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render_loading() -> String {
    LOADING_MESSAGE.to_string()
}

pub fn render_error(message: &str) -> String {
    format!(
        "{}\n{} type {} to try again, {} to exit",
        message.bold().red(),
        "[Reload]".bold().cyan(),
        "reload".bold(),
        "quit".bold()
    )
}

pub fn render_listing(listing: &Listing<'_>, search_pending: bool) -> String {
    let query = listing.query;
    let page = listing.page();
    let mut out = String::new();

    let search = if query.raw_search.is_empty() {
        query.search_field.placeholder().dimmed().to_string()
    } else {
        query.raw_search.bold().to_string()
    };
    out.push_str(&format!(
        "{} [{}]: {}",
        "Search".bold().white(),
        query.search_field.label().cyan(),
        search
    ));
    if search_pending {
        out.push_str(&format!(" {}", "…".dimmed()));
    }
    out.push('\n');
    out.push_str(&format!(
        "{} {}{}{}\n\n",
        "Filter by:".bold().white(),
        render_status_choices(query.status),
        COLUMN_GAP,
        page.summary().green()
    ));

    out.push_str(&render_header());
    out.push('\n');
    if page.items.is_empty() {
        out.push_str(&"No food trucks match the current filters.".dimmed().to_string());
        out.push('\n');
    }
    for record in page.items {
        out.push_str(&render_row(record));
        out.push('\n');
    }
    out.push('\n');

    out.push_str(&format!(
        "{}  {}  {}\n",
        render_control("Previous", page.has_previous()),
        page.indicator().bold(),
        render_control("Next", page.has_next())
    ));
    out.push_str(&format!(
        "{} {}",
        "Pages:".dimmed(),
        render_page_strip(page.total_pages, page.page)
    ));
    out
}

pub fn render_screen(screen: &Screen<'_>, search_pending: bool) -> String {
    match screen {
        Screen::Loading => render_loading(),
        Screen::Error(message) => render_error(message),
        Screen::Ready(listing) => render_listing(listing, search_pending),
    }
}

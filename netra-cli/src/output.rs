use std::fmt::Write;

use netra_types::{Asset, Dataset, format_date, format_timestamp};

const NO_DATASETS: &str = "No datasets found.";

/// Library listing in the style of a history table.
pub fn dataset_table(datasets: &[&Dataset]) -> String {
    if datasets.is_empty() {
        return format!("{NO_DATASETS}\n");
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<6} {:<20} {:<10} {:>6} {:>6} {:<28} {:<22} LAST MODIFIED",
        "ID", "COMPANY", "SCAN DATE", "TOTAL", "ACTIVE", "SERVICES", "RISK"
    );
    for ds in datasets {
        let _ = writeln!(
            out,
            "{:<6} {:<20} {:<10} {:>6} {:>6} {:<28} {:<22} {}",
            ds.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            truncate(&ds.company_name, 20),
            format_date(ds.scan_date),
            ds.total_assets,
            ds.active_assets,
            truncate(&ds.all_services, 28),
            truncate(&ds.risk_level, 22),
            format_timestamp(ds.last_modified),
        );
    }
    out
}

/// Full detail for one dataset.
pub fn dataset_detail(ds: &Dataset) -> String {
    let mut out = String::new();
    let id = ds.id.map(|id| id.to_string()).unwrap_or_else(|| "(unsaved)".into());
    let _ = writeln!(out, "Dataset {id}: {}", ds.company_name);
    let _ = writeln!(out, "  Scan date:       {}", format_date(ds.scan_date));
    let _ = writeln!(
        out,
        "  Assets:          {} total, {} active",
        ds.total_assets, ds.active_assets
    );
    let _ = writeln!(out, "  Scans processed: {}", ds.scans_processed);
    let _ = writeln!(out, "  Services:        {}", or_dash(&ds.all_services));
    let _ = writeln!(out, "  Risk level:      {}", or_dash(&ds.risk_level));
    let _ = writeln!(out, "  Notes:           {}", or_dash(&ds.file_notes));
    let _ = writeln!(out, "  Created:         {}", format_timestamp(ds.created_date));
    let _ = writeln!(out, "  Last modified:   {}", format_timestamp(ds.last_modified));
    if ds.original_files.is_empty() {
        let _ = writeln!(out, "  Source files:    -");
    } else {
        let _ = writeln!(out, "  Source files:");
        for file in &ds.original_files {
            let _ = writeln!(out, "    {file}");
        }
    }
    out
}

pub fn asset_table(assets: &[Asset]) -> String {
    if assets.is_empty() {
        return "No assets recorded.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:<28} {:<20} {:>5} SERVICES",
        "IP", "HOSTNAME", "VENDOR", "PORTS"
    );
    for a in assets {
        let _ = writeln!(
            out,
            "{:<16} {:<28} {:<20} {:>5} {}",
            a.ip_address,
            truncate(or_dash(&a.hostname), 28),
            truncate(&a.vendor, 20),
            a.open_port_count,
            or_dash(&a.open_services),
        );
    }
    out
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() { "-" } else { s }
}

/// Cut `s` to at most `width` characters, marking the cut with "...".
fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    let keep = width.saturating_sub(3);
    let mut cut: String = s.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

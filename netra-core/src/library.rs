use netra_types::{Dataset, format_date, format_timestamp};

const WORD_SEPARATORS: &[char] = &[' ', ',', '/', '|', '-'];

/// Quick filter over the dataset library listing.
///
/// `query` is a comma-separated list of terms. A dataset is kept when every
/// term equals, ignoring case, a whole word of one of its displayed fields.
/// A blank query keeps everything.
pub fn filter_datasets<'a>(datasets: &'a [Dataset], query: &str) -> Vec<&'a Dataset> {
    let terms: Vec<String> = query
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    if terms.is_empty() {
        return datasets.iter().collect();
    }

    datasets
        .iter()
        .filter(|ds| {
            let words = displayed_words(ds);
            terms.iter().all(|term| words.iter().any(|w| w == term))
        })
        .collect()
}

/// Lower-cased words of every field shown in the library listing.
fn displayed_words(ds: &Dataset) -> Vec<String> {
    let fields = [
        ds.company_name.clone(),
        format_date(ds.scan_date),
        ds.total_assets.to_string(),
        ds.active_assets.to_string(),
        ds.all_services.clone(),
        ds.scans_processed.to_string(),
        ds.risk_level.clone(),
        format_timestamp(ds.last_modified),
    ];
    fields
        .iter()
        .flat_map(|f| f.split(WORD_SEPARATORS))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

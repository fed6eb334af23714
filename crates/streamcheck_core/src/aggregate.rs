use std::collections::HashMap;

use crate::model::{CategorySummary, ProbeResult};

/// Bucket label for channels without a usable `group-title`.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Group probe results by category, in first-seen order.
///
/// Channels with a missing or empty group land in the [`UNCATEGORIZED`]
/// bucket. For any input, the `total` counts across all summaries sum to
/// the input length, and `failed == total - working` per category.
pub fn aggregate(results: &[ProbeResult]) -> Vec<CategorySummary> {
    let mut summaries: Vec<CategorySummary> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in results {
        let label = category_label(result.channel.group.as_deref());
        let slot = *index.entry(label.to_string()).or_insert_with(|| {
            summaries.push(CategorySummary {
                name: label.to_string(),
                total: 0,
                working: 0,
                failed: 0,
            });
            summaries.len() - 1
        });

        let summary = &mut summaries[slot];
        summary.total += 1;
        if result.working {
            summary.working += 1;
        } else {
            summary.failed += 1;
        }
    }

    summaries
}

/// Normalize a channel's group into a category label.
pub fn category_label(group: Option<&str>) -> &str {
    match group {
        Some(g) if !g.trim().is_empty() => g,
        _ => UNCATEGORIZED,
    }
}

pub mod extract;
pub mod locate;

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::fetch::{sha256_hex, RenderedPage};
use crate::model::{IndexId, IndexSnapshot, Snapshot};
use crate::parser::locate::default_locators;

/// Extract a full snapshot from rendered page text. Parsing never fails:
/// an index whose section cannot be located, or whose rows are all
/// malformed, contributes an empty index. The caller decides whether an
/// all-empty snapshot is worth keeping.
pub fn parse_snapshot(page: &RenderedPage) -> Snapshot {
    let lines: Vec<&str> = page.text.lines().map(str::trim).collect();
    let locators = default_locators();

    let mut indices = BTreeMap::new();
    for index in IndexId::ALL {
        let mut entries = Vec::new();
        for locator in &locators {
            let Some(section) = locator.locate(&lines, index) else {
                continue;
            };
            entries = extract::extract_entries(&section);
            if !entries.is_empty() {
                debug!("{index} chart located via {} strategy", locator.name());
                break;
            }
        }
        info!("extracted {} entries from {} chart", entries.len(), index);
        indices.insert(index, IndexSnapshot::new(entries));
    }

    Snapshot::new(page.url.clone(), sha256_hex(&page.text), indices)
}

#[cfg(test)]
mod tests {
    use crate::fetch::RenderedPage;
    use crate::model::IndexId;
    use crate::parser::parse_snapshot;

    fn page(text: &str) -> RenderedPage {
        RenderedPage {
            url: "https://example.test/".to_string(),
            text: text.to_string(),
        }
    }

    fn full_page() -> RenderedPage {
        page(
            "\
Artificial Analysis
INTELLIGENCE
Higher is better
GPT-5.2
Claude 4.5 Opus
71
68
SPEED
200 t/s
PRICE
Artificial Analysis Coding Index
25 of 342 models
+ Add model
Claude 4.5 Opus
GPT-5.2
61
58
{\"@context\": \"https://schema.org\"}
Artificial Analysis Agentic Index
25 of 342 models
Gemini 3 Pro
52
{\"@context\": \"https://schema.org\"}",
        )
    }

    #[test]
    fn all_three_indices_parse_from_one_page() {
        let snapshot = parse_snapshot(&full_page());

        let intelligence = snapshot.index(IndexId::Intelligence).unwrap();
        assert_eq!(intelligence.entries.len(), 2);
        assert_eq!(intelligence.entries[0].model, "GPT-5.2");
        assert_eq!(intelligence.entries[0].rank, 1);
        assert_eq!(intelligence.entries[0].score, 71.0);

        let coding = snapshot.index(IndexId::Coding).unwrap();
        assert_eq!(coding.entries.len(), 2);
        assert_eq!(coding.entries[0].model, "Claude 4.5 Opus");
        assert_eq!(coding.entries[0].score, 61.0);

        let agentic = snapshot.index(IndexId::Agentic).unwrap();
        assert_eq!(agentic.entries.len(), 1);
        assert_eq!(agentic.entries[0].model, "Gemini 3 Pro");
    }

    #[test]
    fn missing_section_yields_an_empty_index_not_a_failure() {
        let snapshot = parse_snapshot(&page(
            "\
Artificial Analysis Coding Index
25 of 342 models
GPT-5.2
61
{\"@context\": \"https://schema.org\"}",
        ));
        assert_eq!(snapshot.index(IndexId::Agentic).unwrap().len(), 0);
        // The coding chart doubles as the positional fallback for the
        // missing intelligence heading.
        assert_eq!(snapshot.index(IndexId::Intelligence).unwrap().len(), 1);
        assert_eq!(snapshot.total_entries(), 2);
    }

    #[test]
    fn malformed_rows_are_skipped_without_losing_the_rest() {
        let snapshot = parse_snapshot(&page(
            "\
INTELLIGENCE
GPT-5.2
???!!!
7
Claude 4.5 Opus
71
68
SPEED",
        ));
        let intelligence = snapshot.index(IndexId::Intelligence).unwrap();
        assert_eq!(intelligence.entries.len(), 2);
        assert_eq!(intelligence.entries[1].model, "Claude 4.5 Opus");
        assert_eq!(intelligence.entries[1].score, 68.0);
    }

    #[test]
    fn blank_page_parses_to_an_all_empty_snapshot() {
        let snapshot = parse_snapshot(&page("nothing to see here"));
        assert_eq!(snapshot.total_entries(), 0);
        assert_eq!(snapshot.indices.len(), 3);
    }
}

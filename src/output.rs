use anyhow::Result;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde::Serialize;

use crate::diff::{ChangeEvent, IndexChanges};
use crate::model::{IndexId, Snapshot};

pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn render_snapshot_table(snapshot: &Snapshot, top_n: usize) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Index", "Rank", "Model", "Score"]);

    for index in IndexId::ALL {
        let Some(entries) = snapshot.index(index) else {
            continue;
        };
        for entry in &entries.entries {
            if entry.rank as usize > top_n {
                continue;
            }
            table.add_row(vec![
                index.to_string(),
                entry.rank.to_string(),
                entry.model.clone(),
                entry.score.to_string(),
            ]);
        }
    }
    table.to_string()
}

pub fn render_changes_table(changes: &[IndexChanges]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Index", "Change", "Model", "Detail"]);

    for group in changes {
        for event in &group.events {
            let (kind, model, detail) = match event {
                ChangeEvent::Entered { model, rank, score } => (
                    "entered",
                    model.as_str(),
                    format!("#{rank} (score {score})"),
                ),
                ChangeEvent::Removed {
                    model,
                    last_known_rank,
                } => ("removed", model.as_str(), format!("was #{last_known_rank}")),
                ChangeEvent::RankChanged {
                    model,
                    old_rank,
                    new_rank,
                    score,
                } => (
                    "rank",
                    model.as_str(),
                    format!("#{old_rank} -> #{new_rank} (score {score})"),
                ),
            };
            table.add_row(vec![
                group.index.to_string(),
                kind.to_string(),
                model.to_string(),
                detail,
            ]);
        }
    }
    table.to_string()
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{IndexId, IndexSnapshot, Snapshot};

/// Ranks beyond this band are not reported; the long tail is too volatile.
pub const DEFAULT_TOP_N: usize = 15;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeEvent {
    Entered {
        model: String,
        rank: u32,
        score: f64,
    },
    Removed {
        model: String,
        last_known_rank: u32,
    },
    RankChanged {
        model: String,
        old_rank: u32,
        new_rank: u32,
        score: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexChanges {
    pub index: IndexId,
    pub events: Vec<ChangeEvent>,
}

impl IndexChanges {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

pub fn total_events(changes: &[IndexChanges]) -> usize {
    changes.iter().map(|c| c.events.len()).sum()
}

/// Compare one index against its previous capture within the top band.
///
/// No previous capture (first run, or the index was empty last time) emits
/// nothing: the first observation establishes a baseline. Duplicate model
/// names keep their first occurrence.
pub fn diff_index(
    previous: Option<&IndexSnapshot>,
    current: &IndexSnapshot,
    top_n: usize,
) -> Vec<ChangeEvent> {
    let Some(previous) = previous.filter(|p| !p.is_empty()) else {
        return Vec::new();
    };

    let old = band_lookup(previous, top_n);
    let new = band_lookup(current, top_n);

    let mut entered = Vec::new();
    let mut removed = Vec::new();
    let mut moved = Vec::new();

    for (model, &(rank, score)) in &new {
        match old.get(model) {
            None => entered.push(ChangeEvent::Entered {
                model: (*model).to_string(),
                rank,
                score,
            }),
            Some(&(old_rank, _)) if old_rank != rank => moved.push(ChangeEvent::RankChanged {
                model: (*model).to_string(),
                old_rank,
                new_rank: rank,
                score,
            }),
            Some(_) => {}
        }
    }

    for (model, &(rank, _)) in &old {
        if !new.contains_key(model) {
            removed.push(ChangeEvent::Removed {
                model: (*model).to_string(),
                last_known_rank: rank,
            });
        }
    }

    // Presentation order: entered by new rank, removed by last known rank,
    // moved by new rank. Sorts are stable and the maps iterate by model
    // name, so ties are deterministic.
    entered.sort_by_key(event_rank);
    removed.sort_by_key(event_rank);
    moved.sort_by_key(event_rank);

    let mut events = entered;
    events.append(&mut removed);
    events.append(&mut moved);
    events
}

/// Diff all tracked indices in fixed order. A previous snapshot missing an
/// index contributes a baseline for that index only.
pub fn diff_snapshots(
    previous: Option<&Snapshot>,
    current: &Snapshot,
    top_n: usize,
) -> Vec<IndexChanges> {
    let empty = IndexSnapshot::default();
    let mut out = Vec::with_capacity(IndexId::ALL.len());
    for index in IndexId::ALL {
        let prev = previous.and_then(|s| s.index(index));
        let cur = current.index(index).unwrap_or(&empty);
        out.push(IndexChanges {
            index,
            events: diff_index(prev, cur, top_n),
        });
    }
    out
}

fn band_lookup(snapshot: &IndexSnapshot, top_n: usize) -> BTreeMap<&str, (u32, f64)> {
    let mut map = BTreeMap::new();
    for entry in &snapshot.entries {
        if entry.rank as usize > top_n {
            continue;
        }
        map.entry(entry.model.as_str())
            .or_insert((entry.rank, entry.score));
    }
    map
}

fn event_rank(event: &ChangeEvent) -> u32 {
    match event {
        ChangeEvent::Entered { rank, .. } => *rank,
        ChangeEvent::Removed {
            last_known_rank, ..
        } => *last_known_rank,
        ChangeEvent::RankChanged { new_rank, .. } => *new_rank,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::diff::{diff_index, diff_snapshots, ChangeEvent, DEFAULT_TOP_N};
    use crate::model::{Entry, IndexId, IndexSnapshot, Snapshot};

    fn snap(entries: &[(u32, &str, f64)]) -> IndexSnapshot {
        IndexSnapshot::new(
            entries
                .iter()
                .map(|&(rank, model, score)| Entry::new(rank, model, score))
                .collect(),
        )
    }

    #[test]
    fn absent_previous_is_a_silent_baseline() {
        let current = snap(&[(1, "X", 50.0)]);
        assert!(diff_index(None, &current, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn empty_previous_is_a_silent_baseline() {
        let previous = snap(&[]);
        let current = snap(&[(1, "X", 50.0)]);
        assert!(diff_index(Some(&previous), &current, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn identical_rankings_emit_nothing_despite_score_drift() {
        let previous = snap(&[(1, "A", 90.0), (2, "B", 85.0)]);
        let current = snap(&[(1, "A", 92.0), (2, "B", 80.0)]);
        assert!(diff_index(Some(&previous), &current, DEFAULT_TOP_N).is_empty());
    }

    #[test]
    fn new_model_in_band_is_entered_exactly_once() {
        let previous = snap(&[(1, "A", 90.0)]);
        let current = snap(&[(1, "A", 90.0), (2, "C", 80.0)]);
        let events = diff_index(Some(&previous), &current, DEFAULT_TOP_N);
        assert_eq!(
            events,
            vec![ChangeEvent::Entered {
                model: "C".into(),
                rank: 2,
                score: 80.0
            }]
        );
    }

    #[test]
    fn model_leaving_band_is_removed_with_last_known_rank() {
        let previous = snap(&[(1, "A", 90.0), (2, "B", 85.0)]);
        let current = snap(&[(1, "A", 90.0)]);
        let events = diff_index(Some(&previous), &current, DEFAULT_TOP_N);
        assert_eq!(
            events,
            vec![ChangeEvent::Removed {
                model: "B".into(),
                last_known_rank: 2
            }]
        );
    }

    #[test]
    fn rank_movement_within_band_is_one_rank_changed() {
        let previous = snap(&[(1, "A", 90.0), (2, "B", 85.0)]);
        let current = snap(&[(1, "B", 87.0), (2, "A", 86.0)]);
        let events = diff_index(Some(&previous), &current, DEFAULT_TOP_N);
        assert_eq!(
            events,
            vec![
                ChangeEvent::RankChanged {
                    model: "B".into(),
                    old_rank: 2,
                    new_rank: 1,
                    score: 87.0
                },
                ChangeEvent::RankChanged {
                    model: "A".into(),
                    old_rank: 1,
                    new_rank: 2,
                    score: 86.0
                },
            ]
        );
    }

    #[test]
    fn mixed_changes_come_out_entered_removed_moved() {
        // [(1,A,90),(2,B,85)] -> [(1,B,87),(2,C,80)].
        let previous = snap(&[(1, "A", 90.0), (2, "B", 85.0)]);
        let current = snap(&[(1, "B", 87.0), (2, "C", 80.0)]);
        let events = diff_index(Some(&previous), &current, DEFAULT_TOP_N);
        assert_eq!(
            events,
            vec![
                ChangeEvent::Entered {
                    model: "C".into(),
                    rank: 2,
                    score: 80.0
                },
                ChangeEvent::Removed {
                    model: "A".into(),
                    last_known_rank: 1
                },
                ChangeEvent::RankChanged {
                    model: "B".into(),
                    old_rank: 2,
                    new_rank: 1,
                    score: 87.0
                },
            ]
        );
    }

    #[test]
    fn changes_outside_the_band_are_ignored() {
        let previous = snap(&[(1, "A", 90.0), (16, "T", 40.0)]);
        let current = snap(&[(1, "A", 90.0), (17, "T", 39.0)]);
        assert!(diff_index(Some(&previous), &current, 15).is_empty());
    }

    #[test]
    fn entering_band_from_below_reports_entered() {
        // Band membership defines "known": a model tracked below the band
        // last time counts as new when it climbs in.
        let previous = snap(&[(1, "A", 90.0), (16, "Climber", 40.0)]);
        let current = snap(&[(1, "A", 90.0), (15, "Climber", 45.0)]);
        let events = diff_index(Some(&previous), &current, 15);
        assert_eq!(
            events,
            vec![ChangeEvent::Entered {
                model: "Climber".into(),
                rank: 15,
                score: 45.0
            }]
        );
    }

    #[test]
    fn falling_below_band_reports_removed() {
        let previous = snap(&[(1, "A", 90.0), (15, "Faller", 45.0)]);
        let current = snap(&[(1, "A", 90.0), (16, "Faller", 44.0)]);
        let events = diff_index(Some(&previous), &current, 15);
        assert_eq!(
            events,
            vec![ChangeEvent::Removed {
                model: "Faller".into(),
                last_known_rank: 15
            }]
        );
    }

    #[test]
    fn duplicate_names_keep_first_occurrence() {
        let previous = snap(&[(1, "A", 90.0)]);
        let current = snap(&[(1, "A", 90.0), (2, "Dup", 80.0), (3, "Dup", 70.0)]);
        let events = diff_index(Some(&previous), &current, DEFAULT_TOP_N);
        assert_eq!(
            events,
            vec![ChangeEvent::Entered {
                model: "Dup".into(),
                rank: 2,
                score: 80.0
            }]
        );
    }

    #[test]
    fn snapshot_diff_groups_by_index_in_fixed_order() {
        let mut prev_indices = BTreeMap::new();
        prev_indices.insert(IndexId::Coding, snap(&[(1, "A", 90.0)]));
        let mut cur_indices = BTreeMap::new();
        cur_indices.insert(IndexId::Coding, snap(&[(1, "B", 88.0)]));
        cur_indices.insert(IndexId::Agentic, snap(&[(1, "X", 50.0)]));

        let previous = Snapshot::new("u", "h1", prev_indices);
        let current = Snapshot::new("u", "h2", cur_indices);
        let changes = diff_snapshots(Some(&previous), &current, DEFAULT_TOP_N);

        let order: Vec<_> = changes.iter().map(|c| c.index).collect();
        assert_eq!(
            order,
            vec![IndexId::Intelligence, IndexId::Coding, IndexId::Agentic]
        );
        assert!(changes[0].is_empty());
        assert_eq!(changes[1].events.len(), 2);
        // Agentic had no previous capture: baseline, no events.
        assert!(changes[2].is_empty());
    }

    #[test]
    fn first_run_snapshot_diff_is_empty() {
        let mut indices = BTreeMap::new();
        indices.insert(IndexId::Agentic, snap(&[(1, "X", 50.0)]));
        let current = Snapshot::new("u", "h", indices);
        let changes = diff_snapshots(None, &current, DEFAULT_TOP_N);
        assert!(changes.iter().all(|c| c.is_empty()));
    }
}

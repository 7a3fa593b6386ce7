use crate::diff::{ChangeEvent, IndexChanges};
use crate::notify::{Notification, Priority};

/// Push messages stay short; anything past this many lines is summarized.
const MAX_BODY_LINES: usize = 10;

/// Render the per-index change groups into one notification. Returns None
/// when no index has any events.
pub fn render_changes(changes: &[IndexChanges]) -> Option<Notification> {
    let mut lines = Vec::new();
    for group in changes {
        for event in &group.events {
            lines.push(format!("{}: {}", group.index, event_line(event)));
        }
    }
    if lines.is_empty() {
        return None;
    }

    let total = lines.len();
    let mut body_lines: Vec<String> = lines.into_iter().take(MAX_BODY_LINES).collect();
    if total > MAX_BODY_LINES {
        body_lines.push(format!("+{} more...", total - MAX_BODY_LINES));
    }

    Some(Notification {
        title: format!("Benchmark rankings changed ({total})"),
        body: body_lines.join("\n"),
        priority: Priority::Normal,
    })
}

pub fn startup_notification(total_models: usize) -> Notification {
    Notification {
        title: "Benchmark monitor started".to_string(),
        body: format!(
            "Tracking {total_models} models across the intelligence, coding and agentic indices."
        ),
        priority: Priority::Elevated,
    }
}

fn event_line(event: &ChangeEvent) -> String {
    match event {
        ChangeEvent::Entered { model, rank, score } => {
            format!("{model} entered at #{rank} (score {score})")
        }
        ChangeEvent::Removed {
            model,
            last_known_rank,
        } => format!("{model} removed (was #{last_known_rank})"),
        ChangeEvent::RankChanged {
            model,
            old_rank,
            new_rank,
            score,
        } => format!("{model} #{old_rank} -> #{new_rank} (score {score})"),
    }
}

pub mod render;
pub mod sink;

use serde::{Deserialize, Serialize};

pub use render::{render_changes, startup_notification};
pub use sink::{NotifySink, PushoverSink, StdoutSink};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    Elevated,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub priority: Priority,
}

use dronecore::interface::{Alert, Band, SweepStatus};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Most recent alerts kept for `/events`.
pub const EVENT_HISTORY: usize = 30;

/// Snapshot served to remote status viewers.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusModel {
    pub bands: Vec<Band>,
    pub status: Option<SweepStatus>,
    pub events: VecDeque<Alert>,
    pub alert_count: u64,
}

impl StatusModel {
    pub fn new(bands: Vec<Band>) -> Self {
        Self {
            bands,
            ..Default::default()
        }
    }

    pub fn record_alert(&mut self, alert: &Alert) {
        if self.events.len() == EVENT_HISTORY {
            self.events.pop_front();
        }
        self.events.push_back(alert.clone());
        self.alert_count += 1;
    }

    pub fn record_status(&mut self, status: &SweepStatus) {
        self.status = Some(status.clone());
    }
}

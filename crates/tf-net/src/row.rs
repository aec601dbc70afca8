//! Plain data rows for tick diagnostics.

use tf_sim::TickStats;

/// One line of the per-tick diagnostics file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:         u64,
    pub tasks_fired:  u64,
    pub tasks_failed: u64,
    pub commands:     u64,
    pub decided:      u64,
    pub faults:       u64,
    pub deaths:       u64,
    /// Agent deltas in the batch published this tick.
    pub published:    u64,
    pub agents:       u64,
    pub holding:      u64,
    pub elapsed_us:   u64,
}

impl TickSummaryRow {
    pub const HEADERS: [&'static str; 11] = [
        "tick",
        "tasks_fired",
        "tasks_failed",
        "commands",
        "decided",
        "faults",
        "deaths",
        "published",
        "agents",
        "holding",
        "elapsed_us",
    ];

    pub fn to_record(&self) -> [String; 11] {
        [
            self.tick.to_string(),
            self.tasks_fired.to_string(),
            self.tasks_failed.to_string(),
            self.commands.to_string(),
            self.decided.to_string(),
            self.faults.to_string(),
            self.deaths.to_string(),
            self.published.to_string(),
            self.agents.to_string(),
            self.holding.to_string(),
            self.elapsed_us.to_string(),
        ]
    }
}

impl From<&TickStats> for TickSummaryRow {
    fn from(s: &TickStats) -> Self {
        Self {
            tick:         s.tick.0,
            tasks_fired:  s.tasks.fired as u64,
            tasks_failed: s.tasks.failed as u64,
            commands:     s.commands as u64,
            decided:      s.decided as u64,
            faults:       s.faults as u64,
            deaths:       s.deaths as u64,
            published:    s.published as u64,
            agents:       s.agents as u64,
            holding:      s.holding as u64,
            elapsed_us:   s.elapsed_us,
        }
    }
}

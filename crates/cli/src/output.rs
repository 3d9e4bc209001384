// Table rendering

use corestore_core::application::MigrationStatus;
use corestore_core::domain::Core;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct CoreLine {
    name: String,
    level: String,
    previous: String,
    trend: String,
    id: String,
}

impl From<&Core> for CoreLine {
    fn from(core: &Core) -> Self {
        Self {
            name: core.name.to_string(),
            level: format!("{:.0}%", core.level_percent()),
            previous: format!("{:.0}%", core.previous_level * 100.0),
            trend: core.trend.to_string(),
            id: core.id.clone(),
        }
    }
}

pub fn core_table(cores: &[Core]) -> String {
    Table::new(cores.iter().map(CoreLine::from)).to_string()
}

#[derive(Tabled)]
struct StepLine {
    step: String,
    state: &'static str,
}

pub fn pending_table(status: &MigrationStatus) -> String {
    Table::new(status.pending.iter().map(|(from, to)| StepLine {
        step: format!("v{} -> v{}", from, to),
        state: "pending",
    }))
    .to_string()
}

use xsell_core::config::LoadOptions;
use xsell_core::DashboardSession;

use super::{prepare, CommandResult};
use crate::render;

const COMMAND: &str = "customers";

pub fn run(options: &LoadOptions) -> CommandResult {
    let interaction = match prepare(COMMAND, options) {
        Ok(interaction) => interaction,
        Err(result) => return result,
    };
    let session = DashboardSession::new();

    match interaction.runtime.block_on(interaction.dashboard.load_customers(&session)) {
        Ok(customers) => CommandResult::rendered(render::customer_options(&customers)),
        Err(error) => CommandResult::interaction_failure(COMMAND, error, session.correlation_id()),
    }
}

use xsell_core::config::LoadOptions;
use xsell_core::DashboardSession;

use super::{prepare, CommandResult, SlotArgs};
use crate::render;

const COMMAND: &str = "catalog";

/// Lists the product catalog against the requested slot selection.
pub fn run(options: &LoadOptions, slots: &SlotArgs) -> CommandResult {
    let interaction = match prepare(COMMAND, options) {
        Ok(interaction) => interaction,
        Err(result) => return result,
    };
    let mut session = DashboardSession::new();

    if let Err(error) = interaction.runtime.block_on(interaction.dashboard.load_catalog(&mut session)) {
        return CommandResult::interaction_failure(COMMAND, error, session.correlation_id());
    }

    let mut notices = slots.apply(&mut session.selection);
    notices.extend(
        session
            .selection
            .selected_items()
            .into_iter()
            .filter(|product| !session.catalog.contains(product))
            .map(|product| format!("{product} is not in the catalog")),
    );

    let mut output = render::catalog(&session.catalog, &session.selection);
    for notice in notices {
        output.push_str(&format!("\nnote: {notice}"));
    }
    CommandResult::rendered(output)
}

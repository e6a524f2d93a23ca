use xsell_core::config::LoadOptions;
use xsell_core::{ApplicationError, CustomerId, DashboardSession};

use super::{prepare, CommandResult, EXIT_BAD_REQUEST, EXIT_INTERNAL};
use crate::render;

const COMMAND: &str = "customer";

/// Shows one customer's details, recent invoices, earlier purchases and
/// insight cards.
pub fn run(options: &LoadOptions, customer_id: &str) -> CommandResult {
    if customer_id.trim().is_empty() {
        return CommandResult::failure(COMMAND, "bad_request", "customer id must not be blank", EXIT_BAD_REQUEST);
    }

    let interaction = match prepare(COMMAND, options) {
        Ok(interaction) => interaction,
        Err(result) => return result,
    };
    let dashboard = &interaction.dashboard;
    let mut session = DashboardSession::new();

    let loaded = interaction.runtime.block_on(async {
        dashboard.select_customer(&mut session, Some(CustomerId::new(customer_id.trim()))).await?;
        Ok::<_, ApplicationError>(dashboard.customer_insights(&session).await)
    });

    let insights = match loaded {
        Ok(insights) => insights,
        Err(error) => {
            return CommandResult::interaction_failure(COMMAND, error, session.correlation_id())
        }
    };
    match session.snapshot.as_ref() {
        Some(snapshot) => CommandResult::rendered(render::customer(snapshot, &insights)),
        None => CommandResult::failure(
            COMMAND,
            "internal",
            "customer snapshot missing after load",
            EXIT_INTERNAL,
        ),
    }
}

use clap::Args;
use xsell_core::config::LoadOptions;
use xsell_core::{ApplicationError, CustomerId, DashboardSession, SuggestionItem};

use super::{prepare, CommandResult, SlotArgs};
use crate::render::{self, SUPPLEMENTAL_TITLE};

const COMMAND: &str = "suggest";

#[derive(Debug, Clone, Default, Args)]
pub struct SuggestArgs {
    #[arg(long, value_name = "ID", help = "Customer whose rooms drive the supplemental column")]
    pub customer: Option<String>,
    #[arg(
        long,
        requires = "customer",
        help = "Put the customer's most recent purchase into the first empty slot"
    )]
    pub recent: bool,
    #[arg(long, help = "Skip the narrative explanation of the recommendations")]
    pub no_explain: bool,
    #[command(flatten)]
    pub slots: SlotArgs,
}

pub fn run(options: &LoadOptions, args: &SuggestArgs) -> CommandResult {
    let interaction = match prepare(COMMAND, options) {
        Ok(interaction) => interaction,
        Err(result) => return result,
    };
    let dashboard = &interaction.dashboard;

    let mut session = DashboardSession::new();
    session.customer = args
        .customer
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(CustomerId::new);
    let notices = args.slots.apply(&mut session.selection);

    let outcome = interaction.runtime.block_on(async {
        let prefilled = if args.recent {
            dashboard.prefill_from_recent_purchase(&mut session).await?
        } else {
            None
        };
        let aggregated = dashboard.suggest(&session).await?;
        let explanation = if args.no_explain {
            None
        } else {
            let recommendations: Vec<SuggestionItem> =
                aggregated.per_item.flattened().cloned().collect();
            Some(dashboard.explain(&session, &recommendations).await)
        };
        Ok::<_, ApplicationError>((prefilled, aggregated, explanation))
    });

    let (prefilled, aggregated, explanation) = match outcome {
        Ok(outcome) => outcome,
        Err(error) => {
            return CommandResult::interaction_failure(COMMAND, error, session.correlation_id())
        }
    };

    let mut blocks = Vec::new();
    if let Some(product) = prefilled {
        blocks.push(format!("note: added recent purchase {product} to the selection"));
    }
    blocks.extend(notices.into_iter().map(|notice| format!("note: {notice}")));
    blocks.push(format!("Selection: {}", session.selection.indicator().label()));
    blocks.extend(
        aggregated
            .per_item
            .columns()
            .iter()
            .map(|column| render::suggestion_column(column.source.as_str(), &column.suggestions)),
    );

    if session.customer.is_some() {
        match &aggregated.supplemental_error {
            Some(error) => blocks.push(format!(
                "== {SUPPLEMENTAL_TITLE} ==\n  Could not load room recommendations: {error}"
            )),
            None => blocks.push(render::suggestion_column(SUPPLEMENTAL_TITLE, &aggregated.supplemental)),
        }
    }

    if let Some(block) = explanation.as_ref().and_then(render::explanation) {
        blocks.push(block);
    }

    CommandResult::rendered(blocks.join("\n\n"))
}

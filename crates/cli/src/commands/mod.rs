pub mod catalog;
pub mod config;
pub mod customer;
pub mod customers;
pub mod doctor;
pub mod suggest;

use clap::Args;
use serde::Serialize;
use tokio::runtime::Runtime;
use tracing::warn;
use xsell_client::HttpBackend;
use xsell_core::config::{AppConfig, LoadOptions};
use xsell_core::{ApplicationError, Dashboard, InterfaceError, ProductId, SelectionManager, SlotIndex};

pub const EXIT_INTERNAL: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_BAD_REQUEST: u8 = 2;
pub const EXIT_BACKEND: u8 = 3;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    correlation_id: Option<String>,
}

impl CommandResult {
    pub fn rendered(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            correlation_id: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// Failure of a dashboard interaction, reported with the operator-facing
    /// message and the correlation id that ties it to the logs.
    pub fn interaction_failure(command: &str, error: ApplicationError, correlation_id: &str) -> Self {
        warn!(
            event_name = "cli.command.failed",
            correlation_id,
            command,
            error = %error,
            "command failed"
        );

        let mapped = error.into_interface(correlation_id);
        let (error_class, exit_code) = match &mapped {
            InterfaceError::BadRequest { .. } => ("bad_request", EXIT_BAD_REQUEST),
            InterfaceError::ServiceUnavailable { .. } => ("service_unavailable", EXIT_BACKEND),
            InterfaceError::Internal { .. } => ("internal", EXIT_INTERNAL),
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: mapped.user_message().to_string(),
            correlation_id: Some(mapped.correlation_id().to_string()),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// Product chosen for each of the three slots.
#[derive(Debug, Clone, Default, Args)]
pub struct SlotArgs {
    #[arg(long, value_name = "PRODUCT", help = "Product for slot 1")]
    pub slot1: Option<String>,
    #[arg(long, value_name = "PRODUCT", help = "Product for slot 2")]
    pub slot2: Option<String>,
    #[arg(long, value_name = "PRODUCT", help = "Product for slot 3")]
    pub slot3: Option<String>,
}

impl SlotArgs {
    pub fn new<const N: usize>(products: [&str; N]) -> Self {
        let mut values = products.into_iter().map(|product| Some(product.to_string()));
        Self {
            slot1: values.next().flatten(),
            slot2: values.next().flatten(),
            slot3: values.next().flatten(),
        }
    }

    /// Fills `selection` slot by slot. Returns a notice for each product the
    /// selection refused because another slot already holds it.
    pub fn apply(&self, selection: &mut SelectionManager) -> Vec<String> {
        let requested = [&self.slot1, &self.slot2, &self.slot3];
        let mut notices = Vec::new();

        for (index, value) in SlotIndex::all().into_iter().zip(requested) {
            let product = value.as_deref().map(ProductId::from);
            selection.select_slot(index, product.clone());
            if let Some(product) = product.filter(|product| !product.as_str().trim().is_empty()) {
                if selection.value(index) != Some(&product) {
                    notices.push(format!("slot {} ignored: {product} is already selected", index.get()));
                }
            }
        }

        notices
    }
}

/// Everything a backend-facing command needs: validated config, a
/// single-threaded runtime and the dashboard over HTTP.
pub(crate) struct Interaction {
    pub runtime: Runtime,
    pub dashboard: Dashboard<HttpBackend>,
}

pub(crate) fn load_config(command: &str, options: &LoadOptions) -> Result<AppConfig, CommandResult> {
    AppConfig::load(options.clone()).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), EXIT_CONFIG)
    })
}

pub(crate) fn prepare(command: &str, options: &LoadOptions) -> Result<Interaction, CommandResult> {
    let config = load_config(command, options)?;
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_INTERNAL,
        )
    })?;
    let backend = HttpBackend::new(&config.backend).map_err(|error| {
        let error = ApplicationError::Configuration(format!("backend client: {error}"));
        CommandResult::interaction_failure(command, error, "startup")
    })?;

    Ok(Interaction { runtime, dashboard: Dashboard::new(backend) })
}

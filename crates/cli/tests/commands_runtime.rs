use std::collections::HashMap;
use std::env;
use std::sync::{Mutex, OnceLock};

use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::runtime::Runtime;
use xsell_cli::commands::suggest::SuggestArgs;
use xsell_cli::commands::{catalog, config, customer, customers, doctor, suggest, SlotArgs};
use xsell_core::config::{ConfigOverrides, LoadOptions};

type Params = Query<HashMap<String, String>>;

fn param(params: &HashMap<String, String>, key: &str) -> String {
    params.get(key).cloned().unwrap_or_default()
}

fn router() -> Router {
    Router::new()
        .route("/api/catalog_main", get(|| async { Json(json!(["Dryer", "Grill", "Washer"])) }))
        .route(
            "/api/customers",
            get(|| async {
                Json(json!([{"id": "C0001", "name": "Ava Brown"}, {"id": "C0002", "name": "Liam Chen"}]))
            }),
        )
        .route(
            "/api/customer_details",
            get(|Query(params): Params| async move {
                match param(&params, "customer_id").as_str() {
                    "C0001" => Json(json!({
                        "customer_id": "C0001", "name": "Ava Brown", "address": "12 Elm St",
                        "phone": "555-0101", "email": "ava@example.com"
                    })),
                    _ => Json(json!({})),
                }
            }),
        )
        .route(
            "/api/customer_invoices",
            get(|Query(params): Params| async move {
                match param(&params, "customer_id").as_str() {
                    "C0001" => Json(json!([
                        {"invoice_id": "INV-2", "date": "2024-05-03", "items": ["Washer"], "total": 899.0},
                        {"invoice_id": "INV-1", "date": "2024-04-01", "items": ["Grill"], "total": 431.25}
                    ])),
                    _ => Json(json!([])),
                }
            }),
        )
        .route(
            "/api/customer_history",
            get(|Query(params): Params| async move {
                match param(&params, "customer_id").as_str() {
                    "C0001" => Json(json!([
                        {"date": "2024-04-01", "item": "Grill"},
                        {"date": "2024-05-03", "item": "Washer"}
                    ])),
                    _ => Json(json!([])),
                }
            }),
        )
        .route(
            "/api/recent_purchase",
            get(|Query(params): Params| async move {
                Json(json!({"customer_id": param(&params, "customer_id"), "recent_item": "Washer"}))
            }),
        )
        .route(
            "/api/suggest",
            get(|Query(params): Params| async move {
                let item = param(&params, "item");
                match item.as_str() {
                    "Washer" => (
                        StatusCode::OK,
                        Json(json!({"item": item, "suggestions": [
                            {"item": "Dryer", "score": 0.82, "probability": 0.42, "support": 0.12, "similarity": 0.5}
                        ]})),
                    ),
                    "Grill" => (StatusCode::OK, Json(json!({"item": item}))),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"error": "unknown item"}))),
                }
            }),
        )
        .route(
            "/api/additional_recs",
            get(|| async {
                Json(json!({"customer_id": "C0001", "suggestions": [
                    {"item": "Range Hood", "score": 0.55, "probability": 0.2, "support": 0.04, "similarity": 0.1, "room": "Kitchen"}
                ]}))
            }),
        )
        .route(
            "/api/customer_insights",
            get(|| async {
                (StatusCode::SERVICE_UNAVAILABLE, Json(json!({"error": "OpenAI service not available"})))
            }),
        )
        .route(
            "/api/recommendation_explanation",
            post(|Json(_body): Json<Value>| async {
                Json(json!({
                    "success": true,
                    "explanation": "A dryer pairs with the washer to save money on laundromat trips. Hoses protect against leaks and water damage."
                }))
            }),
        )
}

struct FakeBackend {
    _runtime: Runtime,
    base_url: String,
}

impl FakeBackend {
    fn start() -> Self {
        let runtime = Runtime::new().expect("test runtime");
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind fake backend");
        let address = listener.local_addr().expect("local addr");
        runtime.spawn(async move {
            let _ = axum::serve(listener, router()).await;
        });
        Self { _runtime: runtime, base_url: format!("http://{address}") }
    }

    fn options(&self) -> LoadOptions {
        options_for(&self.base_url)
    }
}

fn options_for(base_url: &str) -> LoadOptions {
    LoadOptions {
        overrides: ConfigOverrides {
            backend_base_url: Some(base_url.to_string()),
            request_timeout_secs: Some(5),
            ..ConfigOverrides::default()
        },
        ..LoadOptions::default()
    }
}

#[test]
fn customers_lists_id_and_name_options() {
    with_env(&[], || {
        let backend = FakeBackend::start();

        let result = customers::run(&backend.options());

        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert_eq!(result.output, "C0001 — Ava Brown\nC0002 — Liam Chen");
    });
}

#[test]
fn catalog_shows_indicator_and_refused_duplicate() {
    with_env(&[], || {
        let backend = FakeBackend::start();

        let result = catalog::run(&backend.options(), &SlotArgs::new(["Washer", "Washer"]));

        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert!(result.output.starts_with("Selection: 1 / 3 selected"));
        assert!(result.output.contains("Washer  [*--]"));
        assert!(result.output.contains("note: slot 2 ignored: Washer is already selected"));
    });
}

#[test]
fn customer_view_hides_unavailable_insights() {
    with_env(&[], || {
        let backend = FakeBackend::start();

        let result = customer::run(&backend.options(), "C0001");

        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert!(result.output.contains("Ava Brown"));
        assert!(result.output.contains("555-0101 · ava@example.com"));
        assert!(result.output.contains("Total: $899.00"));
        assert!(result.output.contains("Total: $431.25"));
        assert!(result.output.contains("No purchases before the recent invoices."));
        assert!(!result.output.contains("Customer insights"));
    });
}

#[test]
fn customer_without_history_says_so() {
    with_env(&[], || {
        let backend = FakeBackend::start();

        let result = customer::run(&backend.options(), "C0002");

        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert!(result.output.contains("Customer C0002 has no details on file."));
        assert!(result.output.contains("No recent invoices."));
        assert!(result.output.contains("No history found."));
    });
}

#[test]
fn suggest_without_selection_is_a_bad_request() {
    with_env(&[], || {
        let backend = FakeBackend::start();

        let result = suggest::run(&backend.options(), &SuggestArgs::default());

        assert_eq!(result.exit_code, 2);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "suggest");
        assert_eq!(payload["error_class"], "bad_request");
        assert_eq!(payload["message"], "Select up to 3 products to add to the invoice.");
    });
}

#[test]
fn suggest_renders_columns_rooms_and_explanation() {
    with_env(&[], || {
        let backend = FakeBackend::start();
        let args = SuggestArgs {
            customer: Some("C0001".to_string()),
            slots: SlotArgs::new(["Washer", "Grill"]),
            ..SuggestArgs::default()
        };

        let result = suggest::run(&backend.options(), &args);

        assert_eq!(result.exit_code, 0, "{}", result.output);
        let washer = result.output.find("== Washer ==").expect("washer column");
        let grill = result.output.find("== Grill ==").expect("grill column");
        assert!(washer < grill, "columns follow slot order");
        assert!(result.output.contains("Dryer  Probability: 42.0% | Score: 82.0"));
        assert!(result.output.contains("== Grill ==\n  No suggestions"));
        assert!(result.output.contains("== For their rooms =="));
        assert!(result.output.contains("Support: 0.04, Similarity: 0.1 · Room: Kitchen"));
        assert!(result.output.contains("💰 Cost Savings"));
        assert!(result.output.contains("🛡️ Protection Plan"));
    });
}

#[test]
fn suggest_recent_prefills_first_slot() {
    with_env(&[], || {
        let backend = FakeBackend::start();
        let args = SuggestArgs {
            customer: Some("C0001".to_string()),
            recent: true,
            no_explain: true,
            ..SuggestArgs::default()
        };

        let result = suggest::run(&backend.options(), &args);

        assert_eq!(result.exit_code, 0, "{}", result.output);
        assert!(result.output.contains("note: added recent purchase Washer to the selection"));
        assert!(result.output.contains("Selection: 1 / 3 selected"));
        assert!(!result.output.contains("Cost Savings"));
    });
}

#[test]
fn suggest_fails_whole_batch_when_one_item_fails() {
    with_env(&[], || {
        let backend = FakeBackend::start();
        let args = SuggestArgs { slots: SlotArgs::new(["Washer", "Mystery Box"]), ..SuggestArgs::default() };

        let result = suggest::run(&backend.options(), &args);

        assert_eq!(result.exit_code, 3);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "service_unavailable");
        assert_eq!(payload["message"], "Sorry, couldn't load suggestions. Check the logs for details.");
        assert!(payload["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    });
}

#[test]
fn unreachable_backend_is_reported_as_unavailable() {
    with_env(&[], || {
        let result = customers::run(&options_for("http://127.0.0.1:9"));

        assert_eq!(result.exit_code, 3);
        assert_eq!(parse_payload(&result.output)["error_class"], "service_unavailable");
    });
}

#[test]
fn invalid_config_fails_before_any_request() {
    with_env(&[("XSELL_BACKEND_REQUEST_TIMEOUT_SECS", "0")], || {
        let options = LoadOptions::default();

        let result = customers::run(&options);

        assert_eq!(result.exit_code, 2);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "customers");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_redacts_token_and_attributes_sources() {
    with_env(&[("XSELL_BACKEND_API_TOKEN", "pos-secret-token")], || {
        let result = config::run(&options_for("http://pos-backend:5000"));
        let output = &result.output;

        assert_eq!(result.exit_code, 0);
        assert!(output.contains("- backend.base_url = http://pos-backend:5000 (source: flag)"));
        assert!(output.contains("- backend.api_token = <redacted> (source: env (XSELL_BACKEND_API_TOKEN))"));
        assert!(output.contains("- logging.level = info (source: default)"));
        assert!(!output.contains("pos-secret-token"));
    });
}

#[test]
fn config_with_invalid_settings_exits_with_config_code() {
    with_env(&[("XSELL_BACKEND_BASE_URL", "ftp://pos-backend")], || {
        let result = config::run(&LoadOptions::default());

        assert_eq!(result.exit_code, 2);
        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_reports_reachable_backend_as_json() {
    with_env(&[], || {
        let backend = FakeBackend::start();

        let report = doctor::run(&backend.options(), true);

        assert!(report.passed, "{}", report.output);
        let payload = parse_payload(&report.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(payload["checks"][1]["name"], "backend_reachability");
        assert!(payload["checks"][1]["details"].as_str().is_some_and(|details| details.contains("3 catalog products")));
    });
}

#[test]
fn doctor_skips_backend_when_config_is_invalid() {
    with_env(&[], || {
        let report = doctor::run(&options_for("ftp://not-http"), false);

        assert!(!report.passed);
        assert!(report.output.contains("- [fail] config_validation"));
        assert!(report.output.contains("- [skip] backend_reachability"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "XSELL_BACKEND_BASE_URL",
        "XSELL_BACKEND_API_TOKEN",
        "XSELL_BACKEND_REQUEST_TIMEOUT_SECS",
        "XSELL_LOGGING_LEVEL",
        "XSELL_LOGGING_FORMAT",
        "XSELL_LOG_LEVEL",
        "XSELL_LOG_FORMAT",
    ];
    let saved: Vec<_> = keys.iter().map(|key| (*key, env::var_os(key))).collect();

    for key in keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in saved {
        match value {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}

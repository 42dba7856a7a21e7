use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use sha2::{Digest, Sha256};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use helpdesk_core::audit::{create_audit_system, AuditEvent, AuditStore, SqliteAuditStore};
use helpdesk_core::directory::SqliteDirectory;
use helpdesk_core::providers::{
    AnthropicClient, LlmClassifier, LlmClient, LlmComposer, LlmSolver, OllamaClient,
};
use helpdesk_core::ticket::{CustomerRecord, SqliteTicketStore, TicketStore};
use helpdesk_core::{load_config, validate_config, LlmConfig, LlmProvider, TicketOrchestrator};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Buffer size for audit event channel
const AUDIT_BUFFER_SIZE: usize = 1000;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("HELPDESK_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    info!("Configuration loaded successfully");
    info!("Database path: {:?}", config.database.path);
    info!("Reply language: {}", config.reply.language);

    // Compute config hash for audit
    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    let config_hash_short = &config_hash[..16];

    // Create SQLite audit store
    let audit_store: Arc<dyn AuditStore> = Arc::new(
        SqliteAuditStore::new(&config.database.path).context("Failed to create audit store")?,
    );
    info!("Audit store initialized");

    // Create SQLite ticket store
    let ticket_store: Arc<dyn TicketStore> = Arc::new(
        SqliteTicketStore::new(&config.database.path).context("Failed to create ticket store")?,
    );
    info!("Ticket store initialized");

    // Create SQLite customer directory and seed the demo customers
    let directory = Arc::new(
        SqliteDirectory::new(&config.database.path)
            .context("Failed to create customer directory")?,
    );
    seed_demo_customers(&directory)?;
    info!("Customer directory initialized");

    // Create LLM client
    let llm_config = config
        .llm
        .as_ref()
        .context("An [llm] section is required to process tickets")?;
    let llm = create_llm_client(llm_config)?;
    info!(
        "Using LLM backend: {} ({})",
        llm.provider(),
        llm.model()
    );

    // Create audit system
    let (audit_handle, audit_writer) =
        create_audit_system(Arc::clone(&audit_store), AUDIT_BUFFER_SIZE);

    // Spawn audit writer task
    let writer_handle = tokio::spawn(audit_writer.run());

    // Emit ServiceStarted event
    audit_handle
        .emit(AuditEvent::ServiceStarted {
            version: VERSION.to_string(),
            config_hash: config_hash_short.to_string(),
        })
        .await;

    // Assemble the orchestrator
    let orchestrator = TicketOrchestrator::new(
        Arc::new(LlmClassifier::new(Arc::clone(&llm))),
        directory,
        Arc::new(LlmSolver::new(Arc::clone(&llm))),
        Arc::new(LlmComposer::new(Arc::clone(&llm), config.reply.clone())),
        Arc::clone(&ticket_store),
    )
    .with_audit(audit_handle.clone());

    // Tickets come from files named on the command line, or from the
    // built-in demo set when none are given.
    let args: Vec<String> = std::env::args().skip(1).collect();
    let tickets: Vec<String> = if args.is_empty() {
        info!("No ticket files given, running the demo set");
        demo_tickets()
    } else {
        let mut tickets = Vec::new();
        for path in &args {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read ticket file {}", path))?;
            tickets.push(text);
        }
        tickets
    };

    for (i, text) in tickets.iter().enumerate() {
        println!("\n=== Ticket {} ===", i + 1);
        match orchestrator.process(text, None).await {
            Ok(processed) => {
                println!("Ticket ID:          {}", processed.ticket_id);
                println!(
                    "Type / Urgency:     {} / {}",
                    processed.classification.category.as_str(),
                    processed.classification.urgency.as_str()
                );
                println!(
                    "Estimated effort:   {}",
                    processed.classification.estimated_effort.as_str()
                );
                println!(
                    "Routing efficiency: {}/{} stages",
                    processed.trace.executed_count(),
                    helpdesk_core::audit::StageKind::COUNT
                );
                if processed.is_degraded() {
                    println!("Note:               processed in degraded mode");
                }
                println!("\n{}", processed.reply);
            }
            Err(e) => {
                error!("Ticket {} failed: {:#}", i + 1, e);
            }
        }
    }

    // Emit ServiceStopped and drain the audit channel
    audit_handle
        .emit(AuditEvent::ServiceStopped {
            reason: "shutdown".to_string(),
        })
        .await;
    drop(orchestrator);
    drop(audit_handle);
    writer_handle.await.context("Audit writer task panicked")?;

    Ok(())
}

fn create_llm_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(config.timeout_secs as u64);
    match config.provider {
        LlmProvider::Anthropic => {
            let Some(api_key) = &config.api_key else {
                bail!("llm.api_key is required for the anthropic provider");
            };
            let mut client = AnthropicClient::new(api_key, &config.model).with_timeout(timeout);
            if let Some(api_base) = &config.api_base {
                client = client.with_api_base(api_base);
            }
            Ok(Arc::new(client))
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(&config.model).with_timeout(timeout);
            if let Some(api_base) = &config.api_base {
                client = client.with_api_base(api_base);
            }
            Ok(Arc::new(client))
        }
    }
}

/// Seed the customers the demo tickets refer to.
fn seed_demo_customers(directory: &SqliteDirectory) -> Result<()> {
    let customers = [
        CustomerRecord {
            customer_id: "CUST001".to_string(),
            name: Some("Anna Keller".to_string()),
            email: Some("anna.keller@example.com".to_string()),
            plan: Some("Premium".to_string()),
            join_date: Some("2023-04-01".to_string()),
            last_payment: Some("2026-08-01".to_string()),
            support_history: vec!["2025-11: double charge refunded".to_string()],
        },
        CustomerRecord {
            customer_id: "CUST002".to_string(),
            name: Some("Marco Bianchi".to_string()),
            email: Some("marco.bianchi@example.com".to_string()),
            plan: Some("Business".to_string()),
            join_date: Some("2021-09-15".to_string()),
            last_payment: Some("2026-08-10".to_string()),
            support_history: vec![
                "2024-06: VPN setup assistance".to_string(),
                "2026-02: password reset".to_string(),
            ],
        },
    ];

    for customer in customers {
        directory
            .upsert(&customer)
            .context("Failed to seed demo customer")?;
    }
    Ok(())
}

fn demo_tickets() -> Vec<String> {
    vec![
        "Subject: Wrong amount on my invoice\n\n\
         Hello, I was charged twice this month. Please check my account \
         and refund the difference. Customer ID: CUST001"
            .to_string(),
        "Subject: URGENT - production system down\n\n\
         Our whole team cannot log in since this morning, the dashboard \
         shows error 502. We are losing money every minute! \
         Customer ID: CUST002"
            .to_string(),
        "Subject: Question about your opening hours\n\n\
         Hi, what are your support hours over the holidays? Thanks!"
            .to_string(),
    ]
}

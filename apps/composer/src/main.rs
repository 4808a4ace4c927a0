use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use composer::config::Config;
use composer::document::DocumentModel;
use composer::draft::{DraftStore, RedisDraftBackend};
use composer::enhance::{DisabledCapability, EnhancementCapability, Tone};
use composer::export::ExportMode;
use composer::ingest::{IngestionCapability, LlmIngestor};
use composer::llm_client::{LlmClient, LlmConfig};
use composer::store::{MemoryRecordStore, PgRecordStore, RecordPayload, RemoteRecordStore};
use composer::style::StyleModel;
use composer::templates::{StaticCatalog, TemplateCatalog};
use composer::wizard::WizardStep;
use composer::{AppState, EditingSession, EnhancementOutcome};

const USAGE: &str = "usage: composer <document.json> [template-id]";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting composer v{}", env!("CARGO_PKG_VERSION"));

    let mut args = std::env::args().skip(1);
    let Some(document_path) = args.next() else {
        bail!(USAGE);
    };
    let template_arg = args.next();

    let raw = tokio::fs::read_to_string(&document_path)
        .await
        .with_context(|| format!("Failed to read document '{document_path}'"))?;
    let document: DocumentModel = serde_json::from_str(&raw)
        .with_context(|| format!("'{document_path}' is not a valid document"))?;

    let state = build_state(&config).await?;

    let template = match template_arg {
        Some(id) => state
            .catalog
            .get_template(&id)
            .with_context(|| format!("Unknown template '{id}'"))?,
        None => state
            .catalog
            .templates_for(document.kind)
            .into_iter()
            .next()
            .context("Catalog has no template for this document kind")?,
    };
    if !template.supports(document.kind) {
        bail!(
            "Template '{}' does not support {}",
            template.id,
            document.kind.as_str()
        );
    }
    info!(template = %template.id, kind = document.kind.as_str(), "Composing document");

    // Seed a record so the session runs the same open/edit/save path as the app
    let user_id = Uuid::new_v4();
    let payload = RecordPayload::encode(user_id, &document, &StyleModel::for_template(&template))?;
    let record_id = state.records.create(&payload).await?;
    let mut session = EditingSession::open_existing(&state, state.records.as_ref(), record_id).await?;
    session.jump_to(WizardStep::Review);

    if config.anthropic_api_key.is_some() {
        match session.enhance(Tone::default()).await {
            Ok(EnhancementOutcome::Applied { version }) => info!(version, "Enhancement applied"),
            Ok(EnhancementOutcome::Failed(e)) => warn!("Enhancement failed, exporting original: {e}"),
            Ok(EnhancementOutcome::Discarded) => warn!("Enhancement result discarded"),
            Err(e) => warn!("Enhancement unavailable: {e}"),
        }
    }

    let saved = session.save(state.records.as_ref()).await?;
    info!(record_id = %saved, "Record saved");

    let artifact = session
        .export(ExportMode::default_for(document.kind))
        .await?;
    let path = artifact.write_to(&config.export_dir).await?;
    info!(
        path = %path.display(),
        pages = artifact.page_count,
        "Export complete"
    );

    session.close();
    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let llm = match &config.anthropic_api_key {
        Some(key) => {
            let mut llm_config = LlmConfig::new(key.clone());
            if let Some(model) = &config.anthropic_model {
                llm_config.model = model.clone();
            }
            let client = LlmClient::new(llm_config)?;
            info!("LLM client initialized (model: {})", client.model());
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set, enhancement disabled");
            None
        }
    };

    let capability: Arc<dyn EnhancementCapability> = match &llm {
        Some(client) => Arc::new(client.clone()),
        None => Arc::new(DisabledCapability),
    };
    let ingestor = llm
        .map(|client| Arc::new(LlmIngestor::new(client)) as Arc<dyn IngestionCapability>);

    let drafts = match &config.redis_url {
        Some(url) => DraftStore::new(Arc::new(RedisDraftBackend::new(url, config.draft_ttl_secs)?)),
        None => {
            info!("REDIS_URL not set, drafts kept in memory");
            DraftStore::memory()
        }
    };

    let records: Arc<dyn RemoteRecordStore> = match &config.database_url {
        Some(url) => {
            let store = PgRecordStore::connect(url).await?;
            store.ensure_schema().await?;
            Arc::new(store)
        }
        None => {
            info!("DATABASE_URL not set, records kept in memory");
            Arc::new(MemoryRecordStore::default())
        }
    };

    Ok(AppState {
        catalog: Arc::new(StaticCatalog::builtin()),
        capability,
        ingestor,
        drafts,
        records,
        draft_debounce: config.draft_debounce,
    })
}

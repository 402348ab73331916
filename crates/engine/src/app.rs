//! Application state and composition.

use std::sync::Arc;

use npcsmith_domain::{
    DomainError, GenerationRequest, HostTypes, RuleSystemRegistry, TypeRegistry,
};

use crate::infrastructure::{
    clock::{SystemClock, SystemRandom},
    config::GeneratorConfig,
    export::JsonExporter,
    importers::FiveToolsCatalog,
    memory_catalog::MemoryCatalog,
    openai::OpenAiClient,
    ports::{CatalogPort, ClockPort, LlmPort, RandomPort, RecordStorePort},
    record_store::InMemoryRecordStore,
};
use crate::use_cases::npc_generation::GenerateNpcs;

/// Main application state.
///
/// Holds the generation use case and the exporter, wired to concrete
/// adapters.
pub struct App {
    pub generate_npcs: GenerateNpcs,
    pub exporter: JsonExporter,
    pub records: Arc<dyn RecordStorePort>,
}

impl App {
    /// Wire the production adapters from configuration.
    pub fn new(config: GeneratorConfig) -> Self {
        let llm: Arc<dyn LlmPort> = Arc::new(OpenAiClient::with_timeout(
            &config.base_url,
            &config.api_key,
            &config.model,
            config.request_timeout_secs,
        ));

        let catalog: Arc<dyn CatalogPort> = match &config.fivetools_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Using 5etools catalog");
                Arc::new(FiveToolsCatalog::new(path))
            }
            None => {
                tracing::info!("FIVETOOLS_DATA_PATH not set, catalog lookups will miss");
                Arc::new(MemoryCatalog::new())
            }
        };

        let random: Arc<dyn RandomPort> = Arc::new(SystemRandom::new());
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let records: Arc<dyn RecordStorePort> =
            Arc::new(InMemoryRecordStore::with_random(random.clone()));

        Self::from_parts(llm, catalog, records, random, clock, config)
    }

    /// Wire the use case from explicit ports.
    pub fn from_parts(
        llm: Arc<dyn LlmPort>,
        catalog: Arc<dyn CatalogPort>,
        records: Arc<dyn RecordStorePort>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        config: GeneratorConfig,
    ) -> Self {
        let types = type_registry(&config.rule_system);
        Self {
            generate_npcs: GenerateNpcs::new(llm, catalog, records.clone(), random, types, config),
            exporter: JsonExporter::new(clock),
            records,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        self.generate_npcs.config()
    }

    /// A request for `count` NPCs using the configured sampling defaults.
    pub fn request(
        &self,
        count: u32,
        prompt: Option<String>,
    ) -> Result<GenerationRequest, DomainError> {
        let config = self.config();
        let request = GenerationRequest::new(count, config.model.clone())?
            .with_temperature(config.temperature)
            .with_top_p(config.top_p)
            .with_max_tokens(Some(i64::from(config.max_tokens)));
        Ok(match prompt {
            Some(prompt) => request.with_prompt(prompt),
            None => request,
        })
    }
}

/// Type registry for the configured rule system.
///
/// An unknown system id leaves the registry on host and label types.
pub fn type_registry(rule_system: &str) -> TypeRegistry {
    let system = RuleSystemRegistry::new().get(rule_system);
    if system.is_none() {
        tracing::warn!(rule_system, "Unknown rule system, using host types only");
    }
    TypeRegistry::for_host(system, HostTypes::default())
}

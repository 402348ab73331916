//! NPC generation use case.
//!
//! Sequences one generation request end to end:
//!
//! 1. build the prompt and send one chat-completion request
//! 2. parse the raw text into a list of untyped records
//! 3. normalize, resolve and materialize each record in input order
//!
//! Configuration, transport and parse failures abort the batch. Anything
//! that goes wrong after parsing is recorded against the one record and the
//! batch continues.

pub mod prompt;
pub mod resolver;
pub mod response_parser;

use std::fmt;
use std::sync::Arc;

use npcsmith_domain::{
    DomainError, GenerationRequest, NormalizedCharacter, RecordNormalizer, TypeRegistry,
    ValidationWarning,
};
use serde_json::Value;

use crate::infrastructure::config::{validate_sampling, ConfigError, GeneratorConfig};
use crate::infrastructure::ports::{
    CatalogError, CatalogPort, LlmError, LlmPort, RandomPort, RecordHandle, RecordStoreError,
    RecordStorePort,
};

pub use resolver::{CatalogResolver, ItemResolver, ResolutionStats};
pub use response_parser::{parse_generated_records, ParseError};

/// Failures that abort the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Transport error: {0}")]
    Transport(#[from] LlmError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failures isolated to one record.
#[derive(Debug, thiserror::Error)]
pub enum RecordFailure {
    #[error("Normalization failed: {0}")]
    Normalization(#[from] DomainError),
    #[error("Catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),
    #[error("Record creation failed: {0}")]
    Creation(#[from] RecordStoreError),
    /// The record exists in the host but its items could not be added.
    #[error("Record {handle} was created but embedding its items failed: {source}")]
    Embedding {
        handle: RecordHandle,
        #[source]
        source: RecordStoreError,
    },
}

/// Result of processing one parsed record.
#[derive(Debug)]
pub enum RecordOutcome {
    Materialized {
        index: usize,
        handle: RecordHandle,
        character: NormalizedCharacter,
        stats: ResolutionStats,
    },
    Failed {
        index: usize,
        name: Option<String>,
        failure: RecordFailure,
    },
}

impl RecordOutcome {
    pub fn index(&self) -> usize {
        match self {
            Self::Materialized { index, .. } | Self::Failed { index, .. } => *index,
        }
    }

    pub fn is_materialized(&self) -> bool {
        matches!(self, Self::Materialized { .. })
    }

    pub fn character(&self) -> Option<&NormalizedCharacter> {
        match self {
            Self::Materialized { character, .. } => Some(character),
            Self::Failed { .. } => None,
        }
    }
}

/// Counts reported after a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationSummary {
    pub requested: u32,
    pub parsed: usize,
    pub materialized: usize,
    pub failed: usize,
    pub validation_warnings: usize,
}

impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Created {} of {} NPCs ({} parsed, {} failed, {} validation warnings)",
            self.materialized, self.requested, self.parsed, self.failed, self.validation_warnings
        )
    }
}

/// Everything produced by one batch.
#[derive(Debug)]
pub struct GenerationOutcome {
    /// Unmodified service output, kept for diagnosis.
    pub raw_response: String,
    /// One outcome per parsed record, in input order.
    pub records: Vec<RecordOutcome>,
    pub warnings: Vec<ValidationWarning>,
    pub summary: GenerationSummary,
}

impl GenerationOutcome {
    pub fn characters(&self) -> impl Iterator<Item = &NormalizedCharacter> {
        self.records.iter().filter_map(RecordOutcome::character)
    }

    /// Host documents of every created record, in input order.
    pub fn export_records(&self) -> Vec<Value> {
        self.characters()
            .map(NormalizedCharacter::to_document)
            .collect()
    }
}

/// The generation orchestrator.
pub struct GenerateNpcs {
    llm: Arc<dyn LlmPort>,
    records: Arc<dyn RecordStorePort>,
    random: Arc<dyn RandomPort>,
    resolver: ItemResolver,
    types: TypeRegistry,
    config: GeneratorConfig,
}

impl GenerateNpcs {
    pub fn new(
        llm: Arc<dyn LlmPort>,
        catalog: Arc<dyn CatalogPort>,
        records: Arc<dyn RecordStorePort>,
        random: Arc<dyn RandomPort>,
        types: TypeRegistry,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            llm,
            records,
            random,
            resolver: ItemResolver::new(CatalogResolver::new(catalog)),
            types,
            config,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Run one generation batch.
    pub async fn execute(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, GenerationError> {
        self.config.validate()?;
        if request.model().trim().is_empty() {
            return Err(ConfigError::MissingModel.into());
        }
        validate_sampling(request.temperature(), request.top_p())?;

        let item_types = self.types.valid_item_types();
        let llm_request = prompt::build_request(request, &item_types);

        tracing::info!(
            count = request.count(),
            model = %request.model(),
            "Requesting NPC generation"
        );

        let response = self.llm.generate(llm_request).await.map_err(|e| {
            tracing::warn!(error = %e, "NPC generation request failed");
            GenerationError::Transport(e)
        })?;
        let raw_response = response.content;

        let parsed = parse_generated_records(&raw_response)?;
        if parsed.len() != request.count() as usize {
            tracing::warn!(
                requested = request.count(),
                parsed = parsed.len(),
                "Service returned a different number of NPCs than requested"
            );
        }

        let mut records = Vec::with_capacity(parsed.len());
        let mut warnings = Vec::new();
        for (index, raw) in parsed.iter().enumerate() {
            records.push(self.process_record(index, raw, &mut warnings).await);
        }

        let materialized = records.iter().filter(|r| r.is_materialized()).count();
        let summary = GenerationSummary {
            requested: request.count(),
            parsed: parsed.len(),
            materialized,
            failed: records.len() - materialized,
            validation_warnings: warnings.len(),
        };
        tracing::info!(
            requested = summary.requested,
            parsed = summary.parsed,
            materialized = summary.materialized,
            failed = summary.failed,
            validation_warnings = summary.validation_warnings,
            "NPC generation finished"
        );

        Ok(GenerationOutcome {
            raw_response,
            records,
            warnings,
            summary,
        })
    }

    async fn process_record(
        &self,
        index: usize,
        raw: &Value,
        warnings: &mut Vec<ValidationWarning>,
    ) -> RecordOutcome {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string);

        match self.materialize(raw, warnings).await {
            Ok((handle, character, stats)) => {
                tracing::info!(index, handle = %handle, npc = %character.name, "Created NPC");
                RecordOutcome::Materialized {
                    index,
                    handle,
                    character,
                    stats,
                }
            }
            Err(failure) => {
                tracing::warn!(index, npc = ?name, error = %failure, "Failed to create NPC");
                RecordOutcome::Failed {
                    index,
                    name,
                    failure,
                }
            }
        }
    }

    async fn materialize(
        &self,
        raw: &Value,
        warnings: &mut Vec<ValidationWarning>,
    ) -> Result<(RecordHandle, NormalizedCharacter, ResolutionStats), RecordFailure> {
        let draft = RecordNormalizer::new(&self.types)
            .normalize(raw, |min, max| self.random.gen_range(min, max))?;

        for warning in &draft.warnings {
            tracing::warn!(warning = %warning, "Validation warning");
        }
        warnings.extend(draft.warnings.iter().cloned());

        let (character, stats) = self.resolver.resolve(draft).await?;

        let handle = self.records.create_record(&character.to_record_data()).await?;
        if !character.sub_items.is_empty() {
            self.records
                .create_embedded_items(handle, &character.sub_items)
                .await
                .map_err(|source| RecordFailure::Embedding { handle, source })?;
        }
        Ok((handle, character, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::FixedRandom;
    use crate::infrastructure::memory_catalog::MemoryCatalog;
    use crate::infrastructure::ports::{
        FinishReason, LlmRequest, LlmResponse, MockRecordStorePort,
    };
    use crate::infrastructure::record_store::InMemoryRecordStore;
    use async_trait::async_trait;
    use npcsmith_domain::{CatalogRecord, Dnd5eSystem, HostTypes};
    use serde_json::json;
    use std::sync::Mutex;

    struct MockLlm {
        response: Result<String, String>,
        calls: Mutex<Vec<LlmRequest>>,
    }

    impl MockLlm {
        fn new(response: impl Into<String>) -> Self {
            Self {
                response: Ok(response.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: impl Into<String>) -> Self {
            Self {
                response: Err(message.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl LlmPort for MockLlm {
        async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(request);
            }
            match &self.response {
                Ok(content) => Ok(LlmResponse {
                    content: content.clone(),
                    finish_reason: FinishReason::Stop,
                    usage: None,
                }),
                Err(message) => Err(LlmError::RequestFailed(message.clone())),
            }
        }
    }

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            api_key: "sk-test".into(),
            ..GeneratorConfig::default()
        }
    }

    fn types() -> TypeRegistry {
        TypeRegistry::for_host(Some(Arc::new(Dnd5eSystem::new())), HostTypes::default())
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new()
            .with_record(CatalogRecord {
                catalog_id: "dnd5e.spells".into(),
                entry_id: "5e_phb_fireball".into(),
                name: "Fireball".into(),
                item_type: "spell".into(),
                data: json!({"level": 3, "source": "PHB"}),
            })
            .with_record(CatalogRecord {
                catalog_id: "dnd5e.feats".into(),
                entry_id: "5e_mm_multiattack".into(),
                name: "Multiattack".into(),
                item_type: "feat".into(),
                data: json!({"source": "MM"}),
            })
    }

    fn generator(
        llm: Arc<MockLlm>,
        records: Arc<dyn RecordStorePort>,
        config: GeneratorConfig,
    ) -> GenerateNpcs {
        GenerateNpcs::new(
            llm,
            Arc::new(catalog()),
            records,
            Arc::new(FixedRandom(7)),
            types(),
            config,
        )
    }

    fn request(count: u32) -> GenerationRequest {
        GenerationRequest::new(count, "x")
            .expect("valid count")
            .with_temperature(0.8)
            .with_top_p(1.0)
            .with_max_tokens(Some(500))
    }

    const TWO_NPCS: &str = r#"Sure! Here are your NPCs:
{"npcs": [
  {"name": "Pip Quickfoot", "type": "npc", "cr": "1/2", "species": "Halfling"},
  {"name": "Grumbar Ironfoot", "type": "npc", "cr": 5,
   "items": [{"name": "Mystery Box", "type": "junk"}]}
]}
Let me know if you need more."#;

    #[tokio::test]
    async fn two_npc_batch_end_to_end() {
        let llm = Arc::new(MockLlm::new(TWO_NPCS));
        let store = Arc::new(InMemoryRecordStore::new());
        let generator = generator(llm.clone(), store.clone(), config());

        let outcome = generator.execute(&request(2)).await.expect("batch succeeds");

        let characters: Vec<&NormalizedCharacter> = outcome.characters().collect();
        assert_eq!(characters.len(), 2);
        assert_eq!(characters[0].name, "Pip Quickfoot");
        assert_eq!(characters[0].challenge_rating, 0.5);
        assert_eq!(characters[1].challenge_rating, 5.0);
        assert!(characters[1].sub_items.is_empty());

        assert_eq!(outcome.warnings.len(), 1);
        assert!(matches!(
            &outcome.warnings[0],
            ValidationWarning::ItemTypeRejected { item, .. } if item == "Mystery Box"
        ));
        assert_eq!(
            outcome.summary,
            GenerationSummary {
                requested: 2,
                parsed: 2,
                materialized: 2,
                failed: 0,
                validation_warnings: 1,
            }
        );
        assert_eq!(llm.call_count(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(outcome.raw_response, TWO_NPCS);
    }

    #[tokio::test]
    async fn export_includes_records_without_items() {
        let llm = Arc::new(MockLlm::new(TWO_NPCS));
        let generator = generator(llm, Arc::new(InMemoryRecordStore::new()), config());

        let outcome = generator.execute(&request(2)).await.expect("batch succeeds");
        let exported = outcome.export_records();

        assert_eq!(exported.len(), 2);
        assert_eq!(exported[0]["name"], "Pip Quickfoot");
        assert_eq!(exported[0]["items"], json!([]));
        assert_eq!(exported[1]["system"]["details"]["cr"], 5.0);
    }

    #[tokio::test]
    async fn catalog_resolution_replaces_spells_and_adds_features() {
        let llm = Arc::new(MockLlm::new(
            json!([{
                "name": "Archmage",
                "cr": 12,
                "items": [
                    {"name": "fireball", "type": "spell", "system": {"level": 9}},
                    {"name": "Quarterstaff", "type": "weapon", "system": {"damage": "1d6"}}
                ],
                "actions": ["Multiattack", "Arcane Burst"]
            }])
            .to_string(),
        ));
        let store = Arc::new(InMemoryRecordStore::new());
        let generator = generator(llm, store.clone(), config());

        let outcome = generator.execute(&request(1)).await.expect("batch succeeds");

        let RecordOutcome::Materialized {
            handle,
            character,
            stats,
            ..
        } = &outcome.records[0]
        else {
            panic!("record should be materialized");
        };
        let names: Vec<&str> = character.sub_items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Fireball", "Quarterstaff", "Multiattack"]);
        assert_eq!(character.sub_items[0].payload, json!({"level": 3, "source": "PHB"}));
        assert_eq!(stats.actions_omitted, 1);

        let stored = store.get(*handle).expect("stored");
        assert_eq!(stored["items"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn unparsable_cr_uses_injected_random() {
        let llm = Arc::new(MockLlm::new(r#"{"name": "Odd", "cr": "deadly"}"#));
        let generator = generator(llm, Arc::new(InMemoryRecordStore::new()), config());

        let outcome = generator.execute(&request(1)).await.expect("batch succeeds");
        let character = outcome.characters().next().expect("one character");
        assert_eq!(character.challenge_rating, 7.0);
    }

    #[tokio::test]
    async fn missing_api_key_sends_nothing() {
        let llm = Arc::new(MockLlm::new(TWO_NPCS));
        let generator = generator(
            llm.clone(),
            Arc::new(InMemoryRecordStore::new()),
            GeneratorConfig::default(),
        );

        let err = generator.execute(&request(2)).await.expect_err("no key");
        assert!(matches!(err, GenerationError::Config(ConfigError::MissingApiKey)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn blank_model_is_config_error() {
        let llm = Arc::new(MockLlm::new(TWO_NPCS));
        let generator = generator(llm.clone(), Arc::new(InMemoryRecordStore::new()), config());

        let request = request(1).with_model("  ");
        let err = generator.execute(&request).await.expect_err("no model");
        assert!(matches!(err, GenerationError::Config(ConfigError::MissingModel)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn out_of_range_request_sampling_sends_nothing() {
        let llm = Arc::new(MockLlm::new(TWO_NPCS));
        let generator = generator(llm.clone(), Arc::new(InMemoryRecordStore::new()), config());

        let hot = request(2).with_temperature(7.5);
        let err = generator.execute(&hot).await.expect_err("temperature");
        assert!(matches!(
            err,
            GenerationError::Config(ConfigError::Invalid { key: "temperature", .. })
        ));

        let wide = request(2).with_top_p(3.0);
        let err = generator.execute(&wide).await.expect_err("top_p");
        assert!(matches!(
            err,
            GenerationError::Config(ConfigError::Invalid { key: "top_p", .. })
        ));

        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn transport_failure_aborts_batch() {
        let llm = Arc::new(MockLlm::failing("connection refused"));
        let store = Arc::new(InMemoryRecordStore::new());
        let generator = generator(llm, store.clone(), config());

        let err = generator.execute(&request(2)).await.expect_err("transport");
        assert!(matches!(err, GenerationError::Transport(LlmError::RequestFailed(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn parse_failure_keeps_raw_text() {
        let llm = Arc::new(MockLlm::new("I'm sorry, I can't do that."));
        let generator = generator(llm, Arc::new(InMemoryRecordStore::new()), config());

        match generator.execute(&request(2)).await {
            Err(GenerationError::Parse(e)) => assert_eq!(e.raw, "I'm sorry, I can't do that."),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn non_object_record_fails_alone() {
        let llm = Arc::new(MockLlm::new(r#"[{"name": "Valid", "cr": 1}, "not an npc"]"#));
        let generator = generator(llm, Arc::new(InMemoryRecordStore::new()), config());

        let outcome = generator.execute(&request(2)).await.expect("batch succeeds");
        assert!(outcome.records[0].is_materialized());
        assert!(matches!(
            outcome.records[1],
            RecordOutcome::Failed {
                index: 1,
                failure: RecordFailure::Normalization(_),
                ..
            }
        ));
        assert_eq!(outcome.summary.failed, 1);
    }

    #[tokio::test]
    async fn creation_failure_is_isolated_per_record() {
        let mut store = MockRecordStorePort::new();
        let mut calls = 0;
        store.expect_create_record().times(2).returning(move |data| {
            calls += 1;
            if calls == 1 {
                Err(RecordStoreError::creation("create_record", "host rejected record"))
            } else {
                assert_eq!(data["name"], "Grumbar Ironfoot");
                Ok(RecordHandle(uuid::Uuid::nil()))
            }
        });
        store.expect_create_embedded_items().never();

        let llm = Arc::new(MockLlm::new(TWO_NPCS));
        let generator = generator(llm, Arc::new(store), config());

        let outcome = generator.execute(&request(2)).await.expect("batch succeeds");
        match &outcome.records[0] {
            RecordOutcome::Failed { name, failure, .. } => {
                assert_eq!(name.as_deref(), Some("Pip Quickfoot"));
                assert!(matches!(failure, RecordFailure::Creation(_)));
            }
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(outcome.records[1].is_materialized());
        assert_eq!(outcome.summary.materialized, 1);
        assert_eq!(outcome.summary.failed, 1);
    }

    #[tokio::test]
    async fn embedding_failure_keeps_created_handle() {
        let created = RecordHandle(uuid::Uuid::from_u128(42));
        let mut store = MockRecordStorePort::new();
        store
            .expect_create_record()
            .times(1)
            .returning(move |_| Ok(created));
        store
            .expect_create_embedded_items()
            .times(1)
            .returning(|_, _| Err(RecordStoreError::creation("create_embedded_items", "host offline")));

        let llm = Arc::new(MockLlm::new(
            json!([{"name": "Smith", "cr": 1, "items": [{"name": "Hammer", "type": "weapon"}]}])
                .to_string(),
        ));
        let generator = generator(llm, Arc::new(store), config());

        let outcome = generator.execute(&request(1)).await.expect("batch succeeds");
        match &outcome.records[0] {
            RecordOutcome::Failed {
                failure: RecordFailure::Embedding { handle, .. },
                ..
            } => assert_eq!(*handle, created),
            other => panic!("expected embedding failure, got {:?}", other),
        }
        assert_eq!(outcome.summary.failed, 1);
    }

    #[test]
    fn summary_renders_as_notice() {
        let summary = GenerationSummary {
            requested: 2,
            parsed: 2,
            materialized: 2,
            failed: 0,
            validation_warnings: 1,
        };
        assert_eq!(
            summary.to_string(),
            "Created 2 of 2 NPCs (2 parsed, 0 failed, 1 validation warnings)"
        );
    }
}

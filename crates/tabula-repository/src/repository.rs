//! Table repository
//!
//! Owns the in-memory models and is the only place tables are edited.
//! Model and decision names are matched case-insensitively; models are
//! unique by `(name, namespace)` and the first document seen wins.

use std::collections::HashSet;
use tabula_core::ast::{Model, RuleTable};
use tabula_core::types::SchemaResolver;
use tabula_parser::{DecisionTableParser, DecisionTableWriter, ModelParser};
use tokio::sync::RwLock;

use crate::error::{RepositoryError, RepositoryResult};
use crate::models::{ModelSchema, ModelSummary, ParsedTable, SchemaInput, TableSummary, TableView};
use crate::store::ModelStore;

/// A model and the store location it was read from
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub location: String,
    pub model: Model,
}

/// Result of replacing a table in memory
#[derive(Debug, Clone)]
pub struct TableEdit {
    /// Location of the owning model's document
    pub location: String,

    /// Canonical decision name, as declared in the model
    pub decision: String,

    /// The table that was replaced, for rollback
    pub previous: Option<RuleTable>,

    /// The owning model after the edit
    pub model: Model,
}

#[derive(Debug, Default)]
pub struct TableRepository {
    entries: RwLock<Vec<ModelEntry>>,
}

impl TableRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover, parse and deduplicate every model in the store.
    ///
    /// Documents that fail to parse are skipped with a warning.
    pub async fn discover(store: &dyn ModelStore) -> RepositoryResult<Vec<ModelEntry>> {
        let documents = store.discover().await?;
        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(documents.len());

        for document in documents {
            let model = match ModelParser::parse(&document.content) {
                Ok(model) => model,
                Err(e) => {
                    tracing::warn!("Skipping model document {}: {}", document.location, e);
                    continue;
                }
            };

            if !seen.insert(model.identity()) {
                tracing::debug!(
                    "Ignoring duplicate model {} from {}",
                    model.identity(),
                    document.location
                );
                continue;
            }

            entries.push(ModelEntry {
                location: document.location,
                model,
            });
        }

        Ok(entries)
    }

    /// Replace the repository contents with whatever the store holds now
    pub async fn load(&self, store: &dyn ModelStore) -> RepositoryResult<usize> {
        let entries = Self::discover(store).await?;
        let count = entries.len();
        self.install(entries).await;
        tracing::info!("Loaded {} models from {}", count, store.describe());
        Ok(count)
    }

    pub async fn install(&self, entries: Vec<ModelEntry>) {
        *self.entries.write().await = entries;
    }

    /// Copy of every model, in load order
    pub async fn snapshot(&self) -> Vec<Model> {
        self.entries
            .read()
            .await
            .iter()
            .map(|entry| entry.model.clone())
            .collect()
    }

    pub async fn entries(&self) -> Vec<ModelEntry> {
        self.entries.read().await.clone()
    }

    pub async fn list_models(&self) -> Vec<ModelSummary> {
        let entries = self.entries.read().await;
        let mut seen = HashSet::new();
        entries
            .iter()
            .filter(|entry| seen.insert(entry.model.identity()))
            .map(|entry| ModelSummary::from(&entry.model))
            .collect()
    }

    pub async fn get_schema(&self, model_name: &str) -> RepositoryResult<ModelSchema> {
        let entries = self.entries.read().await;
        let model = &find_model(&entries, model_name)?.model;

        let resolver = SchemaResolver::new(&model.type_definitions);
        let mut inputs = Vec::with_capacity(model.inputs.len());
        for input in &model.inputs {
            inputs.push(SchemaInput {
                name: input.name.clone(),
                type_ref: input.type_ref().to_string(),
                schema: resolver.resolve(input.type_ref())?,
            });
        }

        Ok(ModelSchema {
            name: model.name.clone(),
            namespace: model.namespace.clone(),
            inputs,
        })
    }

    pub async fn list_tables(&self, model_name: &str) -> RepositoryResult<Vec<TableSummary>> {
        let entries = self.entries.read().await;
        let model = &find_model(&entries, model_name)?.model;
        Ok(model
            .decisions
            .iter()
            .map(|decision| TableSummary {
                decision_name: decision.name.clone(),
                has_table: decision.has_table(),
            })
            .collect())
    }

    pub async fn get_table(&self, model_name: &str, decision_name: &str) -> RepositoryResult<TableView> {
        let entries = self.entries.read().await;
        let model = &find_model(&entries, model_name)?.model;
        let decision = model
            .find_decision(decision_name)
            .ok_or_else(|| decision_not_found(model_name, decision_name))?;

        let view = match &decision.table {
            Some(table) => TableView {
                decision_name: decision.name.clone(),
                serialized_table: Some(DecisionTableWriter::write_with_declarations(
                    table,
                    &model.attributes,
                )?),
                parsed: ParsedTable::from(table),
            },
            None => TableView {
                decision_name: decision.name.clone(),
                serialized_table: None,
                parsed: ParsedTable::default(),
            },
        };
        Ok(view)
    }

    /// Replace a decision's table with a parsed `decisionTable` fragment.
    ///
    /// Only the in-memory model changes. Rules with fewer input entries than
    /// columns are padded with wildcards.
    pub async fn replace_table(
        &self,
        model_name: &str,
        decision_name: &str,
        table_document: &str,
    ) -> RepositoryResult<TableEdit> {
        if table_document.trim().is_empty() {
            return Err(RepositoryError::Validation(
                "decision table document is required".to_string(),
            ));
        }
        let mut table = DecisionTableParser::parse(table_document)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;

        let padded = table.pad_input_entries();
        if padded > 0 {
            tracing::debug!("Padded {} rules with wildcard input entries", padded);
        }

        let mut entries = self.entries.write().await;
        let entry = find_model_mut(&mut entries, model_name)?;
        let decision = entry
            .model
            .find_decision_mut(decision_name)
            .ok_or_else(|| decision_not_found(model_name, decision_name))?;

        let previous = decision.table.replace(table);
        let decision = decision.name.clone();

        tracing::info!(
            "Replaced table of decision '{}' in model '{}'",
            decision,
            entry.model.name
        );

        Ok(TableEdit {
            location: entry.location.clone(),
            decision,
            previous,
            model: entry.model.clone(),
        })
    }

    /// Put back the table an edit replaced
    pub async fn restore_table(
        &self,
        model_name: &str,
        decision_name: &str,
        previous: Option<RuleTable>,
    ) -> RepositoryResult<()> {
        let mut entries = self.entries.write().await;
        let entry = find_model_mut(&mut entries, model_name)?;
        let decision = entry
            .model
            .find_decision_mut(decision_name)
            .ok_or_else(|| decision_not_found(model_name, decision_name))?;
        decision.table = previous;
        Ok(())
    }
}

fn find_model<'a>(entries: &'a [ModelEntry], name: &str) -> RepositoryResult<&'a ModelEntry> {
    entries
        .iter()
        .find(|entry| entry.model.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| RepositoryError::ModelNotFound {
            model: name.to_string(),
        })
}

fn find_model_mut<'a>(entries: &'a mut [ModelEntry], name: &str) -> RepositoryResult<&'a mut ModelEntry> {
    entries
        .iter_mut()
        .find(|entry| entry.model.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| RepositoryError::ModelNotFound {
            model: name.to_string(),
        })
}

fn decision_not_found(model: &str, decision: &str) -> RepositoryError {
    RepositoryError::DecisionNotFound {
        model: model.to_string(),
        decision: decision.to_string(),
    }
}

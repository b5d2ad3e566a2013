//! Audit payloads in, committed results out.
//!
//! Entry keys per audit id:
//! - `audit/<id>/matrix`:  header + rows, JSON array of arrays of scalars
//! - `audit/<id>/fields`:  field mapping, JSON object `{ "<col>": "<field>" }`
//! - `audit/<id>/columns`: column visibility, JSON array of booleans
//! - `audit/<id>/key`:     key column chosen at commit, JSON number or null
//! - `registry/<id>`:      summary record written at commit

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use auditgrid_core::CellValue;
use auditgrid_engine::{ColumnLayout, Table};
use auditgrid_recon::{CommitOutput, CommitSummary};

use crate::error::StoreError;
use crate::sample;
use crate::store::KeyValueStore;

const REGISTRY_PREFIX: &str = "registry/";

fn matrix_key(id: &str) -> String {
    format!("audit/{id}/matrix")
}

fn fields_key(id: &str) -> String {
    format!("audit/{id}/fields")
}

fn columns_key(id: &str) -> String {
    format!("audit/{id}/columns")
}

fn key_column_key(id: &str) -> String {
    format!("audit/{id}/key")
}

fn registry_key(id: &str) -> String {
    format!("{REGISTRY_PREFIX}{id}")
}

/// Column index → semantic field name (e.g. `po_number`, `quantity`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: BTreeMap<usize, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, col: usize, field: impl Into<String>) {
        self.fields.insert(col, field.into());
    }

    pub fn field(&self, col: usize) -> Option<&str> {
        self.fields.get(&col).map(String::as_str)
    }

    /// First column mapped to `field` (case-insensitive).
    pub fn column_for(&self, field: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(field))
            .map(|(&col, _)| col)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.fields.iter().map(|(&c, f)| (c, f.as_str()))
    }

    /// Re-key the mapping onto a new column order. `origins[i]` is the old
    /// index of new column `i`; fields of dropped columns are dropped.
    pub fn remap(&self, origins: &[Option<usize>]) -> Self {
        origins
            .iter()
            .enumerate()
            .filter_map(|(new, old)| {
                let field = self.fields.get(&(*old)?)?;
                Some((new, field.clone()))
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(usize, S)> for FieldMapping {
    fn from_iter<I: IntoIterator<Item = (usize, S)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(c, f)| (c, f.into())).collect(),
        }
    }
}

/// A pre-parsed audit as handed over by the import step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPayload {
    pub matrix: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub fields: FieldMapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<bool>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    /// Nothing usable was stored; the built-in sample was loaded instead.
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct LoadedAudit {
    pub audit_id: String,
    pub table: Table,
    pub fields: FieldMapping,
    /// Key column recorded by the last commit, if any.
    pub stored_key_column: Option<usize>,
    pub source: LoadSource,
}

impl LoadedAudit {
    /// Column mapped to `key_field`, else the key column of the last
    /// commit, else column 0.
    pub fn key_column(&self, key_field: &str) -> usize {
        let in_bounds = |col: &usize| *col < self.table.col_count();
        self.fields
            .column_for(key_field)
            .filter(in_bounds)
            .or(self.stored_key_column.filter(in_bounds))
            .unwrap_or(0)
    }
}

/// Summary record kept per audit in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryRecord {
    pub imo_or_audit_id: String,
    pub total_purchase_orders: usize,
    pub duplicate_purchase_orders: usize,
    pub total_items: usize,
    pub create_date: NaiveDate,
}

impl RegistryRecord {
    pub fn from_summary(audit_id: &str, summary: &CommitSummary, create_date: NaiveDate) -> Self {
        Self {
            imo_or_audit_id: audit_id.to_string(),
            total_purchase_orders: summary.distinct_key_count,
            duplicate_purchase_orders: summary.duplicate_key_count,
            total_items: summary.total_data_rows,
            create_date,
        }
    }
}

pub struct AuditGateway<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> AuditGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Store a pre-parsed payload under `audit_id`.
    pub fn import(&mut self, audit_id: &str, payload: &AuditPayload) -> Result<(), StoreError> {
        let mut entries = vec![
            (matrix_key(audit_id), encode(&matrix_key(audit_id), &payload.matrix)?),
            (fields_key(audit_id), encode(&fields_key(audit_id), &payload.fields)?),
            // a fresh import forgets the previous commit's key column
            (key_column_key(audit_id), "null".to_string()),
        ];
        if let Some(columns) = &payload.columns {
            entries.push((columns_key(audit_id), encode(&columns_key(audit_id), columns)?));
        }
        self.store.put_many(&entries)?;
        log::info!("imported audit '{audit_id}' ({} rows)", payload.matrix.len().saturating_sub(1));
        Ok(())
    }

    /// Load an audit for editing.
    ///
    /// A missing or malformed matrix falls back to the built-in sample.
    /// Store failures are returned as errors.
    pub fn load(&self, audit_id: &str, layout: &ColumnLayout) -> Result<LoadedAudit, StoreError> {
        let Some(raw) = self.store.get(&matrix_key(audit_id))? else {
            log::warn!("audit '{audit_id}' not found; loading placeholder data");
            return placeholder(audit_id, layout);
        };

        let matrix: Vec<Vec<CellValue>> = match serde_json::from_str(&raw) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("audit '{audit_id}' matrix is unreadable ({e}); loading placeholder data");
                return placeholder(audit_id, layout);
            }
        };
        let mut table = match Table::from_matrix(matrix, layout.clone()) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("audit '{audit_id}': {e}; loading placeholder data");
                return placeholder(audit_id, layout);
            }
        };

        let fields = match self.store.get(&fields_key(audit_id))? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("audit '{audit_id}' field mapping is unreadable ({e}); ignoring it");
                FieldMapping::new()
            }),
            None => FieldMapping::new(),
        };

        if let Some(raw) = self.store.get(&columns_key(audit_id))? {
            match serde_json::from_str::<Vec<bool>>(&raw) {
                Ok(visibility) => table.apply_visibility(&visibility),
                Err(e) => log::warn!("audit '{audit_id}' column layout is unreadable ({e}); ignoring it"),
            }
        }

        let stored_key_column = match self.store.get(&key_column_key(audit_id))? {
            Some(raw) => serde_json::from_str::<Option<usize>>(&raw).unwrap_or_else(|e| {
                log::warn!("audit '{audit_id}' key column is unreadable ({e}); ignoring it");
                None
            }),
            None => None,
        };

        Ok(LoadedAudit {
            audit_id: audit_id.to_string(),
            table,
            fields,
            stored_key_column,
            source: LoadSource::Stored,
        })
    }

    /// Write the committed matrix, column layout, key column and registry
    /// record. `fields` is the mapping the session was loaded with; it is
    /// re-keyed onto the committed column order. Written in one batch; no
    /// read-back.
    pub fn commit(
        &mut self,
        audit_id: &str,
        output: &CommitOutput,
        fields: &FieldMapping,
        create_date: NaiveDate,
    ) -> Result<RegistryRecord, StoreError> {
        let record = RegistryRecord::from_summary(audit_id, &output.summary, create_date);
        let fields = fields.remap(&output.column_origins);
        let entries = vec![
            (matrix_key(audit_id), encode(&matrix_key(audit_id), &output.matrix)?),
            (fields_key(audit_id), encode(&fields_key(audit_id), &fields)?),
            (columns_key(audit_id), encode(&columns_key(audit_id), &output.visibility)?),
            (key_column_key(audit_id), encode(&key_column_key(audit_id), &output.key_column)?),
            (registry_key(audit_id), encode(&registry_key(audit_id), &record)?),
        ];
        self.store.put_many(&entries)?;
        log::info!(
            "committed audit '{audit_id}': {} items, {} purchase orders",
            record.total_items,
            record.total_purchase_orders
        );
        Ok(record)
    }

    pub fn registry_record(&self, audit_id: &str) -> Result<Option<RegistryRecord>, StoreError> {
        let key = registry_key(audit_id);
        match self.store.get(&key)? {
            Some(raw) => decode(&key, &raw).map(Some),
            None => Ok(None),
        }
    }

    /// Every registry record, ordered by key.
    pub fn registry(&self) -> Result<Vec<RegistryRecord>, StoreError> {
        let mut records = Vec::new();
        for key in self.store.keys_with_prefix(REGISTRY_PREFIX)? {
            if let Some(raw) = self.store.get(&key)? {
                records.push(decode(&key, &raw)?);
            }
        }
        Ok(records)
    }
}

fn placeholder(audit_id: &str, layout: &ColumnLayout) -> Result<LoadedAudit, StoreError> {
    let table = Table::from_matrix(sample::placeholder_matrix(), layout.clone()).map_err(|e| {
        StoreError::Codec {
            key: matrix_key(audit_id),
            message: e.to_string(),
        }
    })?;
    Ok(LoadedAudit {
        audit_id: audit_id.to_string(),
        table,
        fields: sample::placeholder_fields(),
        stored_key_column: None,
        source: LoadSource::Placeholder,
    })
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Codec {
        key: key.to_string(),
        message: e.to_string(),
    })
}

fn decode<T: for<'de> Deserialize<'de>>(key: &str, raw: &str) -> Result<T, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Codec {
        key: key.to_string(),
        message: e.to_string(),
    })
}

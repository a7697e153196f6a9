//! Per-run context handed to every command hook.

use crate::effects::PipelineError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Property bag owned by exactly one command run.
///
/// A new context is created at the start of every `execute` or `get_errors`
/// call and dropped when the run completes; hooks of the same run share it,
/// concurrent runs never do.
#[derive(Clone, Debug)]
pub struct Context {
    run_id: Uuid,
    started_at: DateTime<Utc>,
    values: HashMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            values: HashMap::new(),
        }
    }

    /// Identifier of the run, also recorded on its tracing span.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Time since the run started
    pub fn elapsed(&self) -> Duration {
        let now = Utc::now();
        now.signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert<T>(&mut self, key: impl Into<String>, value: T) -> Result<(), PipelineError>
    where
        T: Serialize,
    {
        let key = key.into();
        let value = serde_json::to_value(value).map_err(|source| PipelineError::ContextValue {
            key: key.clone(),
            source,
        })?;
        self.values.insert(key, value);
        Ok(())
    }

    /// Read the entry under `key` as `T`.
    pub fn get<T>(&self, key: &str) -> Result<Option<T>, PipelineError>
    where
        T: DeserializeOwned,
    {
        self.values
            .get(key)
            .map(|value| {
                T::deserialize(value).map_err(|source| PipelineError::ContextValue {
                    key: key.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Customer {
        id: u64,
        name: String,
    }

    #[test]
    fn typed_values_round_trip() {
        let mut context = Context::new();
        context
            .insert(
                "customer",
                Customer {
                    id: 7,
                    name: "Ada".to_string(),
                },
            )
            .unwrap();

        let customer: Option<Customer> = context.get("customer").unwrap();
        assert_eq!(customer.map(|c| c.id), Some(7));
        assert!(context.contains("customer"));
    }

    #[test]
    fn missing_key_is_none() {
        let context = Context::new();
        assert_eq!(context.get::<u32>("absent").unwrap(), None);
        assert!(context.is_empty());
    }

    #[test]
    fn wrong_type_reports_key() {
        let mut context = Context::new();
        context.insert("count", "many").unwrap();

        let error = context.get::<u32>("count").unwrap_err();
        assert!(matches!(error, PipelineError::ContextValue { ref key, .. } if key == "count"));
    }

    #[test]
    fn each_context_has_its_own_run_id() {
        assert_ne!(Context::new().run_id(), Context::new().run_id());
    }

    #[test]
    fn remove_drops_entry() {
        let mut context = Context::new();
        context.insert("flag", true).unwrap();

        assert_eq!(context.remove("flag"), Some(Value::Bool(true)));
        assert_eq!(context.len(), 0);
    }
}

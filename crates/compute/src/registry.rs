use std::collections::HashMap;
use std::sync::Arc;

use decoy_core::{Protocol, ScoreFunction, Transform};

/// Named transforms and score functions for one state type.
///
/// Worker processes only receive names on their command line, so both the
/// batch binary and the worker resolve protocols through the same registry.
pub struct ProtocolRegistry<S> {
    transforms: HashMap<String, Arc<dyn Transform<S>>>,
    scores: HashMap<String, Arc<dyn ScoreFunction<S>>>,
}

impl<S> ProtocolRegistry<S> {
    pub fn new() -> Self {
        Self {
            transforms: HashMap::new(),
            scores: HashMap::new(),
        }
    }

    /// Register a transform. Returns error if name already registered.
    pub fn register_transform(
        &mut self,
        transform: impl Transform<S> + 'static,
    ) -> Result<(), RegistryError> {
        let name = transform.name().to_string();
        if self.transforms.contains_key(&name) {
            return Err(RegistryError::DuplicateTransform(name));
        }
        self.transforms.insert(name, Arc::new(transform));
        Ok(())
    }

    /// Register a score function. Returns error if name already registered.
    pub fn register_score(
        &mut self,
        score: impl ScoreFunction<S> + 'static,
    ) -> Result<(), RegistryError> {
        let name = score.name().to_string();
        if self.scores.contains_key(&name) {
            return Err(RegistryError::DuplicateScore(name));
        }
        self.scores.insert(name, Arc::new(score));
        Ok(())
    }

    pub fn transform(&self, name: &str) -> Option<Arc<dyn Transform<S>>> {
        self.transforms.get(name).cloned()
    }

    pub fn score(&self, name: &str) -> Option<Arc<dyn ScoreFunction<S>>> {
        self.scores.get(name).cloned()
    }

    /// Pair a transform with a score function, both by name.
    pub fn protocol(&self, transform: &str, score: &str) -> Result<Protocol<S>, RegistryError> {
        let t = self
            .transform(transform)
            .ok_or_else(|| RegistryError::UnknownTransform(transform.to_string()))?;
        let s = self
            .score(score)
            .ok_or_else(|| RegistryError::UnknownScore(score.to_string()))?;
        Ok(Protocol::new(t, s))
    }

    /// Registered transform names, sorted.
    pub fn transform_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl<S> Default for ProtocolRegistry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Transform with name '{0}' is already registered")]
    DuplicateTransform(String),

    #[error("Score function with name '{0}' is already registered")]
    DuplicateScore(String),

    #[error("unknown transform '{0}'")]
    UnknownTransform(String),

    #[error("unknown score function '{0}'")]
    UnknownScore(String),
}

use std::collections::HashMap;

use copilot_core::ToolSpec;
use thiserror::Error;

use crate::builtin::builtin_tools;
use crate::definition::{ToolDefinition, ToolSummary};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate tool id: {0}")]
    DuplicateId(String),

    #[error("tool id cannot be empty")]
    EmptyId,
}

/// Read-only catalog of tools with a derived id index.
///
/// Built once at startup and shared by reference; never mutated afterwards.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry, rejecting empty or duplicate ids.
    pub fn new(tools: Vec<ToolDefinition>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if tool.id.trim().is_empty() {
                return Err(RegistryError::EmptyId);
            }
            if index.insert(tool.id.clone(), position).is_some() {
                return Err(RegistryError::DuplicateId(tool.id.clone()));
            }
        }
        Ok(Self { tools, index })
    }

    /// Registry holding the shipped bridge tools.
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::new(builtin_tools())
    }

    /// Tools in stable presentation order.
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn find(&self, id: &str) -> Option<&ToolDefinition> {
        self.index.get(id).map(|&position| &self.tools[position])
    }

    pub fn catalog(&self) -> Vec<ToolSummary> {
        self.tools.iter().map(ToolDefinition::summary).collect()
    }

    /// Every tool as a callable function for the model.
    pub fn model_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(ToolDefinition::to_spec).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

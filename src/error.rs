// Copyright 2024 Saptak Santra
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error types

use std::fmt;

use crate::template::TemplateId;

/// ECS error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// Entity not found (destroyed, or a stale id from a recycled slot)
    EntityNotFound,

    /// Component not found on a live entity
    ComponentNotFound,

    /// The same component type appears twice in one bundle
    DuplicateComponent(&'static str),

    /// No template registered under this name
    TemplateNotFound(String),

    /// Template id does not belong to the registry
    UnknownTemplateId(TemplateId),

    /// Resource not found
    ResourceNotFound(&'static str),

    /// Invalid or unreadable configuration
    ConfigError(String),

    /// IO error (file operations, etc.)
    IoError(String),
}

impl EcsError {
    /// Stale references are an expected steady-state occurrence; callers in the
    /// tick path skip the operation instead of failing the frame.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, EcsError::EntityNotFound)
    }
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::EntityNotFound => write!(f, "Entity not found"),
            EcsError::ComponentNotFound => write!(f, "Component not found"),
            EcsError::DuplicateComponent(name) => {
                write!(f, "Component {name} appears more than once in bundle")
            }
            EcsError::TemplateNotFound(name) => write!(f, "Template not found: {name}"),
            EcsError::UnknownTemplateId(id) => write!(f, "Unknown template id: {id:?}"),
            EcsError::ResourceNotFound(name) => write!(f, "Resource not found: {name}"),
            EcsError::ConfigError(msg) => write!(f, "Config error: {msg}"),
            EcsError::IoError(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for EcsError {}

impl From<std::io::Error> for EcsError {
    fn from(err: std::io::Error) -> Self {
        EcsError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EcsError {
    fn from(err: serde_json::Error) -> Self {
        EcsError::ConfigError(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EcsError>;

//! Local view of a single resource instance

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped attribute map exchanged with the orchestration layer
pub type Attributes = serde_json::Map<String, Value>;

/// Key under which the identity travels in an [`Attributes`] map
pub const ID_ATTRIBUTE: &str = "id";

/// Lifecycle of one resource instance.
///
/// `Absent → Creating → Present → Deleted`. A `Deleted` slot may be reused by a
/// fresh create. An instance left in `Creating` exists remotely but could not be
/// read back after creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Absent,
    Creating,
    Present,
    Deleted,
}

/// Typed record `T` plus the remote identity it is bound to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalState<T> {
    id: Option<String>,
    lifecycle: Lifecycle,
    pub attrs: T,
}

impl<T> LocalState<T> {
    /// A not-yet-created instance.
    pub fn new(attrs: T) -> Self {
        Self {
            id: None,
            lifecycle: Lifecycle::Absent,
            attrs,
        }
    }

    /// An instance already bound to a remote resource.
    pub fn with_id(id: impl Into<String>, attrs: T) -> Self {
        let mut state = Self::new(attrs);
        state.set_id(id);
        state.lifecycle = Lifecycle::Present;
        state
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Bind to a remote identity. An empty ID clears the binding.
    pub fn set_id(&mut self, id: impl Into<String>) {
        let id = id.into();
        self.id = if id.is_empty() { None } else { Some(id) };
    }

    pub fn clear_id(&mut self) {
        self.id = None;
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub(crate) fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.lifecycle = lifecycle;
    }

    pub fn is_present(&self) -> bool {
        self.id.is_some() && self.lifecycle == Lifecycle::Present
    }

    pub fn into_attrs(self) -> T {
        self.attrs
    }
}

impl<T: Serialize + DeserializeOwned> LocalState<T> {
    /// Build typed state from an attribute map. A non-empty `id` entry binds the identity.
    pub fn from_attributes(mut attributes: Attributes) -> Result<Self> {
        let id = match attributes.remove(ID_ATTRIBUTE) {
            Some(Value::String(id)) => id,
            Some(Value::Null) | None => String::new(),
            Some(other) => {
                return Err(Error::Attributes {
                    message: format!("`{}` must be a string, got {}", ID_ATTRIBUTE, other),
                });
            }
        };

        let attrs: T = serde_json::from_value(Value::Object(attributes))
            .map_err(|e| Error::Attributes {
                message: e.to_string(),
            })?;

        Ok(if id.is_empty() {
            Self::new(attrs)
        } else {
            Self::with_id(id, attrs)
        })
    }

    /// Flatten into an attribute map, identity included.
    pub fn to_attributes(&self) -> Result<Attributes> {
        let value = serde_json::to_value(&self.attrs).map_err(|e| Error::Attributes {
            message: e.to_string(),
        })?;

        let mut attributes = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::Attributes {
                    message: format!("record must serialize to an object, got {}", other),
                });
            }
        };

        attributes.insert(
            ID_ATTRIBUTE.to_string(),
            Value::String(self.id.clone().unwrap_or_default()),
        );
        Ok(attributes)
    }
}

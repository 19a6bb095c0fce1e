//! Import of existing remote resources by composite ID

use crate::reconciler::Reconciler;
use crate::resource::ManagedResource;
use crate::state::LocalState;
use crate::{Error, Result};
use pd_client::ResourceApi;

/// Separator between the components of a composite import ID
pub const IMPORT_DELIMITER: char = '.';

/// Expected shape of an import ID for one resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportFormat {
    /// Exact number of components
    pub arity: usize,
    /// Human-readable pattern shown in errors, e.g. `<service_id>.<integration_id>`
    pub pattern: &'static str,
}

impl ImportFormat {
    pub const BARE_ID: Self = Self::new(1, "<id>");

    pub const fn new(arity: usize, pattern: &'static str) -> Self {
        Self { arity, pattern }
    }
}

/// A validated, decomposed import ID
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeId {
    parts: Vec<String>,
}

impl CompositeId {
    /// Split `raw` on [`IMPORT_DELIMITER`] and check it against `format`.
    ///
    /// Fails when the component count differs from `format.arity` or any
    /// component is empty.
    pub fn parse(raw: &str, format: ImportFormat, resource: &'static str) -> Result<Self> {
        let parts: Vec<String> = raw.split(IMPORT_DELIMITER).map(str::to_string).collect();

        if parts.len() != format.arity || parts.iter().any(|part| part.trim().is_empty()) {
            return Err(Error::ImportFormat {
                resource,
                raw: raw.to_string(),
                format: format.pattern,
                expected: format.arity,
            });
        }

        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Component `index`, or an empty string when out of range.
    pub fn part(&self, index: usize) -> &str {
        self.parts.get(index).map(String::as_str).unwrap_or_default()
    }

    /// The final component: the resource's own ID.
    pub fn resource_id(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }
}

impl std::fmt::Display for CompositeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = [0u8; 4];
        let delimiter: &str = IMPORT_DELIMITER.encode_utf8(&mut buf);
        f.write_str(&self.parts.join(delimiter))
    }
}

impl<R: ManagedResource + Default> Reconciler<'_, R> {
    /// Validate `raw` and confirm the resource exists remotely.
    ///
    /// Returns the decomposed ID; the orchestrator seeds local state from it and
    /// then reads. A malformed ID fails before any network call.
    pub async fn import(&self, raw: &str) -> Result<CompositeId> {
        let (id, _, _) = self.check_import(raw).await?;
        Ok(id)
    }

    /// Import and hydrate: validate, check existence, seed the record, and read.
    pub async fn import_state(&self, raw: &str) -> Result<LocalState<R>> {
        let (_, identity, seed) = self.check_import(raw).await?;
        let mut state = LocalState::with_id(identity, seed);
        self.read(&mut state).await?;
        Ok(state)
    }

    async fn check_import(&self, raw: &str) -> Result<(CompositeId, String, R)> {
        let id = CompositeId::parse(raw, R::IMPORT_FORMAT, R::TYPE_NAME)?;

        tracing::info!(resource = R::TYPE_NAME, import_id = %id, "Importing");

        let mut seed = R::default();
        let identity = seed.seed_import(&id);
        let key = seed.key(&identity);

        self.api()
            .get(&key)
            .await
            .map_err(|e| R::classifier().classify(e))?;

        Ok((id, identity, seed))
    }
}

// ABOUTME: Model catalog - the configured set of models a subagent call may
// ABOUTME: select, with membership validation for the tool executor.

/// A model available for subagent use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailableModel {
    /// The identifier passed as the "model" parameter.
    pub id: String,
    /// Human-readable name. May equal the id, in which case it is ignored.
    pub display_name: Option<String>,
}

impl AvailableModel {
    /// Create a model entry with no display name.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
        }
    }

    /// Create a model entry with a display name.
    pub fn named(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: Some(display_name.into()),
        }
    }

    /// The display name, if present and distinct from the id.
    pub fn display(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty() && *name != self.id)
    }
}

/// Validation failure carrying the set of known model ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownModel {
    pub requested: String,
    pub known: Vec<String>,
}

impl std::fmt::Display for UnknownModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown model \"{}\"; available: {}",
            self.requested,
            self.known.join(", ")
        )
    }
}

impl std::error::Error for UnknownModel {}

/// The ordered, process-wide set of models subagents may select.
///
/// Membership checks scan linearly; the list is small and insertion order
/// drives the tool description.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: Vec<AvailableModel>,
}

impl ModelCatalog {
    /// Create a catalog from an ordered list of models.
    pub fn new(models: Vec<AvailableModel>) -> Self {
        Self { models }
    }

    /// Create an empty catalog (no model override permitted).
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &AvailableModel> {
        self.models.iter()
    }

    /// All model ids in insertion order.
    pub fn ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id.clone()).collect()
    }

    /// Check that `id` names a catalog member.
    pub fn validate(&self, id: &str) -> Result<(), UnknownModel> {
        if self.models.iter().any(|m| m.id == id) {
            return Ok(());
        }
        Err(UnknownModel {
            requested: id.to_string(),
            known: self.ids(),
        })
    }
}

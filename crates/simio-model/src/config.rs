//! Options for writing and reading projects.

/// Options for [`Project::write_with`](crate::Project::write_with).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteConfig {
    /// Create a `data` dataset for every component with dataset data.
    /// When `false` only metadata is written; the components keep their
    /// declared datatype and shape in memory. Default: `true`.
    pub datasets: bool,
}

impl WriteConfig {
    /// Metadata only, no datasets.
    pub const METADATA_ONLY: Self = Self { datasets: false };
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self { datasets: true }
    }
}

/// Options for [`read_project_with`](crate::read_project_with).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReadConfig {
    /// Re-create discrete fields, their blocks and components. When
    /// `false` fields are read without any discretized instance.
    /// Default: `true`.
    pub discrete_fields: bool,
    /// Skip (with a warning) groups the layout does not know instead of
    /// failing with [`SerializeError::UnknownGroup`](crate::SerializeError::UnknownGroup).
    /// Default: `true`.
    pub ignore_unknown_groups: bool,
}

impl ReadConfig {
    /// Read everything, rejecting unknown groups.
    pub const STRICT: Self = Self {
        discrete_fields: true,
        ignore_unknown_groups: false,
    };
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            discrete_fields: true,
            ignore_unknown_groups: true,
        }
    }
}

use tracing::warn;

use super::error::DaoResult;

/// The create/list/find capability set shared by the public accessors.
///
/// Implementors provide the fallible `try_*` methods. The provided `list`
/// and `find` apply the read policy of the console: a failed read is logged
/// and reported as "nothing there" so an interactive session never aborts.
/// Callers that need to tell "not found" apart from "lookup failed" use the
/// `try_*` variants directly.
pub trait RecordAccessor {
    type Record;

    /// Entity name used in log lines.
    const ENTITY: &'static str;

    /// Insert an unidentified record and assign its store-generated id.
    fn create(&self, record: &mut Self::Record) -> DaoResult<()>;

    /// Every stored record, fully resolved, in whatever order the store
    /// returns them.
    fn try_list(&self) -> DaoResult<Vec<Self::Record>>;

    /// First record matching the free-text lookup key for this entity.
    fn try_find(&self, term: &str) -> DaoResult<Option<Self::Record>>;

    /// [`Self::try_list`] with failures logged and reported as an empty list.
    fn list(&self) -> Vec<Self::Record> {
        self.try_list().unwrap_or_else(|err| {
            warn!(entity = Self::ENTITY, error = %err, "list failed, returning empty result");
            Vec::new()
        })
    }

    /// [`Self::try_find`] with failures logged and reported as `None`.
    fn find(&self, term: &str) -> Option<Self::Record> {
        degrade(Self::ENTITY, term, self.try_find(term))
    }
}

/// Collapse a failed lookup into `None`, logging why.
pub(crate) fn degrade<T>(
    entity: &'static str,
    key: impl std::fmt::Display,
    result: DaoResult<Option<T>>,
) -> Option<T> {
    result.unwrap_or_else(|err| {
        warn!(entity, key = %key, error = %err, "lookup failed, reporting no result");
        None
    })
}

//! Aggregation of per-entity failures in batch requests.
//!
//! A batch request (for example fetching fifty series) reports failures per entity.
//! [`GetEntitiesError`] collects them into one error, and the `raise_if*` gates decide
//! whether a batch should fail at all.

use std::fmt;

use thiserror::Error;

/// The failure of a single entity in a batch request.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityErrorInfo {
    name: String,
    error_message: String,
}

impl EntityErrorInfo {
    /// Creates a new error entry.
    #[must_use]
    pub fn new(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error_message: error_message.into(),
        }
    }

    /// Name of the entity that failed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Error reported for the entity.
    #[must_use]
    pub fn error_message(&self) -> &str {
        &self.error_message
    }
}

impl fmt::Display for EntityErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name: {} error_message: {}", self.name, self.error_message)
    }
}

/// One or more entities of a batch request could not be retrieved.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[error("{message}")]
pub struct GetEntitiesError {
    entities: Vec<EntityErrorInfo>,
    message: String,
}

impl GetEntitiesError {
    /// Creates an aggregate error from a list of entries, keeping their order.
    #[must_use]
    pub fn new(entities: Vec<EntityErrorInfo>) -> Self {
        let lines = entities
            .iter()
            .map(|e| format!("\t{} error_message: {}", e.name, e.error_message))
            .collect::<Vec<_>>()
            .join("\n");

        Self {
            message: format!("failed to retrieve:\n{lines}"),
            entities,
        }
    }

    /// Creates an aggregate error holding a single entry.
    #[must_use]
    pub fn single(name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self::new(vec![EntityErrorInfo::new(name, error_message)])
    }

    /// The failed entities, in request order.
    #[must_use]
    pub fn entities(&self) -> &[EntityErrorInfo] {
        &self.entities
    }

    /// The composed human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Fails with a single entry when `should_raise` is set and `error_message` holds text.
    ///
    /// An absent or empty message means the entity succeeded.
    pub fn raise_if(
        should_raise: bool,
        name: &str,
        error_message: Option<&str>,
    ) -> Result<(), Self> {
        match error_message {
            Some(message) if should_raise && !message.is_empty() => {
                Err(Self::single(name, message))
            }
            _ => Ok(()),
        }
    }

    /// Fails with one entry per `(name, error)` pair that carries an error, when
    /// `should_raise` is set.
    ///
    /// Pairs without an error (absent or empty) are dropped; the remaining entries keep
    /// their input order.
    pub fn raise_if_any<I, N, M>(should_raise: bool, entities: I) -> Result<(), Self>
    where
        I: IntoIterator<Item = (N, Option<M>)>,
        N: Into<String>,
        M: Into<String>,
    {
        if !should_raise {
            return Ok(());
        }

        let failed: Vec<EntityErrorInfo> = entities
            .into_iter()
            .filter_map(|(name, message)| {
                let message: String = message?.into();
                (!message.is_empty()).then(|| EntityErrorInfo::new(name, message))
            })
            .collect();

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Self::new(failed))
        }
    }
}

impl<N: Into<String>, M: Into<String>> FromIterator<(N, M)> for GetEntitiesError {
    /// Builds the error from a mapping of entity name to error text.
    fn from_iter<I: IntoIterator<Item = (N, M)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, message)| EntityErrorInfo::new(name, message))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn test_no_raise_when_disabled() {
        assert!(GetEntitiesError::raise_if(false, "usgdp", Some("boom")).is_ok());
        assert!(
            GetEntitiesError::raise_if_any(false, [("a", Some("err")), ("b", Some("err"))])
                .is_ok()
        );
    }

    #[test]
    fn test_single_name_requires_message() {
        assert!(GetEntitiesError::raise_if(true, "name", None).is_ok());
        assert!(GetEntitiesError::raise_if(true, "name", Some("")).is_ok());

        let err = GetEntitiesError::raise_if(true, "name", Some("boom")).unwrap_err();
        assert_eq!(err.entities(), &[EntityErrorInfo::new("name", "boom")]);
    }

    #[test]
    fn test_pairs_keep_only_failures_in_order() {
        let err = GetEntitiesError::raise_if_any(
            true,
            vec![
                ("a", None),
                ("b", Some("err b")),
                ("c", Some("")),
                ("d", Some("err d")),
            ],
        )
        .unwrap_err();

        let names: Vec<_> = err.entities().iter().map(EntityErrorInfo::name).collect();
        assert_eq!(names, vec!["b", "d"]);
        assert_eq!(err.entities()[0].error_message(), "err b");
    }

    #[test]
    fn test_pairs_without_failures() {
        let pairs: Vec<(&str, Option<&str>)> = vec![("a", None), ("b", None)];
        assert!(GetEntitiesError::raise_if_any(true, pairs).is_ok());
    }

    #[test]
    fn test_message_format() {
        let err = GetEntitiesError::new(vec![
            EntityErrorInfo::new("a", "Not found"),
            EntityErrorInfo::new("b", "Access denied"),
        ]);
        assert_eq!(
            err.to_string(),
            "failed to retrieve:\n\ta error_message: Not found\n\tb error_message: Access denied"
        );
    }

    #[test]
    fn test_from_mapping() {
        let mut errors = BTreeMap::new();
        errors.insert("x", "bad x");
        errors.insert("y", "bad y");

        let err: GetEntitiesError = errors.into_iter().collect();
        assert_eq!(err.entities().len(), 2);
        assert!(!err.message().is_empty());
        assert_eq!(err.entities()[1], EntityErrorInfo::new("y", "bad y"));
    }
}

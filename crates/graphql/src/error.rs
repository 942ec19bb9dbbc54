//! Conversion of domain errors into GraphQL errors.
//!
//! Every error leaves the API with a `code` extension so clients can branch
//! on the kind without parsing messages.

use async_graphql::{Error, ErrorExtensions};

use kennel_core::error::{ResolveError, StorageError};

/// Convert a resolver error into a GraphQL error carrying its code.
pub fn gql_error(err: ResolveError) -> Error {
    let code = err.code();
    Error::new(err.to_string()).extend_with(|_, ext| ext.set("code", code))
}

/// Convert a storage error, going through the resolver taxonomy first.
pub fn storage_error(err: StorageError) -> Error {
    gql_error(err.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_of(err: &Error) -> Option<String> {
        let value = err.extensions.as_ref()?.get("code")?;
        match value {
            async_graphql::Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    #[test]
    fn resolve_errors_carry_code_extension() {
        let err = gql_error(ResolveError::InvalidCursor("garbage".into()));
        assert_eq!(code_of(&err).as_deref(), Some("INVALID_CURSOR"));
        assert!(err.message.contains("garbage"));
    }

    #[test]
    fn storage_failures_surface_as_unavailable() {
        let err = storage_error(StorageError::ConnectionError("refused".into()));
        assert_eq!(code_of(&err).as_deref(), Some("STORAGE_UNAVAILABLE"));

        let err = storage_error(StorageError::NotFound("Pet 9".into()));
        assert_eq!(code_of(&err).as_deref(), Some("NOT_FOUND"));
    }
}

// Identifier checks

/// Pluggable format check for the `id` path parameter
pub trait IdentifierCheck: Send + Sync {
    /// Whether `id` has the expected format
    fn is_valid(&self, id: &str) -> bool;

    /// Display name used in `Invalid <name> format`
    fn name(&self) -> &str;
}

/// Document-store object identifier: exactly 24 hexadecimal characters
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIdFormat;

impl IdentifierCheck for ObjectIdFormat {
    fn is_valid(&self, id: &str) -> bool {
        id.len() == 24 && id.bytes().all(|b| b.is_ascii_hexdigit())
    }

    fn name(&self) -> &str {
        "ObjectId"
    }
}

/// Identifier check backed by a closure
pub struct IdentifierFn<F> {
    name: String,
    check: F,
}

impl<F> IdentifierFn<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    pub fn new(name: impl Into<String>, check: F) -> Self {
        Self {
            name: name.into(),
            check,
        }
    }
}

impl<F> IdentifierCheck for IdentifierFn<F>
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, id: &str) -> bool {
        (self.check)(id)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_format() {
        let check = ObjectIdFormat;
        assert!(check.is_valid("507f1f77bcf86cd799439011"));
        assert!(check.is_valid("507F1F77BCF86CD799439011"));
        assert!(!check.is_valid("zzz"));
        assert!(!check.is_valid("507f1f77bcf86cd79943901"));
        assert!(!check.is_valid("507f1f77bcf86cd79943901g"));
        assert_eq!(check.name(), "ObjectId");
    }

    #[test]
    fn test_identifier_fn() {
        let numeric = IdentifierFn::new("numeric id", |id: &str| id.parse::<u64>().is_ok());
        assert!(numeric.is_valid("42"));
        assert!(!numeric.is_valid("forty-two"));
        assert_eq!(numeric.name(), "numeric id");
    }
}

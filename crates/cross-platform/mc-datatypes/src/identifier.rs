use std::fmt::{self, Display, Formatter};

use thiserror::Error;


/// Namespaced identifiers are also known as resource locations;
/// block names such as `minecraft:oak_stairs` are an example.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NamespacedIdentifier {
    pub namespace: Box<str>,
    pub path:      Box<str>,
}

impl NamespacedIdentifier {
    pub fn parse(
        identifier: &str,
        opts:       IdentifierParseOptions,
    ) -> Result<Self, IdentifierParseError> {
        let (namespace, path) = match identifier.split_once(':') {
            Some((namespace, path)) => (namespace, path),
            None => match opts.default_namespace {
                Some(namespace) => (namespace, identifier),
                None => {
                    return Err(IdentifierParseError::InvalidIdentifier(identifier.to_owned()));
                }
            },
        };

        if path.is_empty() {
            return Err(IdentifierParseError::EmptyPath(identifier.to_owned()));
        }

        // Validate the namespace and path
        if opts.java_character_constraints {
            // If we can find a character which is not allowed, return an error.
            if let Some(ch) = namespace.chars().find(|&ch| {
                let allowed = ch.is_ascii_digit()
                    || ch.is_ascii_lowercase()
                    || ['_', '-', '.'].contains(&ch);
                !allowed
            }) {
                return Err(IdentifierParseError::InvalidNamespaceCharacter(
                    identifier.to_owned(),
                    ch,
                ));
            }

            if let Some(ch) = path.chars().find(|&ch| {
                let allowed = ch.is_ascii_digit()
                    || ch.is_ascii_lowercase()
                    || ['_', '-', '.', '/'].contains(&ch);
                !allowed
            }) {
                return Err(IdentifierParseError::InvalidPathCharacter(identifier.to_owned(), ch));
            }
        } else if path.contains(':') {
            return Err(IdentifierParseError::InvalidPathCharacter(identifier.to_owned(), ':'));
        }

        Ok(Self {
            namespace: namespace.into(),
            path:      path.into(),
        })
    }

    #[inline]
    pub fn is_vanilla(&self) -> bool {
        &*self.namespace == "minecraft"
    }
}

impl Display for NamespacedIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.path)
    }
}

/// Parse options for [`NamespacedIdentifier`]s, also known as Resource Locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierParseOptions {
    /// If `Some`, if the `namespace:` part of `namespace:path` is missing, assume
    /// that the namespace is this string. If this is `None` and a namespace is missing,
    /// an error is returned from appropriate functions.
    pub default_namespace:          Option<&'static str>,
    /// If true, use Java Edition's restrictions on the characters
    /// which may appear in a [`NamespacedIdentifier`].
    pub java_character_constraints: bool,
}

impl IdentifierParseOptions {
    /// How Java Edition reads the block names in a section's palette.
    pub const JAVA_BLOCK_NAME: Self = Self {
        default_namespace:          Some("minecraft"),
        java_character_constraints: true,
    };
}

impl Default for IdentifierParseOptions {
    /// Defaults to the strictest settings.
    #[inline]
    fn default() -> Self {
        Self {
            default_namespace:          None,
            java_character_constraints: true,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierParseError {
    #[error("expected a string identifier in the form \"namespace:path\", but received \"{0}\"")]
    InvalidIdentifier(String),
    #[error("the identifier \"{0}\" has an empty path")]
    EmptyPath(String),
    #[error("invalid character '{1}' in the namespace of \"{0}\"")]
    InvalidNamespaceCharacter(String, char),
    #[error("invalid character '{1}' in the path of \"{0}\"")]
    InvalidPathCharacter(String, char),
}

use std::fmt;

use serde::Serialize;

const FIELD_SEP: char = '\u{1e}';
const ITEM_SEP: char = '\u{1f}';

/// Comparison key for one method signature.
///
/// Encodes `(name, parameter types, return types)` with control-character
/// separators that cannot occur in Go identifiers or rendered type text, so
/// distinct triples never collide. Ordering is plain byte-wise string order,
/// which is what the sorted-merge implements test relies on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MethodToken(String);

impl MethodToken {
    pub fn new(name: &str, params: &[String], returns: &[String]) -> Self {
        let mut encoded = String::with_capacity(name.len() + 16);
        encoded.push_str(name);
        for list in [params, returns] {
            encoded.push(FIELD_SEP);
            for (i, ty) in list.iter().enumerate() {
                if i > 0 {
                    encoded.push(ITEM_SEP);
                }
                encoded.push_str(ty);
            }
        }
        Self(encoded)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Method name part of the token.
    pub fn name(&self) -> &str {
        self.0.split(FIELD_SEP).next().unwrap_or_default()
    }
}

impl fmt::Display for MethodToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = self.0.split(FIELD_SEP);
        let name = parts.next().unwrap_or_default();
        let params = parts.next().unwrap_or_default().replace(ITEM_SEP, ", ");
        let returns: Vec<&str> =
            parts.next().unwrap_or_default().split(ITEM_SEP).filter(|s| !s.is_empty()).collect();
        write!(f, "{name}({params})")?;
        match returns.len() {
            0 => Ok(()),
            1 => write!(f, " {}", returns[0]),
            _ => write!(f, " ({})", returns.join(", ")),
        }
    }
}

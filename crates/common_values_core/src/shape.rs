use serde::Deserialize;

/// Separator used to pack several values into a single tag.
pub const DEFAULT_SEPARATOR: char = ';';

/// Decides whether a value string is well-formed enough to be a candidate.
pub trait ValuePredicate: Send + Sync {
    fn is_valid(&self, value: &str) -> bool;
}

impl<F> ValuePredicate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_valid(&self, value: &str) -> bool {
        self(value)
    }
}

/// Value-shape rules selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum ValueShape {
    /// Non-empty after trimming and free of the multi-value separator.
    Separator {
        #[serde(default = "default_separator")]
        separator: char,
    },
    /// Non-empty and without any whitespace at all.
    NoWhitespace,
}

fn default_separator() -> char {
    DEFAULT_SEPARATOR
}

impl Default for ValueShape {
    fn default() -> Self {
        ValueShape::Separator {
            separator: DEFAULT_SEPARATOR,
        }
    }
}

impl ValuePredicate for ValueShape {
    fn is_valid(&self, value: &str) -> bool {
        match self {
            ValueShape::Separator { separator } => {
                !value.trim().is_empty() && !value.contains(*separator)
            }
            ValueShape::NoWhitespace => {
                !value.is_empty() && !value.chars().any(char::is_whitespace)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ValuePredicate, ValueShape};

    #[test]
    fn separator_rule_rejects_blank_and_multi_values() {
        let shape = ValueShape::default();
        assert!(shape.is_valid("residential"));
        assert!(shape.is_valid("fast food"));
        assert!(!shape.is_valid("a;b"));
        assert!(!shape.is_valid(""));
        assert!(!shape.is_valid("   "));
    }

    #[test]
    fn custom_separator() {
        let shape = ValueShape::Separator { separator: '|' };
        assert!(shape.is_valid("a;b"));
        assert!(!shape.is_valid("a|b"));
    }

    #[test]
    fn no_whitespace_rule_rejects_inner_spaces() {
        let shape = ValueShape::NoWhitespace;
        assert!(shape.is_valid("a;b"));
        assert!(!shape.is_valid("fast food"));
        assert!(!shape.is_valid(" padded"));
        assert!(!shape.is_valid(""));
    }

    #[test]
    fn closures_are_predicates() {
        let only_lowercase = |value: &str| value.chars().all(|c| c.is_ascii_lowercase());
        assert!(only_lowercase.is_valid("yes"));
        assert!(!only_lowercase.is_valid("Yes"));
    }
}

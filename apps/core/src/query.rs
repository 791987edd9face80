use std::fmt::{Display, Formatter};

/// Current search text as the UI observes it. Leading whitespace never
/// survives construction; trailing whitespace is kept as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    pub fn new(value: &str) -> Self {
        Self(value.trim_start().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Query {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::Query;

    #[test]
    fn strips_leading_whitespace_only() {
        let query = Query::new("  firefox ");
        assert_eq!(query.as_str(), "firefox ");
    }

    #[test]
    fn equality_follows_the_underlying_string() {
        assert_eq!(Query::new("  code"), Query::new("code"));
        assert_ne!(Query::new("code"), Query::new("code "));
    }

    #[test]
    fn whitespace_only_input_becomes_empty() {
        assert!(Query::new(" \t ").is_empty());
    }
}

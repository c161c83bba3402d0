//! Positional argument bounds for commands.
//!
//! Each descriptor carries an explicit [`Arity`]. Usage lines use a small
//! grammar (`<required>`, `[optional]`, `...`) and [`Arity::from_usage`]
//! derives the same bounds from that text, so help output and validation
//! cannot drift apart.

/// Minimum and optional maximum number of positional arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Arity {
    min: usize,
    max: Option<usize>,
}

impl Arity {
    pub(crate) const fn exactly(count: usize) -> Self {
        Self {
            min: count,
            max: Some(count),
        }
    }

    pub(crate) const fn between(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub(crate) const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub(crate) const fn is_variadic(self) -> bool {
        self.max.is_none()
    }

    pub(crate) const fn accepts(self, count: usize) -> bool {
        if count < self.min {
            return false;
        }
        match self.max {
            Some(max) => count <= max,
            None => true,
        }
    }

    /// Derive bounds from a usage line. Tokens are split on whitespace:
    /// `<name>` adds a required argument, `[name]` an optional one, `...`
    /// accepts everything after the required arguments seen so far, and
    /// anything else is a literal.
    pub(crate) fn from_usage(usage: &str) -> Self {
        let mut required = 0;
        let mut optional = 0;
        for token in usage.split_whitespace() {
            if token == "..." {
                return Self::at_least(required);
            }
            if is_placeholder(token, '<', '>') {
                required += 1;
            } else if is_placeholder(token, '[', ']') {
                optional += 1;
            }
        }
        Self::between(required, required + optional)
    }
}

fn is_placeholder(token: &str, open: char, close: char) -> bool {
    token
        .strip_prefix(open)
        .and_then(|rest| rest.strip_suffix(close))
        .is_some_and(|name| {
            !name.is_empty()
                && name
                    .chars()
                    .all(|ch| ch.is_alphanumeric() || ch == '_' || ch == '-')
        })
}

//! Structured label selectors
//!
//! Selectors are built from typed predicates and serialized in one place,
//! so reconciliation logic never assembles selector strings by hand.

use std::collections::BTreeMap;
use std::fmt;

/// A single label predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelPredicate {
    /// Matches objects whose label `key` equals `value` (`key=value`)
    Eq(String, String),
    /// Matches objects whose label `key` differs from `value` (`key!=value`)
    NotEq(String, String),
}

/// An ordered conjunction of label predicates
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    predicates: Vec<LabelPredicate>,
}

impl Selector {
    /// Creates an empty selector (matches everything)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `key=value` predicate
    #[must_use]
    pub fn matching(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates
            .push(LabelPredicate::Eq(key.into(), value.into()));
        self
    }

    /// Adds a `key!=value` predicate
    #[must_use]
    pub fn excluding(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.predicates
            .push(LabelPredicate::NotEq(key.into(), value.into()));
        self
    }

    /// Evaluates the selector against an object's labels
    ///
    /// `key!=value` follows Kubernetes semantics: it also matches objects
    /// that do not carry the label at all.
    #[must_use]
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        self.predicates.iter().all(|predicate| match predicate {
            LabelPredicate::Eq(key, value) => labels.get(key) == Some(value),
            LabelPredicate::NotEq(key, value) => labels.get(key) != Some(value),
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for predicate in &self.predicates {
            if !first {
                write!(f, ",")?;
            }
            first = false;
            match predicate {
                LabelPredicate::Eq(key, value) => write!(f, "{key}={value}")?,
                LabelPredicate::NotEq(key, value) => write!(f, "{key}!={value}")?,
            }
        }
        Ok(())
    }
}

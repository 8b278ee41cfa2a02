//! Ordered field checks.
//!
//! A [`Validator`] is a priority-ordered list of `(message, predicate)` pairs.
//! Predicates return `true` when the envelope is acceptable. Evaluation stops
//! at the first predicate that returns `false` and yields its message.

use std::borrow::Cow;
use std::fmt;

use crate::error::ValidationError;

type Predicate<E> = Box<dyn Fn(&E) -> bool + Send + Sync>;

struct Check<E> {
    message: Cow<'static, str>,
    predicate: Predicate<E>,
}

/// Priority-ordered validation rules for one envelope type.
///
/// # Example
///
/// ```ignore
/// let common = Validator::<ElbEvent>::new()
///     .require("Datacenter VPC ID invalid", |e| !e.vpc_id.is_empty())
///     .require("Datacenter Region invalid", |e| !e.datacenter_region.is_empty());
///
/// // Operation-specific checks run after the shared ones
/// let create = common.require("ELB must contain at least one port", |e| !e.ports.is_empty());
/// ```
pub struct Validator<E> {
    checks: Vec<Check<E>>,
}

impl<E> Validator<E> {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Append a check. It runs after every check already added.
    pub fn require<F>(mut self, message: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.checks.push(Check {
            message: message.into(),
            predicate: Box::new(predicate),
        });
        self
    }

    /// Append all checks of `other`, preserving their order.
    pub fn extend(mut self, other: Validator<E>) -> Self {
        self.checks.extend(other.checks);
        self
    }

    /// Return the first failing check's message, or `Ok` if all pass.
    pub fn validate(&self, envelope: &E) -> Result<(), ValidationError> {
        match self.checks.iter().find(|check| !(check.predicate)(envelope)) {
            Some(check) => Err(ValidationError::new(check.message.clone())),
            None => Ok(()),
        }
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl<E> Default for Validator<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Validator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.checks.iter().map(|c| &c.message))
            .finish()
    }
}

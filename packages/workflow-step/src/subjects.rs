//! Subject naming for a step: one trigger, one success, one failure subject.

use std::fmt;

/// The three subjects a step touches.
///
/// The trigger is `<resource>.<action>.<provider>`; outcomes are published to
/// `<trigger>.done` or `<trigger>.error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subjects {
    trigger: String,
    done: String,
    error: String,
}

impl Subjects {
    pub fn new(resource: &str, action: &str, provider: &str) -> Self {
        Self::from_trigger(format!("{}.{}.{}", resource, action, provider))
    }

    pub fn from_trigger(trigger: impl Into<String>) -> Self {
        let trigger = trigger.into();
        Self {
            done: format!("{}.done", trigger),
            error: format!("{}.error", trigger),
            trigger,
        }
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    pub fn done(&self) -> &str {
        &self.done
    }

    pub fn error(&self) -> &str {
        &self.error
    }
}

impl fmt::Display for Subjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.trigger)
    }
}

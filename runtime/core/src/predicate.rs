use binding_format::Predicate;

use crate::state::StateStore;

/// Pure evaluation of an enable condition against the current state.
pub trait EnablePredicate {
    fn is_enabled(&self, state: &StateStore) -> bool;
}

impl EnablePredicate for Predicate {
    fn is_enabled(&self, state: &StateStore) -> bool {
        match self {
            Predicate::Always => true,
            Predicate::Equals { field, value } => state.get(*field) == *value,
            Predicate::Not(inner) => !inner.is_enabled(state),
            Predicate::All(inner) => inner.iter().all(|p| p.is_enabled(state)),
            Predicate::Any(inner) => inner.iter().any(|p| p.is_enabled(state)),
        }
    }
}

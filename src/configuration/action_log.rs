//! The transaction journal.
//!
//! Applying runs three passes over the whole queue, in enqueue order:
//!
//! 1. `validate` every action. The first failure is returned and nothing has
//!    been touched.
//! 2. `apply_pre_create` every action. Failures are reported and skipped.
//! 3. `apply_post_create` every action, same policy.
//!
//! No post-create runs before every pre-create has finished. Rolling back
//! walks the queue in reverse and reports, but never returns, failures.

use crate::error::Error;
use crate::internal;
use crate::level::Level;
use std::fmt;

/// One reversible unit of configuration work.
pub trait ConfigAction: fmt::Debug {
    /// What the action reads and mutates.
    type State;
    /// Carried from `validate` to the apply passes.
    type Prepared;

    /// Checks preconditions and resolves values. Must not touch live objects.
    ///
    /// # Errors
    /// Any structural or validation failure; aborts the whole transaction.
    fn validate(&self, state: &Self::State) -> Result<Self::Prepared, Error>;

    /// Runs before any action's post-create.
    ///
    /// # Errors
    /// Reported to the diagnostic log and otherwise ignored.
    fn apply_pre_create(
        &self,
        state: &mut Self::State,
        prepared: &Self::Prepared,
    ) -> Result<(), Error>;

    /// # Errors
    /// Reported to the diagnostic log and otherwise ignored.
    fn apply_post_create(
        &self,
        state: &mut Self::State,
        prepared: &Self::Prepared,
    ) -> Result<(), Error>;

    /// Undoes the change to the configuration model.
    ///
    /// # Errors
    /// Reported to the diagnostic log and otherwise ignored.
    fn rollback(&self, state: &mut Self::State) -> Result<(), Error>;
}

/// Ordered queue of pending actions.
pub struct ActionLog<A> {
    actions: Vec<A>,
}

impl<A> Default for ActionLog<A> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl<A: fmt::Debug> fmt::Debug for ActionLog<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.actions).finish()
    }
}

impl<A: ConfigAction> ActionLog<A> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, action: A) {
        if internal::enabled("JOURNAL", Level::Trace) {
            internal::trace("JOURNAL", &format!("Queued {action:?}"));
        }
        self.actions.push(action);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    #[must_use]
    pub fn actions(&self) -> &[A] {
        &self.actions
    }

    /// Runs the three passes without draining the queue.
    ///
    /// # Errors
    /// The first validation failure. No action has been applied in that case.
    pub fn apply(&self, state: &mut A::State) -> Result<(), Error> {
        let prepared = self
            .actions
            .iter()
            .map(|action| action.validate(state))
            .collect::<Result<Vec<_>, _>>()?;

        for (action, prepared) in self.actions.iter().zip(&prepared) {
            if let Err(e) = action.apply_pre_create(state, prepared) {
                internal::error("COMMIT", &format!("Pre-create of {action:?} failed: {e}"));
            }
        }
        for (action, prepared) in self.actions.iter().zip(&prepared) {
            if let Err(e) = action.apply_post_create(state, prepared) {
                internal::error("COMMIT", &format!("Post-create of {action:?} failed: {e}"));
            }
        }
        Ok(())
    }

    /// Applies, then drains the queue.
    ///
    /// # Errors
    /// The first validation failure; the queue is kept so it can be rolled back.
    pub fn commit(&mut self, state: &mut A::State) -> Result<(), Error> {
        self.apply(state)?;
        self.actions.clear();
        Ok(())
    }

    /// Rolls every action back, newest first, and drains the queue.
    pub fn rollback(&mut self, state: &mut A::State) {
        for action in self.actions.drain(..).rev() {
            if let Err(e) = action.rollback(state) {
                internal::error("ROLLBACK", &format!("Rollback of {action:?} failed: {e}"));
            }
        }
    }

    /// Drops every queued action without running it.
    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

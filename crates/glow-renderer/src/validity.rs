//! Lazy invalidate/validate state machine.
//!
//! Invalidation may be requested from places where touching GPU resources
//! is unsafe (config notifications, setters). The actual rebuild is
//! deferred to the next [`Validator::validate`] checkpoint, and happens at
//! most once per invalidation.

use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Valid,
    Invalid,
}

/// What a call to [`Validator::validate`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// Already valid; nothing was checked.
    AlreadyValid,
    /// The owner reported its resources were still consistent.
    Confirmed,
    /// The owner rebuilt its resources.
    Rebuilt,
}

/// Owner-side checks driven by the [`Validator`].
pub trait Revalidate {
    /// Whether derived resources still match the current configuration.
    fn is_valid(&mut self) -> bool;

    /// Reconstruct derived resources from the current configuration.
    fn rebuild(&mut self);
}

#[derive(Debug)]
pub struct Validator {
    state: Validity,
    rebuilds: u64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            state: Validity::Invalid,
            rebuilds: 0,
        }
    }

    pub fn state(&self) -> Validity {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        self.state == Validity::Valid
    }

    /// Number of rebuilds performed since construction.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    /// Request validation at the next checkpoint. Safe to repeat.
    pub fn invalidate(&mut self) {
        self.state = Validity::Invalid;
    }

    /// Back to the initial state, as at the start of a session.
    pub fn reset(&mut self) {
        self.state = Validity::Invalid;
    }

    pub fn validate<R: Revalidate + ?Sized>(&mut self, owner: &mut R) -> Validation {
        if self.state == Validity::Valid {
            return Validation::AlreadyValid;
        }
        let outcome = if owner.is_valid() {
            Validation::Confirmed
        } else {
            owner.rebuild();
            self.rebuilds += 1;
            Validation::Rebuilt
        };
        self.state = Validity::Valid;
        trace!(?outcome, "validated");
        outcome
    }

    /// [`Validator::validate`] with closures in place of a [`Revalidate`]
    /// owner.
    pub fn validate_with(
        &mut self,
        is_valid: impl FnOnce() -> bool,
        rebuild: impl FnOnce(),
    ) -> Validation {
        struct Hooks<V, R>(Option<V>, Option<R>);

        impl<V: FnOnce() -> bool, R: FnOnce()> Revalidate for Hooks<V, R> {
            fn is_valid(&mut self) -> bool {
                self.0.take().map(|f| f()).unwrap_or(true)
            }

            fn rebuild(&mut self) {
                if let Some(f) = self.1.take() {
                    f();
                }
            }
        }

        self.validate(&mut Hooks(Some(is_valid), Some(rebuild)))
    }
}

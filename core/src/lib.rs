//! # Schemaform Core
//!
//! Core traits and types shared by every schemaform crate.
//!
//! Forms and list queries are modelled as small state machines:
//!
//! - **State**: what the view renders (values, errors, loading flags)
//! - **Action**: every input the state machine reacts to (user edits, submit
//!   requests, remote completions)
//! - **Reducer**: `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: a description of async work (remote calls, URL pushes)
//! - **Environment**: injected capabilities (clock, remote operation, location)
//!
//! Reducers never perform I/O. They mutate state in place and return effect
//! descriptions that the runtime executes, feeding resulting actions back in.
//!
//! ## Example
//!
//! ```
//! use schemaform_core::{effect::Effect, reducer::Reducer, smallvec, SmallVec};
//!
//! #[derive(Clone, Debug, Default)]
//! struct DraftState {
//!     title: String,
//! }
//!
//! #[derive(Clone, Debug)]
//! enum DraftAction {
//!     TitleChanged(String),
//! }
//!
//! struct DraftReducer;
//!
//! impl Reducer for DraftReducer {
//!     type State = DraftState;
//!     type Action = DraftAction;
//!     type Environment = ();
//!
//!     fn reduce(
//!         &self,
//!         state: &mut DraftState,
//!         action: DraftAction,
//!         _env: &(),
//!     ) -> SmallVec<[Effect<DraftAction>; 4]> {
//!         match action {
//!             DraftAction::TitleChanged(title) => state.title = title,
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! let mut state = DraftState::default();
//! DraftReducer.reduce(&mut state, DraftAction::TitleChanged("milk".into()), &());
//! assert_eq!(state.title, "milk");
//! ```

// Re-export commonly used types
pub use chrono::{DateTime, FixedOffset, Utc};
pub use serde::{Deserialize, Serialize};
pub use smallvec::{smallvec, SmallVec};

/// Declarative macros for building effects
pub mod effect_macros;

/// Reducer module - the core trait for state transitions
///
/// Reducers are pure functions: `(State, Action, Environment) → (State, Effects)`.
/// They are deterministic and testable without a running runtime.
pub mod reducer {
    use super::effect::Effect;
    use smallvec::SmallVec;

    /// The Reducer trait - core abstraction for view logic
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Environment`: The injected capabilities this reducer needs
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The environment type with injected capabilities
        type Environment;

        /// Reduce an action into state changes and effects
        ///
        /// Implementations update `state` in place and return the effects
        /// the runtime must execute. Most transitions produce at most a
        /// couple of effects, hence the inline capacity of four.
        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]>;
    }
}

/// Effect module - side effect descriptions
///
/// Effects are values returned by reducers. They are executed by the
/// `Store` in the runtime crate, never by the reducer itself.
pub mod effect {
    use std::future::Future;
    use std::pin::Pin;
    use std::time::Duration;

    /// Effect type - describes a side effect to be executed
    ///
    /// # Type Parameters
    ///
    /// - `Action`: The action type effects can feed back into the reducer
    pub enum Effect<Action> {
        /// No-op effect
        None,

        /// Run effects concurrently
        Parallel(Vec<Effect<Action>>),

        /// Run effects one after another, each finishing before the next starts
        Sequential(Vec<Effect<Action>>),

        /// Dispatch an action after a delay
        Delay {
            /// How long to wait
            duration: Duration,
            /// Action to dispatch after delay
            action: Box<Action>,
        },

        /// Arbitrary async computation
        ///
        /// Returns `Option<Action>` - if `Some`, the action is fed back into the reducer
        Future(Pin<Box<dyn Future<Output = Option<Action>> + Send>>),
    }

    // Manual Debug implementation since Future doesn't implement Debug
    impl<Action> std::fmt::Debug for Effect<Action>
    where
        Action: std::fmt::Debug,
    {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Effect::None => write!(f, "Effect::None"),
                Effect::Parallel(effects) => {
                    f.debug_tuple("Effect::Parallel").field(effects).finish()
                },
                Effect::Sequential(effects) => {
                    f.debug_tuple("Effect::Sequential").field(effects).finish()
                },
                Effect::Delay { duration, action } => f
                    .debug_struct("Effect::Delay")
                    .field("duration", duration)
                    .field("action", action)
                    .finish(),
                Effect::Future(_) => write!(f, "Effect::Future(<future>)"),
            }
        }
    }

    impl<Action> Effect<Action> {
        /// Combine effects to run concurrently
        #[must_use]
        pub const fn merge(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Parallel(effects)
        }

        /// Chain effects to run sequentially
        #[must_use]
        pub const fn chain(effects: Vec<Effect<Action>>) -> Effect<Action> {
            Effect::Sequential(effects)
        }

        /// Returns true for [`Effect::None`]
        #[must_use]
        pub const fn is_none(&self) -> bool {
            matches!(self, Effect::None)
        }
    }
}

/// Environment module - dependency injection traits
///
/// Every capability a reducer touches is reached through its environment,
/// so tests can swap in deterministic implementations.
pub mod environment {
    use chrono::{DateTime, FixedOffset, Local, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// Form defaults for `date` and `date-time` fields are rendered in the
    /// viewer's local offset, so the clock also reports that offset.
    ///
    /// # Examples
    ///
    /// ```
    /// use schemaform_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let local = clock.local_now();
    /// assert_eq!(local.timestamp(), local.with_timezone(&chrono::Utc).timestamp());
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;

        /// Offset of the viewer's local time zone
        fn local_offset(&self) -> FixedOffset {
            *Local::now().offset()
        }

        /// Current instant expressed in the local offset
        fn local_now(&self) -> DateTime<FixedOffset> {
            self.now().with_timezone(&self.local_offset())
        }
    }

    /// Production clock backed by the system time
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::effect::Effect;
    use super::environment::{Clock, SystemClock};
    use std::time::Duration;

    #[test]
    fn merge_and_chain_wrap_effects() {
        let merged = Effect::<()>::merge(vec![Effect::None, Effect::None]);
        assert!(matches!(merged, Effect::Parallel(ref effects) if effects.len() == 2));

        let chained = Effect::<()>::chain(vec![Effect::None]);
        assert!(matches!(chained, Effect::Sequential(ref effects) if effects.len() == 1));
    }

    #[test]
    fn debug_hides_future_body() {
        let effect: Effect<u8> = Effect::Future(Box::pin(async { Some(1) }));
        assert_eq!(format!("{effect:?}"), "Effect::Future(<future>)");

        let delayed = Effect::Delay {
            duration: Duration::from_millis(5),
            action: Box::new(7u8),
        };
        assert!(format!("{delayed:?}").contains("Effect::Delay"));
    }

    #[test]
    fn system_clock_local_now_is_same_instant() {
        let clock = SystemClock;
        let local = clock.local_now();
        let delta = (clock.now() - local.with_timezone(&chrono::Utc)).num_seconds();
        assert!(delta.abs() < 5);
    }
}

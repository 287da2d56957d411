//! # Schemaform Testing
//!
//! Testing utilities and helpers for schemaform reducers.
//!
//! This crate provides:
//! - A deterministic [`FixedClock`]
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Effect assertions and helpers that drive effects by hand
//! - A one-call tracing subscriber for test output
//!
//! ## Example
//!
//! ```ignore
//! use schemaform_testing::{test_clock, ReducerTest, assertions};
//!
//! ReducerTest::new(FormReducer::new())
//!     .with_env(test_environment())
//!     .given_state(FormState::default())
//!     .when_action(FormAction::Submit)
//!     .then_state(|state| assert!(state.submitting))
//!     .then_effects(assertions::assert_has_future_effect)
//!     .run();
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use schemaform_core::environment::Clock;

/// Reducer test harness
pub mod reducer_test;

/// Mock implementations of core environment traits
pub mod mocks {
    use super::{Clock, DateTime, FixedOffset, Utc};
    use chrono::Offset;

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same instant and reports a fixed local offset, so
    /// date defaults derived from it are reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use schemaform_testing::mocks::FixedClock;
    /// use schemaform_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
        offset: FixedOffset,
    }

    impl FixedClock {
        /// Create a new fixed clock in UTC
        #[must_use]
        pub fn new(time: DateTime<Utc>) -> Self {
            Self {
                time,
                offset: Utc.fix(),
            }
        }

        /// Report the given local offset instead of UTC
        #[must_use]
        pub const fn with_offset(mut self, offset: FixedOffset) -> Self {
            self.offset = offset;
            self
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }

        fn local_offset(&self) -> FixedOffset {
            self.offset
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse, which cannot happen.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Helpers for driving effects outside a `Store`
pub mod helpers {
    use schemaform_core::effect::Effect;

    /// Run every effect to completion and collect the actions they produce
    ///
    /// `Future` effects are awaited on the current thread, `Delay` effects
    /// yield their action immediately, and nested effects are flattened in
    /// order. Feedback actions are returned, not reduced.
    pub async fn collect_actions<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        let mut actions = Vec::new();
        let mut queue: Vec<Effect<A>> = effects.into_iter().collect();
        queue.reverse();

        while let Some(effect) = queue.pop() {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => actions.extend(fut.await),
                Effect::Delay { action, .. } => actions.push(*action),
                Effect::Parallel(nested) | Effect::Sequential(nested) => {
                    queue.extend(nested.into_iter().rev());
                },
            }
        }

        actions
    }

    /// Blocking form of [`collect_actions`] for synchronous tests
    pub fn block_on_actions<A, I>(effects: I) -> Vec<A>
    where
        I: IntoIterator<Item = Effect<A>>,
    {
        futures::executor::block_on(collect_actions(effects))
    }

    /// Install a `tracing` subscriber writing to the test output
    ///
    /// Safe to call from several tests; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

// Re-export commonly used items
pub use helpers::{block_on_actions, collect_actions, init_test_tracing};
pub use mocks::{test_clock, FixedClock};
pub use reducer_test::{assertions, ReducerTest};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use schemaform_core::effect::Effect;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.local_now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_fixed_clock_with_offset() {
        let Some(offset) = FixedOffset::east_opt(2 * 3600) else {
            unreachable!("two hours is a valid offset");
        };
        let clock = test_clock().with_offset(offset);
        assert_eq!(clock.local_now().to_rfc3339(), "2025-01-01T02:00:00+02:00");
    }

    #[test]
    fn test_collect_actions_flattens_in_order() {
        let effects = vec![
            Effect::Future(Box::pin(async { Some(1) })),
            Effect::Sequential(vec![
                Effect::Future(Box::pin(async { Some(2) })),
                Effect::None,
                Effect::Future(Box::pin(async { None })),
            ]),
            Effect::Delay {
                duration: std::time::Duration::from_secs(60),
                action: Box::new(3),
            },
        ];

        assert_eq!(block_on_actions(effects), vec![1, 2, 3]);
    }
}

//! Declarative macros for ergonomic effect construction
//!
//! Reducers build most of their effects from async blocks that capture a
//! cloned capability handle and resolve to an optional feedback action.

/// Create an `Effect::Future` from an async block
///
/// # Example
///
/// ```rust
/// use schemaform_core::{async_effect, effect::Effect};
///
/// #[derive(Debug)]
/// enum QueryAction {
///     Fetched { status: u16 },
/// }
///
/// let effect: Effect<QueryAction> = async_effect! {
///     Some(QueryAction::Fetched { status: 200 })
/// };
/// assert!(matches!(effect, Effect::Future(_)));
/// ```
#[macro_export]
macro_rules! async_effect {
    ($($body:tt)*) => {
        $crate::effect::Effect::Future(
            ::std::boxed::Box::pin(async move { $($body)* })
        )
    };
}

/// Create an `Effect::Delay` for scheduling delayed actions
///
/// # Example
///
/// ```rust
/// use schemaform_core::{delay, effect::Effect};
/// use std::time::Duration;
///
/// #[derive(Debug)]
/// enum FormAction {
///     ClearNotice,
/// }
///
/// let effect: Effect<FormAction> = delay! {
///     duration: Duration::from_secs(3),
///     action: FormAction::ClearNotice
/// };
/// assert!(matches!(effect, Effect::Delay { .. }));
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}

//! In-memory implementations of every capability, for tests and demos.

mod guard;
mod location;
mod remote;
mod session;

pub use guard::RecordingLeaveGuard;
pub use location::MemoryLocation;
pub use remote::{MockDataSource, MockRemote};
pub use session::MockSession;

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mock's mutex; a poisoned lock still yields its data.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

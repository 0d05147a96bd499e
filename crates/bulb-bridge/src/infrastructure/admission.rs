//! Admission control for inbound connections.
//!
//! Every admitted connection holds a [`Permit`] for its whole lifetime.  The
//! permit keeps the in-flight depth counter raised and carries the
//! cancellation token of the generation it was admitted under.
//!
//! When a connection arrives while the depth is already at the ceiling, the
//! current generation is cancelled, which aborts every admitted handler, and a
//! fresh generation is installed for the connections that follow.  The new
//! connection itself is refused.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Why a connection was not admitted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdmissionError {
    /// The depth counter was at or above the ceiling.
    #[error("overloaded: {depth} connections in flight, ceiling {ceiling}")]
    Overloaded { depth: usize, ceiling: usize },
}

/// Process-wide in-flight counter plus the current cancellation generation.
#[derive(Debug)]
pub struct Admission {
    depth: Arc<AtomicUsize>,
    ceiling: usize,
    generation: Mutex<CancellationToken>,
}

impl Admission {
    pub fn new(ceiling: usize) -> Self {
        Self {
            depth: Arc::new(AtomicUsize::new(0)),
            ceiling,
            generation: Mutex::new(CancellationToken::new()),
        }
    }

    /// Tries to admit one connection.
    ///
    /// # Errors
    ///
    /// Returns [`AdmissionError::Overloaded`] when the ceiling is reached.
    /// In that case every permit issued so far has been cancelled.
    pub fn admit(&self) -> Result<Permit, AdmissionError> {
        // The guard is taken first so the slot is released on every path.
        let guard = InFlightGuard::enter(Arc::clone(&self.depth));
        let depth = guard.previous;

        let mut generation = self.generation.lock().unwrap_or_else(PoisonError::into_inner);
        if depth >= self.ceiling {
            generation.cancel();
            *generation = CancellationToken::new();
            return Err(AdmissionError::Overloaded {
                depth,
                ceiling: self.ceiling,
            });
        }

        Ok(Permit {
            token: generation.clone(),
            _guard: guard,
        })
    }

    /// Connections currently holding a permit (plus any being refused).
    pub fn in_flight(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }
}

/// Proof of admission, released on drop.
#[derive(Debug)]
pub struct Permit {
    token: CancellationToken,
    _guard: InFlightGuard,
}

impl Permit {
    /// Resolves once this permit's generation has been cancelled.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Increments the depth counter on creation and decrements it on drop,
/// including on panic or task cancellation.
#[derive(Debug)]
struct InFlightGuard {
    depth: Arc<AtomicUsize>,
    previous: usize,
}

impl InFlightGuard {
    fn enter(depth: Arc<AtomicUsize>) -> Self {
        let previous = depth.fetch_add(1, Ordering::SeqCst);
        Self { depth, previous }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::SeqCst);
    }
}

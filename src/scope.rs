// src/scope.rs

//! Cancellation scopes.
//!
//! A [`Scope`] is a cancellation signal plus an optional deadline. Scopes form
//! a tree: cancelling a scope cancels every scope derived from it, while
//! cancelling a child leaves its parent and siblings alone. A child's deadline
//! is never later than its parent's.
//!
//! The signal half is a `tokio_util` [`CancellationToken`]; the deadline half
//! is observed lazily by [`Scope::done`], so no timer exists unless somebody
//! is waiting on the scope.

use std::fmt;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a scope ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeEnd {
    /// The scope (or one of its ancestors) was cancelled explicitly.
    Cancelled,
    /// The scope's deadline passed.
    DeadlineExceeded,
}

impl fmt::Display for ScopeEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeEnd::Cancelled => f.write_str("scope cancelled"),
            ScopeEnd::DeadlineExceeded => f.write_str("deadline exceeded"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Scope {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Scope {
    /// A root scope with no deadline.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: None,
        }
    }

    /// A root scope that ends `timeout` from now.
    ///
    /// A deadline too far away to represent means no deadline.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            token: CancellationToken::new(),
            deadline: Instant::now().checked_add(timeout),
        }
    }

    /// Derive a scope that inherits this one's cancellation and deadline.
    pub fn child(&self) -> Scope {
        Scope {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Derive a scope that additionally ends `timeout` from now.
    ///
    /// A zero `timeout`, or one too large to represent, adds no deadline of
    /// its own, matching [`Scope::child`].
    pub fn child_with_timeout(&self, timeout: Duration) -> Scope {
        if timeout.is_zero() {
            return self.child();
        }
        let Some(own) = Instant::now().checked_add(timeout) else {
            return self.child();
        };

        let deadline = match self.deadline {
            Some(parent) if parent < own => parent,
            _ => own,
        };

        Scope {
            token: self.token.child_token(),
            deadline: Some(deadline),
        }
    }

    /// Cancel this scope and everything derived from it. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: `Some` if the scope has already ended.
    ///
    /// Cancellation wins over an expired deadline when both hold.
    pub fn end(&self) -> Option<ScopeEnd> {
        if self.token.is_cancelled() {
            return Some(ScopeEnd::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ScopeEnd::DeadlineExceeded),
            _ => None,
        }
    }

    /// Wait until the scope ends and report why.
    pub async fn done(&self) -> ScopeEnd {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => ScopeEnd::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => ScopeEnd::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                ScopeEnd::Cancelled
            }
        }
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

use std::sync::atomic::{AtomicUsize, Ordering};

use nt_core::{Error, Result};

/// Model calls allowed for one incoming request.
pub const DEFAULT_REQUEST_LIMIT: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageLimits {
    pub request_limit: usize,
}

impl Default for UsageLimits {
    fn default() -> Self {
        Self {
            request_limit: DEFAULT_REQUEST_LIMIT,
        }
    }
}

/// Counts model calls made on behalf of one request.
#[derive(Debug)]
pub struct Usage {
    limits: UsageLimits,
    requests: AtomicUsize,
}

impl Usage {
    pub fn new(limits: UsageLimits) -> Self {
        Self {
            limits,
            requests: AtomicUsize::new(0),
        }
    }

    /// Reserves one model call, failing once the limit is spent.
    pub fn record_request(&self) -> Result<()> {
        let used = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        if used > self.limits.request_limit {
            return Err(Error::UsageLimitExceeded {
                limit: self.limits.request_limit,
            });
        }
        Ok(())
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst).min(self.limits.request_limit)
    }
}

impl Default for Usage {
    fn default() -> Self {
        Self::new(UsageLimits::default())
    }
}

//! Hit-Rate Instrumentation
//!
//! Two independent hit/request counter pairs are updated on every lookup:
//!
//! - **absolute**: since construction or the last clear.
//! - **relative**: since the last self-reset of a rolling window. When a
//!   request pushes the relative request count past the window size, both
//!   relative counters restart and that request becomes request #1 of the
//!   new window.
//!
//! Rates are rounded to two decimals and are `0.0` while no hit has been
//! recorded.

use core::num::NonZeroU64;

/// Absolute and rolling-window hit counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitCounters {
    abs_hit: u64,
    abs_req: u64,
    rel_hit: u64,
    rel_req: u64,
    window: NonZeroU64,
}

impl HitCounters {
    /// Zeroed counters with the given window size.
    pub fn new(window: NonZeroU64) -> Self {
        Self {
            abs_hit: 0,
            abs_req: 0,
            rel_hit: 0,
            rel_req: 0,
            window,
        }
    }

    /// Counts a lookup before its outcome is known.
    ///
    /// Returns `true` if this request rolled the relative window over.
    pub fn record_request(&mut self) -> bool {
        self.abs_req += 1;
        self.rel_req += 1;
        if self.rel_req > self.window.get() {
            self.rel_req = 1;
            self.rel_hit = 0;
            true
        } else {
            false
        }
    }

    /// Counts the current lookup as a hit.
    pub fn record_hit(&mut self) {
        self.abs_hit += 1;
        self.rel_hit += 1;
    }

    /// Zeroes every counter and adopts a (possibly new) window size.
    pub fn reset(&mut self, window: NonZeroU64) {
        *self = Self::new(window);
    }

    /// Window size of the relative counters.
    #[inline]
    pub fn window(&self) -> NonZeroU64 {
        self.window
    }

    /// Lifetime hits.
    #[inline]
    pub fn hits(&self) -> u64 {
        self.abs_hit
    }

    /// Lifetime requests.
    #[inline]
    pub fn requests(&self) -> u64 {
        self.abs_req
    }

    /// Hits in the current window.
    #[inline]
    pub fn window_hits(&self) -> u64 {
        self.rel_hit
    }

    /// Requests in the current window.
    #[inline]
    pub fn window_requests(&self) -> u64 {
        self.rel_req
    }

    /// `hits / requests` since the last clear, two decimals.
    pub fn abs_hit_rate(&self) -> f64 {
        rounded_rate(self.abs_hit, self.abs_req)
    }

    /// `hits / requests` in the current window, two decimals.
    pub fn rel_hit_rate(&self) -> f64 {
        rounded_rate(self.rel_hit, self.rel_req)
    }
}

fn rounded_rate(hits: u64, requests: u64) -> f64 {
    if hits == 0 {
        return 0.0;
    }
    let rate = hits as f64 / requests as f64;
    (rate * 100.0).round() / 100.0
}

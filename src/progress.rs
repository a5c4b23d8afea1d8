// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A counter of pixels requested against pixels delivered.  It has a
//! lock of its own so that a progress bar can poll it while a render
//! holds the fractal.

use std::sync::{Mutex, MutexGuard};

#[derive(Debug)]
struct State {
    requested: usize,
    finished: usize,
    is_finished: bool,
    abandoned: bool,
}

/// Tracks one request at a time.  A fresh tracker reports a finished
/// request.
#[derive(Debug)]
pub struct Progress {
    state: Mutex<State>,
}

impl Default for Progress {
    fn default() -> Self {
        Progress::new()
    }
}

impl Progress {
    /// Constructor.
    pub fn new() -> Progress {
        Progress {
            state: Mutex::new(State {
                requested: 0,
                finished: 0,
                is_finished: true,
                abandoned: false,
            }),
        }
    }

    // A panicking worker cannot leave the counters half-written, so
    // a poisoned lock is still safe to read.
    fn state(&self) -> MutexGuard<State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts counting toward `requested` elements, discarding
    /// whatever the previous request had reached.
    pub fn new_request(&self, requested: usize) {
        assert!(requested > 0, "a progress request needs at least one element");
        let mut state = self.state();
        state.requested = requested;
        state.finished = 0;
        state.is_finished = false;
        state.abandoned = false;
    }

    /// Records one delivered element.
    pub fn element_finished(&self) {
        let mut state = self.state();
        assert!(
            state.finished < state.requested,
            "more elements finished than the {} requested",
            state.requested
        );
        state.finished += 1;
        if state.finished == state.requested {
            state.is_finished = true;
        }
    }

    /// Closes a request that will never deliver its remaining
    /// elements.  The request counts as finished from then on, the
    /// fraction stays where it stopped, and `is_abandoned` turns true.
    /// Returns false, changing nothing, if the request had already
    /// finished.
    pub fn abandon(&self) -> bool {
        let mut state = self.state();
        if state.is_finished {
            return false;
        }
        state.is_finished = true;
        state.abandoned = true;
        true
    }

    /// Whether the current request is over, either because every
    /// element was delivered or because it was abandoned.
    pub fn is_finished(&self) -> bool {
        self.state().is_finished
    }

    /// Whether the current request ended short.
    pub fn is_abandoned(&self) -> bool {
        self.state().abandoned
    }

    /// The delivered fraction of the current request, from 0 to 1.
    /// Before any request has been made there is nothing outstanding,
    /// and this reports 1.
    pub fn fraction(&self) -> f64 {
        let state = self.state();
        if state.requested == 0 {
            return 1.0;
        }
        state.finished as f64 / state.requested as f64
    }
}

use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::api::{FetchError, Post};
use crate::data::PostService;

/// Outcome handle of one fetch activation. Starts in `Loading` and moves to
/// exactly one terminal variant; the enum makes "loading, data, and error are
/// mutually exclusive" structural.
#[derive(Debug)]
pub enum FetchState {
    Loading,
    Success(Vec<Post>),
    Failure(FetchError),
}

impl FetchState {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&[Post]> {
        match self {
            FetchState::Success(posts) => Some(posts),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failure(err) => Some(err),
            _ => None,
        }
    }
}

/// One fetch activation: a single worker thread, a single terminal message.
/// Re-fetching means calling [`activate`] again for a fresh handle; a settled
/// handle never transitions again.
pub struct FetchHandle {
    rx: Receiver<Result<Vec<Post>, FetchError>>,
    state: FetchState,
}

/// Spawns the one-shot worker. The request runs off the UI thread and the
/// outcome is delivered over a channel, so the caller stays responsive.
pub fn activate(service: Arc<dyn PostService>) -> FetchHandle {
    let (tx, rx) = bounded(1);
    thread::spawn(move || {
        let _ = tx.send(service.fetch_posts());
    });
    FetchHandle {
        rx,
        state: FetchState::Loading,
    }
}

impl FetchHandle {
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Drains the worker channel without blocking. Returns true when the
    /// activation settled on this call. The Loading -> terminal transition
    /// happens at most once; polling a settled handle is a no-op.
    pub fn poll(&mut self) -> bool {
        if !self.state.is_loading() {
            return false;
        }
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.settle(outcome);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                // Worker died without reporting; never leave the handle
                // stuck in Loading.
                self.settle(Err(FetchError::Network(
                    "fetch worker exited before settling".into(),
                )));
                true
            }
        }
    }

    /// Blocks until the activation settles. Intended for tests and shutdown
    /// paths; the event loop uses [`poll`](Self::poll).
    pub fn wait(&mut self) -> &FetchState {
        if self.state.is_loading() {
            let outcome = self.rx.recv().unwrap_or_else(|_| {
                Err(FetchError::Network(
                    "fetch worker exited before settling".into(),
                ))
            });
            self.settle(outcome);
        }
        &self.state
    }

    fn settle(&mut self, outcome: Result<Vec<Post>, FetchError>) {
        self.state = match outcome {
            Ok(posts) => FetchState::Success(posts),
            Err(err) => FetchState::Failure(err),
        };
    }
}

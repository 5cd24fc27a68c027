//! Background font loading.
//!
//! Reading and extruding a typeface takes long enough to stall the first
//! frames, so it runs on a worker thread. The worker reports exactly once
//! through the callback handed to [`FontTask::spawn`], with either the mesh
//! or the reason it has none.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::mesh::{TextMesh, TextStyle};
use super::typeface::Typeface;
use crate::error::FontError;

/// What to load and how to shape it.
#[derive(Debug, Clone)]
pub struct FontRequest {
    pub path: PathBuf,
    pub text: String,
    pub style: TextStyle,
}

impl FontRequest {
    /// Run the request on the calling thread.
    pub fn run(&self, cancel: &AtomicBool) -> Result<TextMesh, FontError> {
        let cancelled = || cancel.load(Ordering::Relaxed);
        if cancelled() {
            return Err(FontError::Cancelled);
        }
        let typeface = Typeface::load(&self.path)?;
        TextMesh::build_cancellable(&typeface, &self.text, &self.style, &cancelled)
    }
}

/// Whether a load that failed with `err` after `attempts` tries should be
/// started again, given `retries` extra attempts are allowed.
pub fn should_retry(err: &FontError, attempts: u32, retries: u32) -> bool {
    err.is_retryable() && attempts <= retries
}

/// Handle to an in-flight font load.
///
/// Dropping the handle cancels the load; the worker is detached rather than
/// joined so a slow disk never blocks shutdown.
pub struct FontTask {
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FontTask {
    /// Start loading on a worker thread. `on_done` runs on that thread.
    ///
    /// Fails only if the OS refuses to create the thread, in which case
    /// `on_done` is never called.
    pub fn spawn<F>(request: FontRequest, on_done: F) -> std::io::Result<Self>
    where
        F: FnOnce(Result<TextMesh, FontError>) + Send + 'static,
    {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let handle = thread::Builder::new()
            .name("font-loader".into())
            .spawn(move || {
                let reporter = Reporter(Some(on_done));
                log::info!("loading font {}", request.path.display());
                reporter.report(request.run(&flag));
            })?;

        Ok(Self {
            cancel,
            handle: Some(handle),
        })
    }

    /// Ask the worker to stop at the next glyph boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Block until the worker exits.
    pub fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("font loader thread panicked");
            }
        }
    }
}

/// Calls the completion callback exactly once, with `Disconnected` if the
/// worker unwinds before reporting.
struct Reporter<F: FnOnce(Result<TextMesh, FontError>)>(Option<F>);

impl<F: FnOnce(Result<TextMesh, FontError>)> Reporter<F> {
    fn report(mut self, result: Result<TextMesh, FontError>) {
        if let Some(on_done) = self.0.take() {
            on_done(result);
        }
    }
}

impl<F: FnOnce(Result<TextMesh, FontError>)> Drop for Reporter<F> {
    fn drop(&mut self) {
        if let Some(on_done) = self.0.take() {
            on_done(Err(FontError::Disconnected));
        }
    }
}

impl Drop for FontTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel();
        }
    }
}

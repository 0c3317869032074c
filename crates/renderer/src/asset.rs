//! Background image decoding with an explicit pending / ready state.
//!
//! Decoding happens on a worker thread; the render loop polls the handle once
//! per frame and only uses the image after it has resolved.

use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

/// Result of polling an [`ImageHandle`].
#[derive(Debug)]
pub enum LoadState {
    /// Still decoding.
    Pending,
    /// Decoded. Returned once; the handle is spent afterwards.
    Ready(RgbaImage),
    /// Could not be read or decoded.
    Failed(anyhow::Error),
}

impl LoadState {
    pub fn is_pending(&self) -> bool {
        matches!(self, LoadState::Pending)
    }
}

/// An image being decoded off the render thread.
pub struct ImageHandle {
    path: PathBuf,
    receiver: Option<Receiver<Result<RgbaImage>>>,
}

impl ImageHandle {
    /// Start decoding `path` on a worker thread.
    pub fn spawn(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let (sender, receiver) = mpsc::channel();
        let worker_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("image-loader".into())
            .spawn(move || {
                let result = image::open(&worker_path)
                    .map(|img| img.to_rgba8())
                    .with_context(|| format!("failed to load image {}", worker_path.display()));
                // The handle may have been dropped; nothing to report then.
                let _ = sender.send(result);
            });
        if let Err(e) = spawned {
            log::error!("Could not start image loader for {:?}: {}", path, e);
        }

        Self {
            path,
            receiver: Some(receiver),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check. `Ready` / `Failed` are reported exactly once.
    pub fn poll(&mut self) -> LoadState {
        let Some(receiver) = &self.receiver else {
            return LoadState::Failed(anyhow::anyhow!(
                "image {} was already consumed",
                self.path.display()
            ));
        };
        let state = match receiver.try_recv() {
            Ok(Ok(image)) => LoadState::Ready(image),
            Ok(Err(e)) => LoadState::Failed(e),
            Err(TryRecvError::Empty) => return LoadState::Pending,
            Err(TryRecvError::Disconnected) => LoadState::Failed(anyhow::anyhow!(
                "image loader for {} exited without a result",
                self.path.display()
            )),
        };
        self.receiver = None;
        state
    }
}

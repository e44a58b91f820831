use std::fs::File;
use std::io::BufReader;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStreamHandle, Sink};
use services::{ClipPlayer, PlaybackError};

/// How often a waiting `play` call checks whether its sink drained.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One playback channel on the default audio device.
///
/// The `OutputStream` itself is not `Send`, so the binary keeps it alive
/// on the main task and hands out handles; each channel owns at most one
/// live sink. Starting a new clip stops whatever the channel was playing.
pub struct RodioChannel {
    handle: OutputStreamHandle,
    current: Mutex<Option<Arc<Sink>>>,
}

impl RodioChannel {
    #[must_use]
    pub fn new(handle: OutputStreamHandle) -> Self {
        Self {
            handle,
            current: Mutex::new(None),
        }
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<Arc<Sink>>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ClipPlayer for RodioChannel {
    async fn play(&self, path: &str) -> Result<(), PlaybackError> {
        let sink = Sink::try_new(&self.handle)
            .map_err(|err| PlaybackError(format!("{path}: {err}")))?;
        let file = File::open(path).map_err(|err| PlaybackError(format!("{path}: {err}")))?;
        let source =
            Decoder::new(BufReader::new(file)).map_err(|err| PlaybackError(format!("{path}: {err}")))?;
        sink.append(source);

        let sink = Arc::new(sink);
        if let Some(old) = self.lock_current().replace(Arc::clone(&sink)) {
            old.stop();
        }

        // A replaced or stopped sink reports empty, which ends the wait.
        while !sink.empty() {
            tokio::time::sleep(POLL_INTERVAL).await;
        }
        Ok(())
    }

    fn is_playing(&self) -> bool {
        self.lock_current()
            .as_ref()
            .is_some_and(|sink| !sink.empty())
    }

    fn stop(&self) {
        if let Some(sink) = self.lock_current().take() {
            sink.stop();
        }
    }
}

/// Stand-in channel for machines without an audio device.
pub struct SilentChannel;

#[async_trait]
impl ClipPlayer for SilentChannel {
    async fn play(&self, _path: &str) -> Result<(), PlaybackError> {
        Ok(())
    }

    fn is_playing(&self) -> bool {
        false
    }

    fn stop(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn silent_channel_swallows_everything() {
        let channel = SilentChannel;
        assert!(channel.play("does/not/exist.ogg").await.is_ok());
        assert!(!channel.is_playing());
        channel.stop();
    }
}

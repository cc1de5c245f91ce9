//! Frame ticker driving scroll physics.
//!
//! A dedicated low-priority thread advancing [`VirtualScroller::tick`] at the
//! configured frame rate. The handle stops the thread on `stop()` or drop,
//! keeping the lifecycle explicit; there is no ambient background loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, warn};

use super::VirtualScroller;

/// Handle to the physics thread. Dropping the handle stops the thread.
pub struct FrameTicker {
    stop_flag: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FrameTicker {
    /// Spawn the ticker thread at the given frame rate (clamped to >= 1 fps).
    pub fn start(scroller: Arc<VirtualScroller>, target_fps: u32) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_flag = Arc::clone(&stop_flag);
        let frame_time = Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1)));

        let handle = thread::Builder::new()
            .name("gridview-ticker".to_string())
            .spawn(move || {
                debug!("frame ticker started ({target_fps} fps)");
                while !thread_flag.load(Ordering::Relaxed) {
                    scroller.tick();
                    thread::sleep(frame_time);
                }
                debug!("frame ticker stopped");
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("failed to spawn frame ticker: {e}");
                None
            }
        };

        Self { stop_flag, handle }
    }

    /// Whether the ticker thread is running.
    pub fn is_running(&self) -> bool {
        self.handle.is_some() && !self.stop_flag.load(Ordering::Relaxed)
    }

    /// Signal the thread to stop and wait for it to exit.
    pub fn stop(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

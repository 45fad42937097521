//! Process-wide reachability flag read by every synchronizer.

use tokio::sync::watch;

/// Cloneable handle over one shared online/offline flag.
///
/// Set by a network observer, read synchronously before every operation.
#[derive(Clone, Debug)]
pub struct Connectivity {
    state: watch::Sender<bool>,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        let (state, _) = watch::channel(online);
        Self { state }
    }

    pub fn is_online(&self) -> bool {
        *self.state.borrow()
    }

    /// Replace the flag, logging transitions.
    pub fn set_online(&self, online: bool) {
        let previous = self.state.send_replace(online);
        match (previous, online) {
            (true, false) => tracing::warn!("Connectivity lost; serving from local mirror"),
            (false, true) => tracing::info!("Connectivity restored"),
            _ => {}
        }
    }

    /// Observe flag changes.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.state.subscribe()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

//! Cancellation passed down the call chain.

use tokio::sync::watch;

/// Owner side: triggers the paired [`AbortSignal`].
#[derive(Debug)]
pub struct AbortHandle(watch::Sender<bool>);

/// Observer side, cheap to clone.
#[derive(Clone, Debug)]
pub struct AbortSignal(watch::Receiver<bool>);

impl AbortHandle {
    pub fn pair() -> (Self, AbortSignal) {
        let (sender, receiver) = watch::channel(false);
        (Self(sender), AbortSignal(receiver))
    }

    pub fn abort(&self) {
        self.0.send_replace(true);
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal(self.0.subscribe())
    }
}

impl AbortSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_, receiver) = watch::channel(false);
        Self(receiver)
    }

    pub fn is_aborted(&self) -> bool {
        *self.0.borrow()
    }

    /// Resolves once aborted. Pends forever if the handle was dropped first.
    pub async fn aborted(&self) {
        let mut receiver = self.0.clone();
        if receiver.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

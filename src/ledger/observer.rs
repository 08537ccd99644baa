use serde::Serialize;

/// Change notifications emitted by a [`super::Chain`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChainEvent {
    /// Cooperative mining reached a yield boundary.
    ///
    /// Sampled at the schedule's yield interval, not emitted for every nonce
    /// increment; with an interval of 1 every increment is reported.
    NonceAdvanced { index: u64, nonce: u64, seal: String },
    /// A mined block was linked onto the chain.
    BlockAppended { index: u64, seal: String },
}

/// Subscriber for [`ChainEvent`]s, e.g. a UI adapter that redraws on change.
pub trait ChainObserver: Send + Sync {
    fn notify(&self, event: &ChainEvent);
}

impl<F> ChainObserver for F
where
    F: Fn(&ChainEvent) + Send + Sync,
{
    fn notify(&self, event: &ChainEvent) {
        self(event)
    }
}

//! Utilities for valid-ready channels.

/// Valid/ready channel's forward signals.
///
/// The payload is only meaningful while the valid bit is high, so it is stored as an `Option`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Valid<V> {
    inner: Option<V>,
}

impl<V> Valid<V> {
    /// Creates a new forward signal.
    pub fn new(valid: bool, inner: V) -> Self { Self { inner: valid.then_some(inner) } }

    /// Creates an invalid signal.
    pub fn invalid() -> Self { Self { inner: None } }

    /// Creates a valid signal.
    pub fn valid(inner: V) -> Self { Self { inner: Some(inner) } }

    /// Valid bit.
    pub fn is_valid(&self) -> bool { self.inner.is_some() }

    /// Inner data, if valid.
    pub fn inner(&self) -> Option<&V> { self.inner.as_ref() }

    /// Takes the inner data out.
    pub fn into_inner(self) -> Option<V> { self.inner }

    /// Maps the inner value.
    pub fn map_inner<W, F: FnOnce(V) -> W>(self, f: F) -> Valid<W> { Valid { inner: self.inner.map(f) } }
}

impl<V> Default for Valid<V> {
    fn default() -> Self { Self::invalid() }
}

impl<V> From<Option<V>> for Valid<V> {
    fn from(inner: Option<V>) -> Self { Self { inner } }
}

/// Ready signal.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Ready {
    /// Ready bit
    pub ready: bool,
}

impl Ready {
    /// Creates a new ready signal.
    pub fn new(ready: bool) -> Self { Self { ready } }
}

/// A component advanced by a clock, seen through its valid/ready ports.
///
/// Each call to [`Clocked::tick`] is one clock cycle: given this cycle's ingress forward signal and egress backward
/// signal, it returns the egress forward and ingress backward signals that were presented during the cycle, and
/// updates the state for the transfers that happened. A transfer happens on a side when valid and ready are both
/// high there.
pub trait Clocked {
    /// Ingress payload.
    type In;

    /// Egress payload.
    type Out;

    /// Error raised by a transfer.
    type Error;

    /// Advances one cycle.
    fn tick(
        &mut self, ingress_fwd: &Valid<Self::In>, egress_bwd: Ready,
    ) -> Result<(Valid<Self::Out>, Ready), Self::Error>;
}

/// Classification of a source failure.
///
/// Used by the credential rotator to decide whether another credential can help.
///
/// | Class | Rotate credential? | Typical cause |
/// |-------|--------------------|---------------|
/// | `Quota` | Yes | HTTP 429/403 quota signal |
/// | `Transient` | Yes | transport error, bad status, unparseable body |
/// | `Terminal` | No | misconfiguration, pool already exhausted |
///
/// The aggregator treats every class the same way: the adapter contributes nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureClass {
    /// The credential (or source) is out of quota. Move on to the next credential.
    Quota,

    /// The call failed for a reason unrelated to the query itself.
    /// Another credential may succeed.
    Transient,

    /// Retrying with a different credential cannot help.
    Terminal,
}

impl FailureClass {
    /// Whether the rotator should advance to the next credential.
    pub fn should_rotate(self) -> bool {
        matches!(self, Self::Quota | Self::Transient)
    }
}

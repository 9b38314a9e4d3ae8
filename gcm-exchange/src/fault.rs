use gcm_mesh::ZoneId;

/// Everything that can go wrong inside the exchange core. Every
/// variant is fatal to the step that raised it -- nothing here is
/// retried, since a corrupt halo would otherwise propagate silently
/// into the next physics step.
#[derive(Debug)]
pub enum Fault {
    /// A `ZoneMap` lookup named a zone outside `[0, N)`.
    UnknownZone(ZoneId),
    /// Two paired processes disagree on how many indices a descriptor
    /// covers; indicates a setup bug.
    DescriptorMismatch { expected: usize, actual: usize },
    /// A sentinel-drain counter went negative, or a probe returned a
    /// payload of unexpected shape.
    ProtocolDesync(String),
    /// The transport reported a failure at the call site of the
    /// primitive that faulted.
    Transport(String),
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Fault::UnknownZone(zone) => write!(f, "unknown zone: {zone}"),
            Fault::DescriptorMismatch { expected, actual } => write!(
                f,
                "descriptor mismatch: expected {expected} indices, got {actual}"
            ),
            Fault::ProtocolDesync(msg) => write!(f, "protocol desync: {msg}"),
            Fault::Transport(msg) => write!(f, "transport error: {msg}"),
        }
    }
}

impl std::error::Error for Fault {}

// `gcm_base::Error` carries a blanket `From<E: std::error::Error +
// Send + Sync + 'static>` impl, so `Fault` converts into it (logging
// at `error!` on the way, same as every other error in this codebase)
// without a bespoke impl here -- see `gcm_base::error`.

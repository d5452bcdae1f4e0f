//! The closed set of request kinds the coordinator understands.

/// One of the eight symbolic request kinds, plus the `Unknown` sentinel used only as
/// an upper bound for validation. Ordering is fixed and is relied on as an index by
/// [`RequestKind::ALL`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Mount,
    Unmount,
    GetMetadata,
    ReadDirectory,
    OpenFile,
    CloseFile,
    ReadFile,
    Abort,
    /// Upper bound sentinel; never a valid kind for a live request.
    Unknown,
}

impl RequestKind {
    /// All real (non-`Unknown`) kinds, in their fixed order.
    pub const ALL: [RequestKind; 8] = [
        RequestKind::Mount,
        RequestKind::Unmount,
        RequestKind::GetMetadata,
        RequestKind::ReadDirectory,
        RequestKind::OpenFile,
        RequestKind::CloseFile,
        RequestKind::ReadFile,
        RequestKind::Abort,
    ];

    /// The fixed event name fired for this kind, or `None` for `Mount` (which never
    /// produces an event — see the provider facade) and `Unknown`.
    pub fn event_name(self) -> Option<&'static str> {
        match self {
            RequestKind::Mount | RequestKind::Unknown => None,
            RequestKind::Unmount => Some("unmountrequested"),
            RequestKind::GetMetadata => Some("getmetadatarequested"),
            RequestKind::ReadDirectory => Some("readdirectoryrequested"),
            RequestKind::OpenFile => Some("openfilerequested"),
            RequestKind::CloseFile => Some("closefilerequested"),
            RequestKind::ReadFile => Some("readfilerequested"),
            RequestKind::Abort => Some("abortrequested"),
        }
    }
}

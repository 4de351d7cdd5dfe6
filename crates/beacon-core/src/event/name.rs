use serde::{Deserialize, Serialize};

/// Event name newtype.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventName(pub String);

impl EventName {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Initialization events are emitted during SDK boot and must wait for
    /// the foreground before being bundled.
    pub fn is_initialization_event(&self) -> bool {
        matches!(
            self.as_str(),
            "native_app_install" | "native_app_update" | "native_app_open" | "native_app_crashed"
        )
    }

    /// Whether commands for this event may be persisted and replayed.
    /// Variables-fetch results are bound to one response cycle and must
    /// never be retransmitted.
    pub fn is_retryable(&self) -> bool {
        self.as_str() != "_fetch_variables"
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Well-known event names.
impl EventName {
    pub fn view() -> Self {
        Self::new("view")
    }

    pub fn identify() -> Self {
        Self::new("identify")
    }

    pub fn attribute() -> Self {
        Self::new("attribute")
    }

    pub fn native_app_install() -> Self {
        Self::new("native_app_install")
    }

    pub fn native_app_update() -> Self {
        Self::new("native_app_update")
    }

    pub fn native_app_open() -> Self {
        Self::new("native_app_open")
    }

    pub fn native_app_foreground() -> Self {
        Self::new("native_app_foreground")
    }

    pub fn native_app_background() -> Self {
        Self::new("native_app_background")
    }

    pub fn native_app_crashed() -> Self {
        Self::new("native_app_crashed")
    }

    pub fn native_app_renew_visitor_id() -> Self {
        Self::new("native_app_renew_visitor_id")
    }

    pub fn deep_link_app_open() -> Self {
        Self::new("deep_link_app_open")
    }

    pub fn fetch_variables() -> Self {
        Self::new("_fetch_variables")
    }
}

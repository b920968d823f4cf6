use uuid::Uuid;

/// Source of session tokens attached to every message of a logger instance.
pub trait SessionIdProvider: Send + Sync {
    fn session_id(&self) -> String;
}

/// Random UUID v4 tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSessionProvider;

impl SessionIdProvider for UuidSessionProvider {
    fn session_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Always hands out the same token. Useful for deterministic output.
#[derive(Debug, Clone)]
pub struct FixedSessionProvider(pub String);

impl SessionIdProvider for FixedSessionProvider {
    fn session_id(&self) -> String {
        self.0.clone()
    }
}

use serde::Serialize;

/// Static service metadata for GET /
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub platform: &'static str,
    pub status: &'static str,
    pub target: &'static str,
    pub version: &'static str,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            platform: "Korea Rice Exchange (KRX)",
            status: "Alive",
            target: "Private Sector 30%",
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

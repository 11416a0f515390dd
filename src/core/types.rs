use serde::Serialize;

/// Format used for registration and detection timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefix of every server-generated patient identifier
pub const PATIENT_ID_PREFIX: &str = "PAT-";

/// Number of random hex characters following [`PATIENT_ID_PREFIX`]
pub const PATIENT_ID_RANDOM_LEN: usize = 8;

/// Server-generated identifier of a registered patient
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PatientId(pub String);

impl PatientId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Generate a fresh identifier such as `PAT-1A2B3C4D`.
    ///
    /// Eight hex characters of a v4 UUID: collisions are improbable, not impossible.
    #[must_use]
    pub fn generate() -> Self {
        let token = uuid::Uuid::new_v4().simple().to_string();
        Self(format!(
            "{PATIENT_ID_PREFIX}{}",
            token[..PATIENT_ID_RANDOM_LEN].to_uppercase()
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PatientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a disease in the catalog, also the stem of its sequence file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DiseaseId(pub String);

impl DiseaseId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DiseaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Clinical severity of a disease, always within 1..=10
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Returns `None` when `value` falls outside 1..=10.
    #[must_use]
    pub fn new(value: i64) -> Option<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

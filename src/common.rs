/// Maximum length of the encoded header, unless overridden in
/// `VerificationOptions`.
pub const MAX_HEADER_LENGTH: usize = 8192;

/// Default number of idle digest objects kept per pool.
pub const DEFAULT_MAX_IDLE_DIGESTS: usize = 64;

/// Additional checks to perform during verification
#[derive(Clone, Debug, Default)]
pub struct VerificationOptions {
    /// Reject tokens longer than this many bytes
    pub max_token_length: Option<usize>,

    /// Maximum length of the encoded header. Defaults to `MAX_HEADER_LENGTH`.
    pub max_header_length: Option<usize>,
}

impl VerificationOptions {
    pub fn with_max_token_length(mut self, max_token_length: usize) -> Self {
        self.max_token_length = Some(max_token_length);
        self
    }

    pub fn with_max_header_length(mut self, max_header_length: usize) -> Self {
        self.max_header_length = Some(max_header_length);
        self
    }
}

/// Tuning knobs of `DefaultProvider`
#[derive(Clone, Debug)]
pub struct ProviderConfig {
    /// Digest objects beyond this number are dropped instead of being pooled.
    /// Concurrent calls never wait for an object; extra ones are created on
    /// demand.
    pub max_idle_digests: usize,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            max_idle_digests: DEFAULT_MAX_IDLE_DIGESTS,
        }
    }
}

impl ProviderConfig {
    pub fn with_max_idle_digests(mut self, max_idle_digests: usize) -> Self {
        self.max_idle_digests = max_idle_digests;
        self
    }
}

//! Configuration types for resume parsing.
//!
//! All pipeline behaviour is controlled through [`ParserConfig`], built via
//! its [`ParserConfigBuilder`]. The two external collaborators (PDF text
//! extraction and the structured-completion client) are pluggable so hosts
//! and tests can swap them without touching the orchestrator.

use crate::error::ResumeParserError;
use crate::links::LinkPolicy;
use crate::pipeline::structured::StructuredExtractor;
use crate::pipeline::text::{PageScope, TextExtractor};
use crate::progress::ObserverHandle;
use crate::schema::ResumeSchema;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for one or more parse requests.
///
/// Built via [`ParserConfig::builder()`] or using [`ParserConfig::default()`].
///
/// # Example
/// ```rust
/// use resume_parser::{PageScope, ParserConfig};
///
/// let config = ParserConfig::builder()
///     .model("gpt-4o-mini")
///     .pages(PageScope::All)
///     .api_timeout_secs(Some(60))
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    /// Model identifier sent to the structured-completion endpoint.
    pub model: String,

    /// Explicit API key. Takes precedence over `api_key_env`.
    pub api_key: Option<String>,

    /// Environment variable holding the API key, read at request time.
    /// Default: `OPENAI_API_KEY`.
    pub api_key_env: String,

    /// Base URL of an OpenAI-compatible API. Default: `https://api.openai.com/v1`.
    pub base_url: String,

    /// Sampling temperature. Default: 0.0.
    ///
    /// Extraction should copy, not invent; zero keeps the answer as close to
    /// deterministic as the service allows.
    pub temperature: f32,

    /// Maximum completion tokens. Default: 4096.
    ///
    /// A truncated answer cannot satisfy the schema and is reported as a
    /// schema violation, so this must cover long work histories.
    pub max_tokens: usize,

    /// Request timeout in seconds. Default: `Some(120)`; `None` waits forever.
    pub api_timeout_secs: Option<u64>,

    /// Which extracted pages reach the model. Default: [`PageScope::First`].
    pub pages: PageScope,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// How link matches are post-processed. Default: [`LinkPolicy::Verbatim`].
    pub link_policy: LinkPolicy,

    /// Target schema. Default: [`ResumeSchema::builtin`].
    pub schema: ResumeSchema,

    /// Custom system prompt. If None, uses built-in default.
    pub system_prompt: Option<String>,

    /// Directory for staged uploads. Default: the system temp dir.
    pub temp_dir: Option<PathBuf>,

    /// libpdfium file or directory. Falls back to `PDFIUM_LIB_PATH`, `./`, then the system library.
    pub pdfium_library_path: Option<PathBuf>,

    /// Pre-constructed text extractor. Default: pdfium.
    pub text_extractor: Option<Arc<dyn TextExtractor>>,

    /// Pre-constructed structured extractor. Default: [`crate::pipeline::structured::OpenAiExtractor`].
    pub structured_extractor: Option<Arc<dyn StructuredExtractor>>,

    /// Stage observer.
    pub observer: Option<ObserverHandle>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.0,
            max_tokens: 4096,
            api_timeout_secs: Some(120),
            pages: PageScope::default(),
            password: None,
            link_policy: LinkPolicy::default(),
            schema: ResumeSchema::default(),
            system_prompt: None,
            temp_dir: None,
            pdfium_library_path: None,
            text_extractor: None,
            structured_extractor: None,
            observer: None,
        }
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_key_env", &self.api_key_env)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("pages", &self.pages)
            .field("link_policy", &self.link_policy)
            .field("schema", &self.schema.name)
            .field("temp_dir", &self.temp_dir)
            .field("text_extractor", &self.text_extractor.as_ref().map(|_| "<dyn TextExtractor>"))
            .field(
                "structured_extractor",
                &self.structured_extractor.as_ref().map(|_| "<dyn StructuredExtractor>"),
            )
            .finish()
    }
}

impl ParserConfig {
    /// Create a new builder for `ParserConfig`.
    pub fn builder() -> ParserConfigBuilder {
        ParserConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ParserConfig`].
#[derive(Debug)]
pub struct ParserConfigBuilder {
    config: ParserConfig,
}

impl ParserConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn api_key_env(mut self, var: impl Into<String>) -> Self {
        self.config.api_key_env = var.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: Option<u64>) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn pages(mut self, scope: PageScope) -> Self {
        self.config.pages = scope;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn link_policy(mut self, policy: LinkPolicy) -> Self {
        self.config.link_policy = policy;
        self
    }

    pub fn schema(mut self, schema: ResumeSchema) -> Self {
        self.config.schema = schema;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.temp_dir = Some(dir.into());
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn text_extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.config.text_extractor = Some(extractor);
        self
    }

    pub fn structured_extractor(mut self, extractor: Arc<dyn StructuredExtractor>) -> Self {
        self.config.structured_extractor = Some(extractor);
        self
    }

    pub fn observer(mut self, observer: ObserverHandle) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ParserConfig, ResumeParserError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(ResumeParserError::InvalidConfig("model must not be empty".into()));
        }
        if c.api_key_env.trim().is_empty() {
            return Err(ResumeParserError::InvalidConfig(
                "api_key_env must name an environment variable".into(),
            ));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(ResumeParserError::InvalidConfig(format!(
                "base_url must be an HTTP/HTTPS URL, got '{}'",
                c.base_url
            )));
        }
        if c.max_tokens == 0 {
            return Err(ResumeParserError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        if c.api_timeout_secs == Some(0) {
            return Err(ResumeParserError::InvalidConfig(
                "api_timeout_secs must be ≥ 1 (use None to disable the timeout)".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ParserConfig::default();
        assert_eq!(c.model, "gpt-4o-mini");
        assert_eq!(c.api_key_env, "OPENAI_API_KEY");
        assert_eq!(c.pages, PageScope::First);
        assert_eq!(c.link_policy, LinkPolicy::Verbatim);
        assert_eq!(c.api_timeout_secs, Some(120));
        assert_eq!(c.schema, ResumeSchema::builtin());
    }

    #[test]
    fn builder_clamps_temperature() {
        let c = ParserConfig::builder().temperature(5.0).build().unwrap();
        assert_eq!(c.temperature, 2.0);
    }

    #[test]
    fn builder_rejects_bad_values() {
        assert!(ParserConfig::builder().model(" ").build().is_err());
        assert!(ParserConfig::builder().base_url("api.openai.com").build().is_err());
        assert!(ParserConfig::builder().max_tokens(0).build().is_err());
        assert!(ParserConfig::builder().api_timeout_secs(Some(0)).build().is_err());
        assert!(ParserConfig::builder().api_key_env("").build().is_err());
        assert!(ParserConfig::builder().api_timeout_secs(None).build().is_ok());
    }

    #[test]
    fn debug_hides_api_key() {
        let c = ParserConfig::builder().api_key("sk-very-secret").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("sk-very-secret"));
        assert!(dbg.contains("***"));
    }
}

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "markupFilePatterns[0]")
    pub field_path: String,
    /// What is wrong with the field.
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Numbered list of validation errors, one per line.
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalesSettings {
    /// Locale identifiers handled by `refresh` and `import`.
    pub locales: Vec<String>,

    /// Markup attributes marking an element as localizable.
    /// Each entry also matches its `data-` prefixed variant.
    pub localize_attributes: Vec<String>,
    /// Call identifiers marking a script call as localizable, e.g. `localize("Hi")`.
    pub localize_method_identifiers: Vec<String>,

    /// Globs of files scanned as markup.
    pub markup_file_patterns: Vec<String>,
    /// Globs of files scanned as scripts.
    pub script_file_patterns: Vec<String>,
    /// Globs never scanned.
    pub exclude_patterns: Vec<String>,

    /// Regex applied to a store path to find its locale.
    /// Capture group 1 is used when present, the whole match otherwise.
    pub locale_pattern: String,
    pub locale_placeholder: String,
    /// Namespace the compiled artifact registers its functions under.
    pub locale_name: String,
    /// Template file rendered instead of the built-in artifact layout.
    pub locale_template: Option<String>,

    /// Drop keys not found by a full refresh.
    pub purge_locales: bool,
    /// Whether keys only known from `defaultMessagesSource` are purged as well.
    pub purge_default_messages: bool,
    pub default_messages_source: Vec<String>,

    pub message_format: MessageFormatConfig,

    /// URLs allowed through the sanitizer.
    pub url_pattern: String,
    pub sanitizer: SanitizerConfig,

    /// Indentation width of written stores, 0 writes compact JSON.
    pub json_space: usize,
    pub csv: CsvConfig,

    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MessageFormatConfig {
    /// Grammar definition per language. The placeholder is replaced with the
    /// first two characters of the locale.
    pub locale_file: String,
    /// Runtime helper shared by every locale.
    pub shared_file: Option<String>,
}

impl Default for MessageFormatConfig {
    fn default() -> Self {
        Self { locale_file: "messageformat/locale/{locale}.js".to_string(), shared_file: None }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizerConfig {
    pub collapse_whitespace: bool,
    /// Fail on markup the HTML grammar does not accept instead of cleaning it.
    pub reject_invalid_markup: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self { collapse_whitespace: true, reject_invalid_markup: false }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvConfig {
    pub encapsulator: String,
    pub delimiter: String,
    pub line_end: String,
    pub key_label: String,
    /// Additional exported columns. Supported: `files`, `value`.
    pub extra_fields: Vec<String>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            encapsulator: "\"".to_string(),
            delimiter: ",".to_string(),
            line_end: "\r\n".to_string(),
            key_label: "ID".to_string(),
            extra_fields: vec!["files".to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexingConfig {
    /// Max number of source files scanned concurrently.
    /// Default: 80% of CPU cores (minimum 1).
    pub num_threads: Option<usize>,
}

impl IndexingConfig {
    #[must_use]
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(|| (num_cpus::get() * 4 / 5).max(1)).max(1)
    }
}

impl LocalesSettings {
    /// # Errors
    /// - Required field is empty
    /// - Invalid glob pattern or regex
    /// - CSV options that are not a single ASCII character
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.locales.is_empty() {
            errors.push(ValidationError::new(
                "locales",
                "No locales defined. Example: [\"en_US\", \"de_DE\"]",
            ));
        }
        for (index, locale) in self.locales.iter().enumerate() {
            if locale.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("locales[{index}]"),
                    "The locale identifier cannot be empty",
                ));
            }
        }

        if self.localize_attributes.is_empty() {
            errors.push(ValidationError::new(
                "localizeAttributes",
                "At least one attribute is required. Example: [\"localize\"]",
            ));
        }
        if self.localize_method_identifiers.is_empty() {
            errors.push(ValidationError::new(
                "localizeMethodIdentifiers",
                "At least one identifier is required. Example: [\"localize\"]",
            ));
        }

        validate_globs(&mut errors, "markupFilePatterns", &self.markup_file_patterns);
        validate_globs(&mut errors, "scriptFilePatterns", &self.script_file_patterns);
        validate_globs(&mut errors, "excludePatterns", &self.exclude_patterns);
        validate_globs(&mut errors, "defaultMessagesSource", &self.default_messages_source);

        validate_regex(&mut errors, "localePattern", &self.locale_pattern);
        validate_regex(&mut errors, "urlPattern", &self.url_pattern);

        if self.locale_placeholder.is_empty() {
            errors.push(ValidationError::new(
                "localePlaceholder",
                "The placeholder cannot be empty. Example: \"{locale}\"",
            ));
        } else if !self.message_format.locale_file.contains(&self.locale_placeholder) {
            errors.push(ValidationError::new(
                "messageFormat.localeFile",
                format!(
                    "The path must contain the locale placeholder '{}'",
                    self.locale_placeholder
                ),
            ));
        }

        if self.locale_name.is_empty() {
            errors.push(ValidationError::new("localeName", "The namespace name cannot be empty"));
        }

        validate_single_byte(&mut errors, "csv.encapsulator", &self.csv.encapsulator);
        validate_single_byte(&mut errors, "csv.delimiter", &self.csv.delimiter);
        if self.csv.line_end != "\r\n" && !is_single_ascii(&self.csv.line_end) {
            errors.push(ValidationError::new(
                "csv.lineEnd",
                "The line end must be \"\\r\\n\" or a single ASCII character",
            ));
        }
        if self.csv.key_label.is_empty() {
            errors.push(ValidationError::new("csv.keyLabel", "The key label cannot be empty"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Reports every entry of `patterns` that is not a valid glob.
fn validate_globs(errors: &mut Vec<ValidationError>, field: &str, patterns: &[String]) {
    for (index, pattern) in patterns.iter().enumerate() {
        if let Err(e) = globset::Glob::new(pattern) {
            errors.push(ValidationError::new(
                format!("{field}[{index}]"),
                format!("Invalid glob pattern '{pattern}': {e}"),
            ));
        }
    }
}

/// Reports `pattern` when it does not compile.
fn validate_regex(errors: &mut Vec<ValidationError>, field: &str, pattern: &str) {
    if let Err(e) = regex::Regex::new(pattern) {
        errors.push(ValidationError::new(
            field,
            format!("Invalid regular expression '{pattern}': {e}"),
        ));
    }
}

/// True for exactly one ASCII character.
fn is_single_ascii(value: &str) -> bool {
    value.len() == 1 && value.is_ascii()
}

/// Reports `value` unless it is a single ASCII character.
fn validate_single_byte(errors: &mut Vec<ValidationError>, field: &str, value: &str) {
    if !is_single_ascii(value) {
        errors.push(ValidationError::new(field, "Must be a single ASCII character"));
    }
}

impl Default for LocalesSettings {
    fn default() -> Self {
        Self {
            locales: vec!["en_US".to_string()],
            localize_attributes: vec!["localize".to_string()],
            localize_method_identifiers: vec!["localize".to_string()],
            markup_file_patterns: vec!["**/*.html".to_string()],
            script_file_patterns: vec!["**/*.{js,jsx,mjs,cjs,ts,tsx}".to_string()],
            exclude_patterns: vec!["node_modules/**".to_string()],
            locale_pattern: r"(\w+)/[^/]+$".to_string(),
            locale_placeholder: "{locale}".to_string(),
            locale_name: "i18n".to_string(),
            locale_template: None,
            purge_locales: true,
            purge_default_messages: false,
            default_messages_source: Vec::new(),
            message_format: MessageFormatConfig::default(),
            url_pattern: r"^((ftp|https?)://|mailto:|#|\{\w+\})".to_string(),
            sanitizer: SanitizerConfig::default(),
            json_space: 2,
            csv: CsvConfig::default(),
            indexing: IndexingConfig::default(),
        }
    }
}

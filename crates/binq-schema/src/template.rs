//! Placeholder substitution for URL formats and rename rules.
//!
//! Templates use the `{{.Name}}` action syntax. Only the placeholders listed
//! in [`PLACEHOLDERS`] are understood; anything else is a render error.

use std::collections::BTreeMap;

use thiserror::Error;

/// Resolved placeholder values, keyed by placeholder name.
pub type Substitutions = BTreeMap<String, String>;

/// Placeholder for the revision version.
pub const VERSION: &str = "Version";
/// Placeholder for the target operating system.
pub const OS: &str = "OS";
/// Placeholder for the target architecture.
pub const ARCH: &str = "Arch";
/// Placeholder for the per-OS file extension.
pub const EXT: &str = "Ext";
/// Placeholder for the executable suffix (`.exe` on windows).
pub const BIN_EXT: &str = "BinExt";

/// Every placeholder a template may reference.
pub const PLACEHOLDERS: [&str; 5] = [VERSION, OS, ARCH, EXT, BIN_EXT];

/// Fallback key of an extension map.
pub const DEFAULT_EXTENSION_KEY: &str = "default";

/// Platform context for one resolution call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatParam {
    /// Version being resolved. Overridden by the revision's own version.
    pub version: String,
    /// Target OS in Go naming (`linux`, `darwin`, `windows`, ...).
    pub os: String,
    /// Target architecture in Go naming (`amd64`, `arm64`, `386`, ...).
    pub arch: String,
}

impl FormatParam {
    /// Creates a parameter set for the given platform.
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            version: String::new(),
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The running platform.
    pub fn current() -> Self {
        Self::new(current_os(), current_arch())
    }

    /// Returns a copy with `version` set.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Go-style name of the running operating system.
pub fn current_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Go-style name of the running architecture.
pub fn current_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "powerpc64" => "ppc64",
        other => other,
    }
}

/// Reason a template failed to render.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateErrorKind {
    /// `{{` without a matching `}}`.
    #[error("unclosed action")]
    Unclosed,
    /// An action that is not of the form `.Name`.
    #[error("malformed action {0:?}")]
    Malformed(String),
    /// `.Name` where `Name` is not a known placeholder.
    #[error("unknown placeholder {0:?}")]
    Unknown(String),
}

/// A template failed to render. Carries the template and its parameters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot render {template:?}: {kind} (params: {params:?})")]
pub struct TemplateError {
    /// The template text.
    pub template: String,
    /// The substitution map it was rendered against.
    pub params: Substitutions,
    /// What went wrong.
    pub kind: TemplateErrorKind,
}

/// Builds the substitution map for one platform.
///
/// `BinExt` is only set for windows, `Ext` only when `extension` is
/// non-empty. Replacements then rewrite every value that equals one of their
/// keys.
pub fn substitutions(
    param: &FormatParam,
    extension: &BTreeMap<String, String>,
    replacements: &BTreeMap<String, String>,
) -> Substitutions {
    let mut vars = Substitutions::new();
    vars.insert(VERSION.to_string(), param.version.clone());
    vars.insert(OS.to_string(), param.os.clone());
    vars.insert(ARCH.to_string(), param.arch.clone());
    if param.os == "windows" {
        vars.insert(BIN_EXT.to_string(), ".exe".to_string());
    }
    if let Some(ext) = extension
        .get(&param.os)
        .or_else(|| extension.get(DEFAULT_EXTENSION_KEY))
    {
        vars.insert(EXT.to_string(), ext.clone());
    }

    for value in vars.values_mut() {
        if let Some(replacement) = replacements.get(value.as_str()) {
            *value = replacement.clone();
        }
    }
    vars
}

/// Renders `template` against `vars`.
///
/// A known placeholder without a value renders as the empty string.
pub fn render(template: &str, vars: &Substitutions) -> Result<String, TemplateError> {
    let fail = |kind: TemplateErrorKind| TemplateError {
        template: template.to_string(),
        params: vars.clone(),
        kind,
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find("}}")
            .ok_or_else(|| fail(TemplateErrorKind::Unclosed))?;
        let action = after[..end].trim();
        let name = action
            .strip_prefix('.')
            .filter(|name| {
                !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            })
            .ok_or_else(|| fail(TemplateErrorKind::Malformed(action.to_string())))?;
        if !PLACEHOLDERS.contains(&name) {
            return Err(fail(TemplateErrorKind::Unknown(name.to_string())));
        }
        if let Some(value) = vars.get(name) {
            out.push_str(value);
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

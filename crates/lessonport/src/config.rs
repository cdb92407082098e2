use std::path::PathBuf;

use url::Url;

use crate::error::LessonportError;

pub const DEFAULT_LOCALE: &str = "en-US";
pub const DEFAULT_ENVIRONMENT: &str = "master";
pub const DEFAULT_API_URL: &str = "https://api.contentful.com";
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.contentful.com";

/// Placeholder written to every lesson's description field.
pub const DEFAULT_LESSON_DESCRIPTION: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Donec auctor, nisl eget ultricies ultrices, nunc nisl aliquam nunc, vitae aliquam nisl nunc nec nisl.";

const MASK: &str = "**********************";

/// Masks all but the first and last five characters of a secret.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 10 {
        return MASK.to_string();
    }
    let head: String = chars[..5].iter().collect();
    let tail: String = chars[chars.len() - 5..].iter().collect();
    format!("{head}{MASK}{tail}")
}

/// Identifies the space and environment written to, plus the token used to write.
#[derive(Clone)]
pub struct CmsCredentials {
    access_token: String,
    space_id: String,
    environment: String,
}

impl CmsCredentials {
    /// Only presence is checked; the remote service validates the values themselves.
    pub fn new(
        access_token: Option<String>,
        space_id: Option<String>,
        environment: Option<String>,
    ) -> Result<Self, LessonportError> {
        Ok(Self {
            access_token: required(access_token, "access token")?,
            space_id: required(space_id, "space id")?,
            environment: required(environment, "environment")?,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn masked_token(&self) -> String {
        mask_token(&self.access_token)
    }

    pub fn space_id(&self) -> &str {
        &self.space_id
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }
}

impl std::fmt::Debug for CmsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CmsCredentials")
            .field("access_token", &self.masked_token())
            .field("space_id", &self.space_id)
            .field("environment", &self.environment)
            .finish()
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, LessonportError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(LessonportError::Config(format!("missing {field}"))),
    }
}

/// Base URLs of the management and upload APIs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContentfulEndpoints {
    pub api: Url,
    pub upload: Url,
}

impl ContentfulEndpoints {
    pub fn parse(api: &str, upload: &str) -> Result<Self, LessonportError> {
        Ok(Self {
            api: Url::parse(api).map_err(|err| {
                LessonportError::from(err).context(format!("invalid api url '{api}'"))
            })?,
            upload: Url::parse(upload).map_err(|err| {
                LessonportError::from(err).context(format!("invalid upload url '{upload}'"))
            })?,
        })
    }
}

impl Default for ContentfulEndpoints {
    fn default() -> Self {
        Self {
            api: Url::parse(DEFAULT_API_URL).expect("valid default api url"),
            upload: Url::parse(DEFAULT_UPLOAD_URL).expect("valid default upload url"),
        }
    }
}

/// Options that shape a scan or migration run.
#[derive(Clone, Debug)]
pub struct MigrationOptions {
    /// Directory holding the numbered lesson directories.
    pub root: PathBuf,
    pub locale: String,
    /// Treat a missing README as fatal instead of falling back.
    pub strict: bool,
    pub lesson_description: String,
}

impl MigrationOptions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locale: DEFAULT_LOCALE.to_string(),
            strict: false,
            lesson_description: DEFAULT_LESSON_DESCRIPTION.to_string(),
        }
    }
}

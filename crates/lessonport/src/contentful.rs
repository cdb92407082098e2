use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::{CmsCredentials, ContentfulEndpoints};
use crate::error::LessonportError;
use crate::store::{ContentStore, Fields, Resource};

const MANAGEMENT_CONTENT_TYPE: &str = "application/vnd.contentful.management.v1+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_PROCESSING_CHECKS: u32 = 10;
const DEFAULT_PROCESSING_INTERVAL: Duration = Duration::from_millis(500);

enum Body<'a> {
    Empty,
    Json(Value),
    Bytes(&'a [u8]),
}

/// [`ContentStore`] backed by the Contentful Management REST API.
pub struct ContentfulStore {
    agent: ureq::Agent,
    credentials: CmsCredentials,
    endpoints: ContentfulEndpoints,
    processing_checks: u32,
    processing_interval: Duration,
}

impl ContentfulStore {
    pub fn new(credentials: CmsCredentials, endpoints: ContentfulEndpoints) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(REQUEST_TIMEOUT).build();
        Self {
            agent,
            credentials,
            endpoints,
            processing_checks: DEFAULT_PROCESSING_CHECKS,
            processing_interval: DEFAULT_PROCESSING_INTERVAL,
        }
    }

    /// How many times, and how often, a processed asset is re-read before giving up.
    pub fn with_processing_checks(mut self, checks: u32, interval: Duration) -> Self {
        self.processing_checks = checks.max(1);
        self.processing_interval = interval;
        self
    }

    /// Resolves the configured space and environment so bad credentials fail before any
    /// content is written.
    pub fn connect(&self) -> Result<(), LessonportError> {
        tracing::info!(token = %self.credentials.masked_token(), "using access token");

        let space_url = format!("{}/spaces/{}", self.api_base(), self.credentials.space_id());
        let _: Value = self
            .execute(self.authorized(self.agent.get(&space_url)), Body::Empty)
            .and_then(read_json)
            .map_err(|err| {
                err.context(format!("resolving space {}", self.credentials.space_id()))
            })?;
        tracing::info!(space = self.credentials.space_id(), "resolved space");

        let env_url = format!(
            "{space_url}/environments/{}",
            self.credentials.environment()
        );
        let _: Value = self
            .execute(self.authorized(self.agent.get(&env_url)), Body::Empty)
            .and_then(read_json)
            .map_err(|err| {
                err.context(format!(
                    "resolving environment {}",
                    self.credentials.environment()
                ))
            })?;
        tracing::info!(
            environment = self.credentials.environment(),
            "resolved environment"
        );
        Ok(())
    }

    fn api_base(&self) -> String {
        self.endpoints.api.as_str().trim_end_matches('/').to_string()
    }

    fn upload_base(&self) -> String {
        self.endpoints.upload.as_str().trim_end_matches('/').to_string()
    }

    fn environment_url(&self, base: &str, path: &str) -> String {
        format!(
            "{base}/spaces/{}/environments/{}/{path}",
            self.credentials.space_id(),
            self.credentials.environment()
        )
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        request
            .set(
                "Authorization",
                &format!("Bearer {}", self.credentials.access_token()),
            )
            .set("Content-Type", MANAGEMENT_CONTENT_TYPE)
    }

    fn versioned(request: ureq::Request, resource: &Resource) -> ureq::Request {
        request.set(
            "X-Contentful-Version",
            &resource.version().unwrap_or(1).to_string(),
        )
    }

    fn execute(
        &self,
        request: ureq::Request,
        body: Body<'_>,
    ) -> Result<ureq::Response, LessonportError> {
        tracing::debug!(method = request.method(), url = request.url(), "cms request");
        let result = match body {
            Body::Empty => request.call(),
            Body::Json(value) => request.send_json(value),
            Body::Bytes(bytes) => request
                .set("Content-Type", "application/octet-stream")
                .send_bytes(bytes),
        };

        match result {
            Ok(response) => Ok(response),
            Err(ureq::Error::Status(status, response)) => {
                let url = response.get_url().to_string();
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                Err(LessonportError::RemoteStatus {
                    status,
                    message: format!("{url}: {message}"),
                })
            }
            Err(err) => Err(LessonportError::Remote(err.to_string())),
        }
    }

    fn publish(&self, collection: &str, resource: &Resource) -> Result<Resource, LessonportError> {
        let url = self.environment_url(
            &self.api_base(),
            &format!("{collection}/{}/published", resource.id()),
        );
        let request = Self::versioned(self.authorized(self.agent.put(&url)), resource);
        self.execute(request, Body::Empty).and_then(read_json)
    }

    fn fetch(&self, collection: &str, id: &str) -> Result<Resource, LessonportError> {
        let url = self.environment_url(&self.api_base(), &format!("{collection}/{id}"));
        self.execute(self.authorized(self.agent.get(&url)), Body::Empty)
            .and_then(read_json)
    }
}

fn read_json<T: DeserializeOwned>(response: ureq::Response) -> Result<T, LessonportError> {
    response
        .into_json::<T>()
        .map_err(|err| LessonportError::Serialization(format!("invalid cms response: {err}")))
}

fn file_url<'a>(asset: &'a Resource, locale: &str) -> Option<&'a str> {
    asset
        .fields
        .get("file")
        .and_then(|file| file.get(locale))
        .and_then(|file| file.get("url"))
        .and_then(Value::as_str)
}

impl ContentStore for ContentfulStore {
    fn create_entry(
        &self,
        content_type: &str,
        fields: &Fields,
    ) -> Result<Resource, LessonportError> {
        let url = self.environment_url(&self.api_base(), "entries");
        let request = self
            .authorized(self.agent.post(&url))
            .set("X-Contentful-Content-Type", content_type);
        self.execute(request, Body::Json(json!({ "fields": fields.to_value() })))
            .and_then(read_json)
            .map_err(|err| err.context(format!("creating {content_type} entry")))
    }

    fn publish_entry(&self, entry: &Resource) -> Result<Resource, LessonportError> {
        self.publish("entries", entry)
            .map_err(|err| err.context(format!("publishing entry {}", entry.id())))
    }

    fn get_entry(&self, id: &str) -> Result<Resource, LessonportError> {
        self.fetch("entries", id)
    }

    fn create_upload(&self, bytes: &[u8]) -> Result<Resource, LessonportError> {
        let url = self.environment_url(&self.upload_base(), "uploads");
        let request = self
            .agent
            .post(&url)
            .set(
                "Authorization",
                &format!("Bearer {}", self.credentials.access_token()),
            );
        self.execute(request, Body::Bytes(bytes))
            .and_then(read_json)
            .map_err(|err| err.context("creating upload"))
    }

    fn create_asset(&self, fields: &Fields) -> Result<Resource, LessonportError> {
        let url = self.environment_url(&self.api_base(), "assets");
        self.execute(
            self.authorized(self.agent.post(&url)),
            Body::Json(json!({ "fields": fields.to_value() })),
        )
        .and_then(read_json)
        .map_err(|err| err.context("creating asset"))
    }

    fn process_asset(&self, asset: &Resource, locale: &str) -> Result<(), LessonportError> {
        let url = self.environment_url(
            &self.api_base(),
            &format!("assets/{}/files/{locale}/process", asset.id()),
        );
        let request = Self::versioned(self.authorized(self.agent.put(&url)), asset);
        self.execute(request, Body::Empty)
            .map_err(|err| err.context(format!("processing asset {}", asset.id())))?;

        for check in 1..=self.processing_checks {
            thread::sleep(self.processing_interval);
            let latest = self.fetch("assets", asset.id())?;
            if file_url(&latest, locale).is_some() {
                tracing::debug!(id = asset.id(), check, "asset processed");
                return Ok(());
            }
        }

        Err(LessonportError::Remote(format!(
            "asset {} was not processed after {} checks",
            asset.id(),
            self.processing_checks
        )))
    }

    fn get_asset(&self, id: &str) -> Result<Resource, LessonportError> {
        self.fetch("assets", id)
    }

    fn publish_asset(&self, asset: &Resource) -> Result<Resource, LessonportError> {
        self.publish("assets", asset)
            .map_err(|err| err.context(format!("publishing asset {}", asset.id())))
    }
}

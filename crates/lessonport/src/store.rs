use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::LessonportError;

/// Kind of resource a link points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkType {
    Entry,
    Asset,
    Upload,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    #[serde(rename = "type")]
    pub kind: String,
    pub link_type: LinkType,
    pub id: String,
}

/// Reference to another resource, serialised as `{"sys": {"type": "Link", ...}}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

impl Link {
    pub fn new(link_type: LinkType, id: impl Into<String>) -> Self {
        Self {
            sys: LinkSys {
                kind: "Link".to_string(),
                link_type,
                id: id.into(),
            },
        }
    }

    pub fn entry(id: impl Into<String>) -> Self {
        Self::new(LinkType::Entry, id)
    }

}

/// System metadata returned for every stored resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sys {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// An entry, asset, or upload as seen by the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub sys: Sys,
    #[serde(default)]
    pub fields: Value,
}

impl Resource {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn version(&self) -> Option<u64> {
        self.sys.version
    }

    pub fn link(&self, link_type: LinkType) -> Link {
        Link::new(link_type, self.sys.id.clone())
    }
}

/// Field map where every value is wrapped in a single locale:
/// `{"title": {"en-US": "..."}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct Fields {
    locale: String,
    values: Map<String, Value>,
}

impl Fields {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            values: Map::new(),
        }
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    /// Serialises `value` (for example a list of links) into the field.
    pub fn with_serialized<T: Serialize>(
        self,
        name: &str,
        value: &T,
    ) -> Result<Self, LessonportError> {
        let value = serde_json::to_value(value)?;
        Ok(self.with(name, value))
    }

    pub fn to_value(&self) -> Value {
        let localized: Map<String, Value> = self
            .values
            .iter()
            .map(|(name, value)| {
                let mut wrapped = Map::new();
                wrapped.insert(self.locale.clone(), value.clone());
                (name.clone(), Value::Object(wrapped))
            })
            .collect();
        Value::Object(localized)
    }
}

/// The remote content-management service lessons are written to.
///
/// Calls are made one at a time; a created entry must be published before anything
/// links to it.
pub trait ContentStore: Send + Sync {
    fn create_entry(
        &self,
        content_type: &str,
        fields: &Fields,
    ) -> Result<Resource, LessonportError>;
    fn publish_entry(&self, entry: &Resource) -> Result<Resource, LessonportError>;
    fn get_entry(&self, id: &str) -> Result<Resource, LessonportError>;
    fn create_upload(&self, bytes: &[u8]) -> Result<Resource, LessonportError>;
    fn create_asset(&self, fields: &Fields) -> Result<Resource, LessonportError>;
    /// Asks the service to process the asset's file for `locale` and waits until done.
    fn process_asset(&self, asset: &Resource, locale: &str) -> Result<(), LessonportError>;
    fn get_asset(&self, id: &str) -> Result<Resource, LessonportError>;
    fn publish_asset(&self, asset: &Resource) -> Result<Resource, LessonportError>;
}

impl<S> ContentStore for Arc<S>
where
    S: ContentStore,
{
    fn create_entry(
        &self,
        content_type: &str,
        fields: &Fields,
    ) -> Result<Resource, LessonportError> {
        (**self).create_entry(content_type, fields)
    }

    fn publish_entry(&self, entry: &Resource) -> Result<Resource, LessonportError> {
        (**self).publish_entry(entry)
    }

    fn get_entry(&self, id: &str) -> Result<Resource, LessonportError> {
        (**self).get_entry(id)
    }

    fn create_upload(&self, bytes: &[u8]) -> Result<Resource, LessonportError> {
        (**self).create_upload(bytes)
    }

    fn create_asset(&self, fields: &Fields) -> Result<Resource, LessonportError> {
        (**self).create_asset(fields)
    }

    fn process_asset(&self, asset: &Resource, locale: &str) -> Result<(), LessonportError> {
        (**self).process_asset(asset, locale)
    }

    fn get_asset(&self, id: &str) -> Result<Resource, LessonportError> {
        (**self).get_asset(id)
    }

    fn publish_asset(&self, asset: &Resource) -> Result<Resource, LessonportError> {
        (**self).publish_asset(asset)
    }
}

/// One call made against a [`RecordingStore`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreCall {
    CreateEntry {
        content_type: String,
        id: String,
        fields: Value,
    },
    PublishEntry {
        id: String,
        version: u64,
    },
    GetEntry {
        id: String,
    },
    CreateUpload {
        id: String,
        bytes: usize,
    },
    CreateAsset {
        id: String,
        fields: Value,
    },
    ProcessAsset {
        id: String,
        locale: String,
    },
    GetAsset {
        id: String,
    },
    PublishAsset {
        id: String,
        version: u64,
    },
}

#[derive(Default)]
struct Recorded {
    next_id: u64,
    calls: Vec<StoreCall>,
    resources: BTreeMap<String, Resource>,
}

impl Recorded {
    fn allocate(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory store that hands out sequential ids and keeps every call in order.
#[derive(Default)]
pub struct RecordingStore {
    state: Mutex<Recorded>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().calls.clone()
    }

    fn insert(&self, prefix: &str, kind: &str, fields: Value) -> Resource {
        let mut state = self.state.lock();
        let id = state.allocate(prefix);
        let resource = Resource {
            sys: Sys {
                id: id.clone(),
                kind: kind.to_string(),
                version: Some(1),
            },
            fields,
        };
        state.resources.insert(id, resource.clone());
        resource
    }

    fn lookup(&self, id: &str) -> Result<Resource, LessonportError> {
        self.state
            .lock()
            .resources
            .get(id)
            .cloned()
            .ok_or_else(|| LessonportError::RemoteStatus {
                status: 404,
                message: format!("resource '{id}' not found"),
            })
    }

    fn publish(&self, resource: &Resource) -> Result<Resource, LessonportError> {
        let mut state = self.state.lock();
        let stored = state
            .resources
            .get_mut(resource.id())
            .ok_or_else(|| LessonportError::RemoteStatus {
                status: 404,
                message: format!("resource '{}' not found", resource.id()),
            })?;
        let version = stored.sys.version.unwrap_or(1) + 1;
        stored.sys.version = Some(version);
        Ok(stored.clone())
    }

    fn record(&self, call: StoreCall) {
        self.state.lock().calls.push(call);
    }
}

impl ContentStore for RecordingStore {
    fn create_entry(
        &self,
        content_type: &str,
        fields: &Fields,
    ) -> Result<Resource, LessonportError> {
        let fields = fields.to_value();
        let resource = self.insert("entry", "Entry", fields.clone());
        self.record(StoreCall::CreateEntry {
            content_type: content_type.to_string(),
            id: resource.id().to_string(),
            fields,
        });
        Ok(resource)
    }

    fn publish_entry(&self, entry: &Resource) -> Result<Resource, LessonportError> {
        let published = self.publish(entry)?;
        self.record(StoreCall::PublishEntry {
            id: published.id().to_string(),
            version: published.version().unwrap_or_default(),
        });
        Ok(published)
    }

    fn get_entry(&self, id: &str) -> Result<Resource, LessonportError> {
        let entry = self.lookup(id)?;
        self.record(StoreCall::GetEntry { id: id.to_string() });
        Ok(entry)
    }

    fn create_upload(&self, bytes: &[u8]) -> Result<Resource, LessonportError> {
        let resource = self.insert("upload", "Upload", Value::Null);
        self.record(StoreCall::CreateUpload {
            id: resource.id().to_string(),
            bytes: bytes.len(),
        });
        Ok(resource)
    }

    fn create_asset(&self, fields: &Fields) -> Result<Resource, LessonportError> {
        let fields = fields.to_value();
        let resource = self.insert("asset", "Asset", fields.clone());
        self.record(StoreCall::CreateAsset {
            id: resource.id().to_string(),
            fields,
        });
        Ok(resource)
    }

    fn process_asset(&self, asset: &Resource, locale: &str) -> Result<(), LessonportError> {
        {
            let mut state = self.state.lock();
            let stored = state.resources.get_mut(asset.id()).ok_or_else(|| {
                LessonportError::RemoteStatus {
                    status: 404,
                    message: format!("asset '{}' not found", asset.id()),
                }
            })?;
            if let Some(file) = stored
                .fields
                .get_mut("file")
                .and_then(|file| file.get_mut(locale))
                .and_then(Value::as_object_mut)
            {
                let name = file
                    .get("fileName")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                file.insert(
                    "url".to_string(),
                    Value::String(format!("//recorded/{}/{name}", asset.id())),
                );
            }
        }
        self.record(StoreCall::ProcessAsset {
            id: asset.id().to_string(),
            locale: locale.to_string(),
        });
        Ok(())
    }

    fn get_asset(&self, id: &str) -> Result<Resource, LessonportError> {
        let asset = self.lookup(id)?;
        self.record(StoreCall::GetAsset { id: id.to_string() });
        Ok(asset)
    }

    fn publish_asset(&self, asset: &Resource) -> Result<Resource, LessonportError> {
        let published = self.publish(asset)?;
        self.record(StoreCall::PublishAsset {
            id: published.id().to_string(),
            version: published.version().unwrap_or_default(),
        });
        Ok(published)
    }
}

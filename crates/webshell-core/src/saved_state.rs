//! Saved instance state.
//!
//! The host persists a flat string bundle across process recreation. Values
//! are stored verbatim; absent values are simply not present in the map.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const KEY_PENDING_ACTION: &str = "pendingAction";
pub const KEY_PENDING_SMS_NUMBER: &str = "pendingSmsNumber";
pub const KEY_PENDING_SMS_MESSAGE: &str = "pendingSmsMessage";
pub const KEY_PENDING_TICKET: &str = "pendingTicket";
pub const KEY_PENDING_PERMISSION: &str = "pendingPermission";
pub const KEY_CURRENT_PHOTO_PATH: &str = "currentPhotoPath";
pub const KEY_WEBVIEW_URL: &str = "webViewUrl";

/// String key/value bundle saved by the host between activity instances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedState {
    values: BTreeMap<String, String>,
}

impl SavedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn put(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Store `value` only when present.
    pub fn put_opt(&mut self, key: &str, value: Option<&str>) {
        if let Some(v) = value {
            self.put(key, v);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for SavedState {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

//! Records returned by the Pushbullet API.
//!
//! # Design
//! Fields the service may omit are `Option` and skipped when absent, so a
//! record decoded from a response re-encodes to the same JSON object.
//! List endpoints wrap their arrays in an envelope (`{"devices": [...]}`);
//! the client unwraps these before returning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Onboarding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friends: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarding: Option<Onboarding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub social: Option<bool>,
}

/// The account the token belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub iden: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub iden: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub iden: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_normalized: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
}

/// Selects which optional `Push` fields are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushType {
    Note,
    Link,
    Address,
    List,
    File,
}

impl PushType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PushType::Note => "note",
            PushType::Link => "link",
            PushType::Address => "address",
            PushType::List => "list",
            PushType::File => "file",
        }
    }

    pub fn from_wire(kind: &str) -> Option<Self> {
        match kind {
            "note" => Some(PushType::Note),
            "link" => Some(PushType::Link),
            "address" => Some(PushType::Address),
            "list" => Some(PushType::List),
            "file" => Some(PushType::File),
            _ => None,
        }
    }
}

/// A checklist entry. Requests send bare strings; responses carry objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    Text(String),
    Entry {
        text: String,
        #[serde(default)]
        checked: bool,
    },
}

/// `kind` keeps the raw wire string so pushes of types this crate does not
/// know (e.g. "mirror") still decode; see `Push::push_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Push {
    pub iden: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dismissed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ListItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_iden: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_email_normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_iden: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_email_normalized: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_device_iden: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_device_iden: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
}

impl Push {
    /// The push type, if it is one of the known kinds.
    pub fn push_type(&self) -> Option<PushType> {
        self.kind.as_deref().and_then(PushType::from_wire)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub iden: String,
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub iden: String,
    #[serde(default)]
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
    pub channel: Channel,
}

/// Signing fields the storage backend checks on upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadData {
    pub awsaccesskeyid: String,
    pub acl: String,
    pub key: String,
    pub signature: String,
    pub policy: String,
    #[serde(rename = "content-type")]
    pub content_type: String,
}

/// Short-lived authorization for a single file upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTicket {
    pub file_name: String,
    pub file_type: String,
    pub file_url: String,
    pub upload_url: String,
    pub data: UploadData,
}

impl UploadTicket {
    /// Multipart text fields in the order the storage backend expects.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let d = &self.data;
        [
            ("awsaccesskeyid", &d.awsaccesskeyid),
            ("acl", &d.acl),
            ("key", &d.key),
            ("signature", &d.signature),
            ("policy", &d.policy),
            ("content-type", &d.content_type),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Devices {
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contacts {
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pushes {
    pub pushes: Vec<Push>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriptions {
    pub subscriptions: Vec<Subscription>,
}

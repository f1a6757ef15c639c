//! Resource operations: user, devices, contacts, pushes, subscriptions and
//! channels.

use crate::client::PushClient;
use crate::config::query_url;
use crate::error::{ApiError, Result};
use crate::http::Transport;
use crate::params::Params;
use crate::types::{
    Channel, Contact, Contacts, Device, Devices, Push, Pushes, Subscription, Subscriptions, User,
};

impl<T: Transport> PushClient<T> {
    // -----------------------------------------------------------------------
    // User
    // -----------------------------------------------------------------------

    /// The user the token belongs to.
    pub fn me(&self) -> Result<User> {
        self.get(&self.endpoints().me)
    }

    /// Update the current user, e.g. `{"preferences": {"social": false}}`.
    pub fn update_me(&self, params: Params) -> Result<User> {
        self.post(&self.endpoints().me, &params)
    }

    // -----------------------------------------------------------------------
    // Devices
    // -----------------------------------------------------------------------

    pub fn list_devices(&self) -> Result<Vec<Device>> {
        let envelope: Devices = self.get(&self.endpoints().devices)?;
        Ok(envelope.devices)
    }

    /// Requires `nickname` and `type`.
    pub fn create_device(&self, params: Params) -> Result<Device> {
        params.require_all("create_device", &["nickname", "type"])?;
        self.post(&self.endpoints().devices, &params)
    }

    /// Requires `iden`.
    pub fn update_device(&self, params: Params) -> Result<Device> {
        self.update(&self.endpoints().devices, "update_device", params)
    }

    /// Requires `iden`.
    pub fn delete_device(&self, params: &Params) -> Result<()> {
        self.delete(&self.endpoints().devices, "delete_device", params)
    }

    // -----------------------------------------------------------------------
    // Contacts
    // -----------------------------------------------------------------------

    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        let envelope: Contacts = self.get(&self.endpoints().contacts)?;
        Ok(envelope.contacts)
    }

    /// Requires `name` and `email`.
    pub fn create_contact(&self, params: Params) -> Result<Contact> {
        params.require_all("create_contact", &["name", "email"])?;
        self.post(&self.endpoints().contacts, &params)
    }

    pub fn update_contact(&self, params: Params) -> Result<Contact> {
        self.update(&self.endpoints().contacts, "update_contact", params)
    }

    pub fn delete_contact(&self, params: &Params) -> Result<()> {
        self.delete(&self.endpoints().contacts, "delete_contact", params)
    }

    // -----------------------------------------------------------------------
    // Pushes
    // -----------------------------------------------------------------------

    pub fn list_pushes(&self) -> Result<Vec<Push>> {
        let envelope: Pushes = self.get(&self.endpoints().pushes)?;
        Ok(envelope.pushes)
    }

    /// Pushes modified after `timestamp` (seconds since the epoch).
    /// Non-finite timestamps are rejected locally.
    pub fn list_pushes_modified_after(&self, timestamp: f64) -> Result<Vec<Push>> {
        if !timestamp.is_finite() {
            return Err(ApiError::InvalidParameter {
                operation: "list_pushes_modified_after",
                field: "modified_after",
                reason: format!("{timestamp} is not a finite number"),
            });
        }
        let url = query_url(
            &self.endpoints().pushes,
            "modified_after",
            &timestamp.to_string(),
        );
        let envelope: Pushes = self.get(&url)?;
        Ok(envelope.pushes)
    }

    /// Requires `type` plus the fields that type needs:
    /// `link` for link, `address` for address, `items` for list, and
    /// `file_name` + `file_type` for file.
    ///
    /// File pushes upload the local file first (`file_path`, defaulting to
    /// `file_name`) and send the resulting `file_url` with the push.
    pub fn create_push(&self, params: impl Into<Params>) -> Result<Push> {
        const OP: &str = "create_push";
        let mut params = params.into();

        let kind = params.require(OP, "type")?.as_str().map(str::to_owned);
        match kind.as_deref() {
            Some("link") => params.require_all(OP, &["link"])?,
            Some("address") => params.require_all(OP, &["address"])?,
            Some("list") => params.require_all(OP, &["items"])?,
            Some("file") => params.require_all(OP, &["file_name", "file_type"])?,
            _ => {}
        }

        if kind.as_deref() == Some("file") {
            let file_name = params.text(OP, "file_name")?;
            let file_type = params.text(OP, "file_type")?;
            let path = match params.remove("file_path") {
                Some(serde_json::Value::String(path)) => path,
                _ => file_name.clone(),
            };
            let file_url = self.upload_file(&path, &file_name, &file_type)?;
            params.insert("file_url", file_url);
        }

        self.post(&self.endpoints().pushes, &params)
    }

    pub fn update_push(&self, params: Params) -> Result<Push> {
        self.update(&self.endpoints().pushes, "update_push", params)
    }

    pub fn delete_push(&self, params: &Params) -> Result<()> {
        self.delete(&self.endpoints().pushes, "delete_push", params)
    }

    // -----------------------------------------------------------------------
    // Subscriptions and channels
    // -----------------------------------------------------------------------

    pub fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
        let envelope: Subscriptions = self.get(&self.endpoints().subscriptions)?;
        Ok(envelope.subscriptions)
    }

    /// Requires `channel_tag`.
    pub fn subscribe(&self, params: Params) -> Result<Subscription> {
        params.require_all("subscribe", &["channel_tag"])?;
        self.post(&self.endpoints().subscriptions, &params)
    }

    /// Requires `iden` (the subscription, not the channel).
    pub fn unsubscribe(&self, params: &Params) -> Result<()> {
        self.delete(&self.endpoints().subscriptions, "unsubscribe", params)
    }

    /// Requires `tag`.
    pub fn channel_info(&self, params: &Params) -> Result<Channel> {
        let tag = params.text("channel_info", "tag")?;
        self.get(&query_url(&self.endpoints().channels, "tag", &tag))
    }
}

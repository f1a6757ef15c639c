//! File upload: request a signed ticket, then POST the file to storage.
//!
//! The two phases are separate calls with the ticket passed explicitly.
//! If the storage upload fails the ticket is simply dropped; the service
//! expires it on its own.

use std::path::Path;

use crate::client::PushClient;
use crate::error::{ApiError, Result};
use crate::http::{FilePart, HttpMethod, HttpRequest, MultipartForm, Transport};
use crate::params::Params;
use crate::types::UploadTicket;

/// Storage signals a successful upload with 204 and no body.
const UPLOAD_SUCCESS: u16 = 204;

impl<T: Transport> PushClient<T> {
    /// Phase one. Requires `file_name` and `file_type`.
    pub fn request_upload(&self, params: Params) -> Result<UploadTicket> {
        params.require_all("request_upload", &["file_name", "file_type"])?;
        self.post(&self.endpoints().upload_request, &params)
    }

    /// Phase two. Uploads the file at `path` to the ticket's storage URL and
    /// returns the ticket's final file URL.
    ///
    /// The storage backend authenticates through the signed form fields, so
    /// no Authorization header is sent.
    pub fn upload(&self, ticket: &UploadTicket, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ApiError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| ticket.file_name.clone());

        let form = MultipartForm {
            fields: ticket.form_fields(),
            file: FilePart {
                field: "file".to_string(),
                file_name,
                bytes,
            },
        };
        let request = HttpRequest::new(HttpMethod::Post, ticket.upload_url.as_str()).with_multipart(form);

        tracing::debug!(url = %ticket.upload_url, "uploading file to storage");
        let response = self.transport().execute(request)?;
        if response.status != UPLOAD_SUCCESS {
            tracing::warn!(url = %ticket.upload_url, status = response.status, "storage rejected upload");
            return Err(ApiError::service(response.status));
        }
        Ok(ticket.file_url.clone())
    }

    /// Both phases: request a ticket for `file_name`/`file_type`, upload the
    /// file at `path`, return the hosted file URL.
    pub fn upload_file(
        &self,
        path: impl AsRef<Path>,
        file_name: &str,
        file_type: &str,
    ) -> Result<String> {
        let ticket = self.request_upload(
            Params::new()
                .with("file_name", file_name)
                .with("file_type", file_type),
        )?;
        self.upload(&ticket, path)
    }
}

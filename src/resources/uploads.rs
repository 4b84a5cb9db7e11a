//! Image upload.

use crate::http::{ApiClient, ApiResult, Multipart, Transport};
use crate::resources::crud::decode;
use crate::resources::types::UploadedImage;

const PATH: &str = "upload";
const FIELD: &str = "image";

/// Guess an image content type from the file extension.
pub fn image_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

impl<T: Transport> ApiClient<T> {
    /// Upload an image and return its public URL.
    pub async fn upload_image(&self, file_name: &str, data: Vec<u8>) -> ApiResult<UploadedImage> {
        let form = Multipart::file(FIELD, file_name, image_content_type(file_name), data);
        decode(&self.upload(PATH, form).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use url::Url;

    use crate::auth::{CredentialStore, Credentials, Role, Session};
    use crate::config::ClientConfig;
    use crate::health::ConnectionStatus;
    use crate::http::testing::ScriptedTransport;
    use crate::http::{ApiResponse, RequestBody};

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("ward.PNG"), "image/png");
        assert_eq!(image_content_type("team.jpeg"), "image/jpeg");
        assert_eq!(image_content_type("README"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_image_sends_multipart() {
        let store = CredentialStore::in_memory();
        store
            .store(Credentials {
                token: "tok".into(),
                role: Role::Admin,
            })
            .unwrap();
        let client = ApiClient::new(
            ScriptedTransport::new(vec![Ok(ApiResponse::new(
                200,
                r#"{"url":"https://cdn.example/ward.png"}"#,
            ))]),
            Url::parse("http://localhost:5000/api").unwrap(),
            &ClientConfig::default(),
            Arc::new(Session::new(store)),
            Arc::new(ConnectionStatus::new()),
        );

        let uploaded = client.upload_image("ward.png", vec![1, 2, 3]).await.unwrap();
        assert_eq!(uploaded.url, "https://cdn.example/ward.png");

        let sent = client.transport().requests();
        assert_eq!(sent[0].url.path(), "/api/upload");
        match &sent[0].body {
            RequestBody::Multipart(form) => {
                assert_eq!(form.field, "image");
                assert_eq!(form.content_type, "image/png");
                assert_eq!(form.data, vec![1, 2, 3]);
            }
            other => panic!("expected multipart body, got {:?}", other),
        }
    }
}

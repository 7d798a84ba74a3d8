use std::env;

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory photos are written to; served under `/uploads`.
    pub upload_dir: String,
    /// Origin used to build publicly fetchable URLs, e.g. `https://roads.example.org`.
    /// Empty means root-relative URLs.
    pub public_base_url: String,
}

impl UploadConfig {
    pub fn from_env() -> Self {
        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string());
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();

        Self {
            upload_dir,
            public_base_url,
        }
    }

    pub fn public_url(&self, relative: &str) -> String {
        format!("{}/uploads/{}", self.public_base_url, relative)
    }
}

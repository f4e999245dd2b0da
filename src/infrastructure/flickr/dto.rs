use serde::Deserialize;

/// Top-level response of the `flickr.photos.*` listing methods.
#[derive(Debug, Deserialize)]
pub struct PhotosResponse {
    /// Result page, absent on failure.
    #[serde(default)]
    pub photos: Option<PhotosPage>,
    /// `"ok"` or `"fail"`.
    #[serde(default)]
    pub stat: Option<String>,
    /// Error message when `stat` is `"fail"`.
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of photo records.
#[derive(Debug, Deserialize)]
pub struct PhotosPage {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub perpage: u32,
    #[serde(default)]
    pub photo: Vec<PhotoRecord>,
}

/// A single photo record.
#[derive(Debug, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Small-size image URL, requested through `extras=url_s`.
    #[serde(default)]
    pub url_s: Option<String>,
}

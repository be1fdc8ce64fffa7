use std::path::Path;

use image::RgbaImage;

use super::Location;
use crate::error::SheetError;
use crate::sheet::SpriteSheet;

/// Read a local file.
pub async fn load_from_file(path: &Path) -> Result<Vec<u8>, SheetError> {
    tokio::fs::read(path)
        .await
        .map_err(|e| SheetError::from(e).with_arg("path", path.display()))
}

/// Download a resource over HTTP(S). Any non-success status is an error.
pub async fn download(url: &str) -> Result<Vec<u8>, SheetError> {
    let response = reqwest::get(url)
        .await
        .map_err(|e| SheetError::from(e).with_arg("url", url))?;

    if !response.status().is_success() {
        return Err(SheetError::new("http-status")
            .with_arg("url", url)
            .with_arg("status", response.status()));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| SheetError::from(e).with_arg("url", url))?;
    Ok(bytes.to_vec())
}

pub async fn fetch_bytes(location: &Location) -> Result<Vec<u8>, SheetError> {
    match location {
        Location::File(path) => load_from_file(path).await,
        Location::Url(url) => download(url).await,
        Location::Bytes(data) => Ok(data.to_vec()),
    }
}

/// Decode any format the `image` crate understands into RGBA8.
pub fn decode_image(data: &[u8]) -> Result<RgbaImage, SheetError> {
    let img = image::load_from_memory(data)?;
    Ok(img.to_rgba8())
}

pub async fn load_pixels(location: &Location) -> Result<RgbaImage, SheetError> {
    let data = fetch_bytes(location).await?;
    decode_image(&data)
}

pub async fn load_metadata(location: &Location) -> Result<SpriteSheet, SheetError> {
    let data = fetch_bytes(location).await?;
    SpriteSheet::from_json(&data)
}

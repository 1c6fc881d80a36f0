//! Photo service over HTTP.

use crate::config::ServiceEndpoints;
use crate::data::service::{grid_url, parse_location_photos, parse_photo_feature, photo_url};
use crate::data::{LocationPhotos, PhotoService, ServiceError};
use crate::geo::{GridKey, LocationKey};
use gloo_net::http::Request;

pub struct FetchPhotoService {
    endpoints: ServiceEndpoints,
}

impl FetchPhotoService {
    pub fn new(endpoints: ServiceEndpoints) -> Self {
        Self { endpoints }
    }
}

impl PhotoService for FetchPhotoService {
    async fn photos_at(&self, grid: &GridKey) -> Result<LocationPhotos, ServiceError> {
        let body = get_text(&grid_url(&self.endpoints, grid)).await?;
        parse_location_photos(&body)
    }

    async fn locate_photo(&self, photo_id: &str) -> Result<LocationKey, ServiceError> {
        let body = get_text(&photo_url(&self.endpoints, photo_id)).await?;
        parse_photo_feature(photo_id, &body)
    }
}

fn network_error(e: gloo_net::Error) -> ServiceError {
    ServiceError::Network(e.to_string())
}

async fn get_text(url: &str) -> Result<String, ServiceError> {
    log::debug!("GET {}", url);
    let response = Request::get(url).send().await.map_err(network_error)?;

    if !response.ok() {
        return Err(ServiceError::Status(response.status()));
    }

    response.text().await.map_err(network_error)
}

//! Multi-step post creation form.

use super::error::ClientResult;
use super::notice::Notice;
use super::remote::{PhotoAttachment, RemoteStore};
use crate::handlers::post::{CreatePostRequest, PostResponse};
use crate::models::Severity;
use crate::services::upload::MAX_IMAGE_SIZE;
use crate::utils::geo::{is_valid_latitude, is_valid_longitude};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DraftStep {
    Reporter,
    Details,
    Location,
    Media,
    Review,
}

impl DraftStep {
    pub const ALL: [DraftStep; 5] = [
        DraftStep::Reporter,
        DraftStep::Details,
        DraftStep::Location,
        DraftStep::Media,
        DraftStep::Review,
    ];

    pub fn next(self) -> Option<Self> {
        match self {
            DraftStep::Reporter => Some(DraftStep::Details),
            DraftStep::Details => Some(DraftStep::Location),
            DraftStep::Location => Some(DraftStep::Media),
            DraftStep::Media => Some(DraftStep::Review),
            DraftStep::Review => None,
        }
    }

    pub fn previous(self) -> Option<Self> {
        match self {
            DraftStep::Reporter => None,
            DraftStep::Details => Some(DraftStep::Reporter),
            DraftStep::Location => Some(DraftStep::Details),
            DraftStep::Media => Some(DraftStep::Location),
            DraftStep::Review => Some(DraftStep::Media),
        }
    }

    /// 1-based position for "Step n of 5".
    pub fn number(self) -> usize {
        self as usize + 1
    }
}

/// Best-effort place name for a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locality {
    pub city: Option<String>,
    pub region: Option<String>,
}

/// Reverse geocoding. Optional; its failure never blocks location capture.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn reverse(&self, latitude: f64, longitude: f64) -> ClientResult<Locality>;
}

#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    step: Option<DraftStep>,
    pub name: String,
    pub email: String,
    pub title: String,
    pub description: String,
    pub severity: Option<Severity>,
    pub state: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo: Option<PhotoAttachment>,
    pub video_url: String,
}

fn require(value: &str, message: &str) -> Result<(), Notice> {
    if value.trim().is_empty() {
        Err(Notice::validation(message))
    } else {
        Ok(())
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl PostDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> DraftStep {
        self.step.unwrap_or(DraftStep::Reporter)
    }

    /// Check the fields owned by one step.
    pub fn validate_step(&self, step: DraftStep) -> Result<(), Notice> {
        match step {
            DraftStep::Reporter => require(&self.name, "Please enter your name"),
            DraftStep::Details => {
                require(&self.title, "Please enter a title")?;
                if self.severity.is_none() {
                    return Err(Notice::validation("Please choose a severity"));
                }
                Ok(())
            }
            DraftStep::Location => {
                require(&self.state, "Please enter the state")?;
                require(&self.city, "Please enter the city")?;
                match (self.latitude, self.longitude) {
                    (Some(lat), Some(lng)) if is_valid_latitude(lat) && is_valid_longitude(lng) => {
                        Ok(())
                    }
                    (Some(_), Some(_)) => Err(Notice::validation(
                        "Coordinates are out of range",
                    )),
                    _ => Err(Notice::validation("Please provide the location coordinates")),
                }
            }
            DraftStep::Media => {
                let photo = self
                    .photo
                    .as_ref()
                    .ok_or_else(|| Notice::validation("Please attach a photo"))?;
                if !photo.content_type.starts_with("image/") {
                    return Err(Notice::validation("Please upload an image file"));
                }
                if photo.bytes.len() > MAX_IMAGE_SIZE {
                    return Err(Notice::validation("Image must be 4MB or smaller"));
                }
                Ok(())
            }
            DraftStep::Review => Ok(()),
        }
    }

    pub fn validate_all(&self) -> Result<(), Notice> {
        DraftStep::ALL
            .iter()
            .try_for_each(|step| self.validate_step(*step))
    }

    /// Advance when the current step is complete.
    pub fn next(&mut self) -> Result<DraftStep, Notice> {
        let current = self.step();
        self.validate_step(current)?;
        let next = current.next().unwrap_or(current);
        self.step = Some(next);
        Ok(next)
    }

    pub fn back(&mut self) -> DraftStep {
        let previous = self.step().previous().unwrap_or(DraftStep::Reporter);
        self.step = Some(previous);
        previous
    }

    /// Record coordinates and fill blank city/state from the geocoder.
    pub async fn capture_location(
        &mut self,
        latitude: f64,
        longitude: f64,
        geocoder: Option<&dyn Geocoder>,
    ) {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);

        let Some(geocoder) = geocoder else {
            return;
        };
        match geocoder.reverse(latitude, longitude).await {
            Ok(locality) => self.apply_locality(locality),
            Err(e) => tracing::debug!("Reverse geocoding failed, skipping autofill: {}", e),
        }
    }

    /// Autofill only what the reporter has not typed.
    pub fn apply_locality(&mut self, locality: Locality) {
        if self.city.trim().is_empty() {
            if let Some(city) = locality.city.and_then(|c| optional(&c)) {
                self.city = city;
            }
        }
        if self.state.trim().is_empty() {
            if let Some(region) = locality.region.and_then(|r| optional(&r)) {
                self.state = region;
            }
        }
    }

    fn to_request(&self, photo_url: String) -> CreatePostRequest {
        CreatePostRequest {
            name: self.name.trim().to_string(),
            email: optional(&self.email),
            title: self.title.trim().to_string(),
            description: optional(&self.description),
            severity: self.severity.map(|s| s.to_string()),
            state: self.state.trim().to_string(),
            city: self.city.trim().to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            photo_url,
            video_url: optional(&self.video_url),
        }
    }
}

/// Upload the photo, then create the post.
///
/// The two writes are independent: if creation fails after the upload
/// succeeded, the stored image is left behind.
pub async fn submit_draft(
    remote: &dyn RemoteStore,
    draft: &PostDraft,
) -> Result<PostResponse, Notice> {
    draft.validate_all()?;
    let Some(photo) = draft.photo.as_ref() else {
        return Err(Notice::validation("Please attach a photo"));
    };

    let photo_url = remote.upload_image(photo).await.map_err(|e| {
        tracing::warn!("Photo upload failed: {}", e);
        Notice::from_error("upload photo", &e)
    })?;

    remote
        .create_post(&draft.to_request(photo_url))
        .await
        .map_err(|e| {
            tracing::warn!("Post creation failed: {}", e);
            Notice::from_error("submit report", &e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::error::ClientError;
    use crate::client::fake::FakeRemote;
    use crate::client::notice::NoticeKind;
    use crate::client::session::SessionIdentityProvider;
    use crate::services::feed_filter::FeedPredicates;
    use std::sync::atomic::Ordering;

    fn photo() -> PhotoAttachment {
        PhotoAttachment {
            filename: "pothole.jpg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
        }
    }

    fn complete_draft() -> PostDraft {
        PostDraft {
            name: "Jane".to_string(),
            title: "Pothole on Main St".to_string(),
            severity: Some(Severity::High),
            state: "CA".to_string(),
            city: "Springfield".to_string(),
            latitude: Some(37.12),
            longitude: Some(-122.45),
            photo: Some(photo()),
            ..Default::default()
        }
    }

    struct FixedGeocoder(ClientResult<Locality>);

    #[async_trait]
    impl Geocoder for FixedGeocoder {
        async fn reverse(&self, _latitude: f64, _longitude: f64) -> ClientResult<Locality> {
            match &self.0 {
                Ok(l) => Ok(l.clone()),
                Err(_) => Err(ClientError::NotFound),
            }
        }
    }

    #[test]
    fn cannot_leave_a_step_with_missing_fields() {
        let mut draft = PostDraft::new();
        assert_eq!(draft.step(), DraftStep::Reporter);
        assert_eq!(draft.next().unwrap_err().kind, NoticeKind::Validation);

        draft.name = "Jane".to_string();
        assert_eq!(draft.next().unwrap(), DraftStep::Details);

        draft.title = "Pothole".to_string();
        let err = draft.next().unwrap_err();
        assert_eq!(err.description, "Please choose a severity");
        assert_eq!(draft.step(), DraftStep::Details);
    }

    #[test]
    fn walks_all_steps_and_back() {
        let mut draft = complete_draft();
        for expected in &DraftStep::ALL[1..] {
            assert_eq!(draft.next().unwrap(), *expected);
        }
        assert_eq!(draft.step().number(), 5);
        assert_eq!(draft.next().unwrap(), DraftStep::Review);
        assert_eq!(draft.back(), DraftStep::Media);
    }

    #[test]
    fn oversized_or_non_image_photo_rejected() {
        let mut draft = complete_draft();
        draft.photo = Some(PhotoAttachment {
            bytes: vec![0; MAX_IMAGE_SIZE + 1],
            ..photo()
        });
        assert!(draft.validate_step(DraftStep::Media).is_err());

        draft.photo = Some(PhotoAttachment {
            content_type: "video/mp4".to_string(),
            ..photo()
        });
        assert!(draft.validate_step(DraftStep::Media).is_err());
    }

    #[tokio::test]
    async fn geocoder_fills_only_blank_fields() {
        let mut draft = PostDraft {
            city: "Shelbyville".to_string(),
            ..Default::default()
        };
        let geocoder = FixedGeocoder(Ok(Locality {
            city: Some("Springfield".to_string()),
            region: Some("CA".to_string()),
        }));
        draft.capture_location(37.12, -122.45, Some(&geocoder)).await;
        assert_eq!(draft.city, "Shelbyville");
        assert_eq!(draft.state, "CA");
        assert_eq!(draft.latitude, Some(37.12));
    }

    #[tokio::test]
    async fn geocoder_failure_still_captures_coordinates() {
        let mut draft = PostDraft::new();
        let geocoder = FixedGeocoder(Err(ClientError::NotFound));
        draft.capture_location(1.0, 2.0, Some(&geocoder)).await;
        assert_eq!((draft.latitude, draft.longitude), (Some(1.0), Some(2.0)));
        assert!(draft.city.is_empty());
    }

    #[tokio::test]
    async fn missing_severity_makes_no_request_then_submit_succeeds() {
        let fake = FakeRemote::default();
        let mut draft = complete_draft();
        draft.severity = None;

        let err = submit_draft(&fake, &draft).await.unwrap_err();
        assert_eq!(err.kind, NoticeKind::Validation);
        assert_eq!(fake.call_count(), 0);

        draft.severity = Some(Severity::High);
        let post = submit_draft(&fake, &draft).await.unwrap();
        assert_eq!(post.title, "Pothole on Main St");
        assert_eq!(post.photo_url, "/uploads/post-photos/0-pothole.jpg");

        let session = SessionIdentityProvider::in_memory().get_or_create_session_id();
        let feed = fake
            .list_posts(&FeedPredicates::default(), 1, 20, &session)
            .await
            .unwrap();
        assert_eq!(feed.items[0].id, post.id);
    }

    #[tokio::test]
    async fn failed_creation_leaves_upload_behind() {
        let fake = FakeRemote::default();
        fake.fail_post_creation.store(true, Ordering::SeqCst);

        assert_eq!(
            submit_draft(&fake, &complete_draft()).await.unwrap_err().kind,
            NoticeKind::Failure
        );
        assert_eq!(fake.uploads.lock().unwrap().len(), 1);
    }
}

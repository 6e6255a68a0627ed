//! Form checks that run before any write is attempted.

use regex::Regex;
use std::sync::LazyLock;

use crate::clock;
use crate::error::{StoreError, StoreResult};
use crate::schema::{
    ActivityCategory, Issue, IssueCategory, IssueStatus, Volunteer, VolunteerStatus, WardUpdate,
};
use crate::wards;

pub const MAX_IMAGES: usize = 4;
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;
const PHONE_DIGITS: usize = 10;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

fn invalid(message: impl Into<String>) -> StoreError {
    StoreError::Validation(message.into())
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct VolunteerForm {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub ward_number: Option<u32>,
    pub interests: Vec<ActivityCategory>,
    pub message: String,
}

impl VolunteerForm {
    /// Produces a pending volunteer record ready for the dispatcher.
    pub fn validate(&self) -> StoreResult<Volunteer> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(invalid("Please enter your full name"));
        }
        let phone = self.phone.trim();
        if phone.len() != PHONE_DIGITS || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid("Please enter a valid 10-digit phone number"));
        }
        let email = optional(&self.email);
        if let Some(email) = &email {
            if !EMAIL_RE.is_match(email) {
                return Err(invalid("Please enter a valid email address"));
            }
        }

        let mut interests = self.interests.clone();
        interests.sort();
        interests.dedup();

        Ok(Volunteer {
            id: String::new(),
            name: name.to_string(),
            phone: phone.to_string(),
            email,
            ward_number: self.ward_number,
            interests,
            message: optional(&self.message),
            status: VolunteerStatus::Pending,
            created_at: clock::now_rfc3339(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct IssueForm {
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub ward_number: u32,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_urls: Vec<String>,
    pub user_name: String,
    pub user_email: String,
}

impl IssueForm {
    /// Field, ward and image-count checks. Run this before uploading
    /// `image_count` files so a rejected report leaves nothing in storage.
    pub fn check(&self, image_count: usize) -> StoreResult<()> {
        if self.title.trim().is_empty()
            || self.description.trim().is_empty()
            || self.location.trim().is_empty()
        {
            return Err(invalid("Please fill in title, description and location"));
        }
        if !wards::is_known_ward(self.ward_number) {
            return Err(invalid(format!("Unknown ward {}", self.ward_number)));
        }
        check_image_count(image_count)
    }

    pub fn validate(&self) -> StoreResult<Issue> {
        self.check(self.image_urls.len())?;
        let title = self.title.trim();
        let description = self.description.trim();
        let location = self.location.trim();

        let now = clock::now_rfc3339();
        Ok(Issue {
            id: String::new(),
            title: title.to_string(),
            description: description.to_string(),
            category: self.category,
            status: IssueStatus::Pending,
            ward_number: self.ward_number,
            location: location.to_string(),
            latitude: self.latitude,
            longitude: self.longitude,
            image_urls: self.image_urls.clone(),
            user_name: self.user_name.trim().to_string(),
            user_email: self.user_email.trim().to_string(),
            upvotes: 0,
            created_at: now.clone(),
            updated_at: now,
            resolved_at: None,
            corporator_response: None,
            resolved_image_urls: None,
        })
    }
}

#[derive(Debug, Clone)]
pub struct WardUpdateForm {
    pub ward_number: u32,
    pub corporator_name: String,
    pub title: String,
    pub content: String,
    pub image_urls: Vec<String>,
}

impl WardUpdateForm {
    pub fn validate(&self) -> StoreResult<WardUpdate> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() || content.is_empty() {
            return Err(invalid("Please fill in title and content"));
        }
        check_image_count(self.image_urls.len())?;

        Ok(WardUpdate {
            id: String::new(),
            ward_number: self.ward_number,
            corporator_name: self.corporator_name.clone(),
            title: title.to_string(),
            content: content.to_string(),
            image_urls: self.image_urls.clone(),
            created_at: clock::now_rfc3339(),
        })
    }
}

pub fn check_image_count(count: usize) -> StoreResult<()> {
    if count > MAX_IMAGES {
        return Err(invalid(format!("At most {MAX_IMAGES} images are allowed")));
    }
    Ok(())
}

pub fn check_image_size(file_name: &str, size_bytes: u64) -> StoreResult<()> {
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(invalid(format!("{file_name} is too large (max 5MB)")));
    }
    Ok(())
}

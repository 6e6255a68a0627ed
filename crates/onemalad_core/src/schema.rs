use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::Date;

/// Remote collection names. One collection per entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Issues,
    Activities,
    Events,
    Volunteers,
    Banners,
    WardUpdates,
    Users,
    Supports,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Issues => "issues",
            Collection::Activities => "activities",
            Collection::Events => "events",
            Collection::Volunteers => "volunteers",
            Collection::Banners => "banners",
            Collection::WardUpdates => "wardUpdates",
            Collection::Users => "users",
            Collection::Supports => "supports",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Pending,
    InProgress,
    Resolved,
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            IssueStatus::Pending => "pending",
            IssueStatus::InProgress => "in_progress",
            IssueStatus::Resolved => "resolved",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueCategory {
    Drainage,
    Roads,
    Garbage,
    Water,
    Electricity,
    Sanitation,
    Encroachment,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub status: IssueStatus,
    pub ward_number: u32,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub user_name: String,
    pub user_email: String,
    #[serde(default)]
    pub upvotes: u32,
    pub created_at: String, // RFC 3339
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporator_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_image_urls: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityCategory {
    CleanlinessDrive,
    HealthCamp,
    FoodDistribution,
    Education,
    TreePlanting,
    BloodDonation,
    Sports,
    Cultural,
    Infrastructure,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: ActivityCategory,
    pub date: String, // YYYY-MM-DD
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_number: Option<u32>,
    #[serde(default)]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub volunteers_count: u32,
    #[serde(default)]
    pub beneficiaries_count: u32,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Social,
    Cultural,
    Sports,
    Education,
    Health,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CommunityEvent {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: EventCategory,
    pub date: String, // YYYY-MM-DD
    pub time: String, // free text, e.g. "10:00 AM"
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_number: Option<u32>,
    pub organizer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub attendees: u32,
}

impl CommunityEvent {
    /// Computed at read time. An unparseable date is never upcoming.
    pub fn is_upcoming(&self, today: Date) -> bool {
        crate::clock::parse_date(&self.date)
            .map(|date| date >= today)
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VolunteerStatus {
    Pending,
    Active,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_number: Option<u32>,
    #[serde(default)]
    pub interests: Vec<ActivityCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: VolunteerStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BannerPlacement {
    Hero,
    Sidebar,
    Inline,
    Footer,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub cta_text: String,
    pub cta_link: String,
    pub placement: BannerPlacement,
    #[serde(default)]
    pub bg_gradient: String,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WardUpdate {
    #[serde(default)]
    pub id: String,
    pub ward_number: u32,
    pub corporator_name: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_urls: Vec<String>,
    pub created_at: String,
}

/// Homepage counters. Never synced from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImpactStat {
    pub label: String,
    pub value: u64,
    #[serde(default)]
    pub suffix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Citizen,
    Volunteer,
    Corporator,
    Admin,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            UserRole::Citizen => "citizen",
            UserRole::Volunteer => "volunteer",
            UserRole::Corporator => "corporator",
            UserRole::Admin => "admin",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub display_name: String,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ward_number: Option<u32>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Support {
    pub ward_number: u32,
    pub user_id: String,
    pub created_at: String,
}

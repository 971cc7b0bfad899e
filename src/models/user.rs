//! User profile model and profile mutation bodies.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Account attributes of the signed-in user.
///
/// Unknown fields are rejected so backend schema drift shows up as a decode
/// error instead of silently dropped data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "binding-generation", ts(type = "number | null"))]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    /// Height in centimeters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    /// Full-body photo used for virtual try-on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_on_photo_url: Option<String>,
}

impl UserProfile {
    /// Merge the fields set in `patch`, leaving every other field untouched.
    pub fn apply(&mut self, patch: ProfilePatch) {
        let ProfilePatch {
            name,
            email,
            sex,
            height,
            chest,
            waist,
            hips,
            profile_photo_url,
            try_on_photo_url,
        } = patch;

        merge(&mut self.name, name);
        merge(&mut self.email, email);
        merge(&mut self.sex, sex);
        merge(&mut self.height, height);
        merge(&mut self.chest, chest);
        merge(&mut self.waist, waist);
        merge(&mut self.hips, hips);
        merge(&mut self.profile_photo_url, profile_photo_url);
        merge(&mut self.try_on_photo_url, try_on_photo_url);
    }
}

fn merge<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Partial profile update applied to the in-memory session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chest: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waist: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hips: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub try_on_photo_url: Option<String>,
}

// ─── Mutation Bodies ─────────────────────────────────────────

/// Body for `PATCH /users/me/username`.
#[derive(Debug, Clone, Serialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct UsernameUpdate {
    #[validate(length(min = 1))]
    pub name: String,
}

/// Body for `PATCH /users/me/measures`. All values in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct MeasuresUpdate {
    #[validate(range(exclusive_min = 0.0))]
    pub height: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub chest: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub waist: f64,
    #[validate(range(exclusive_min = 0.0))]
    pub hips: f64,
}

impl From<MeasuresUpdate> for ProfilePatch {
    fn from(m: MeasuresUpdate) -> Self {
        ProfilePatch {
            height: Some(m.height),
            chest: Some(m.chest),
            waist: Some(m.waist),
            hips: Some(m.hips),
            ..Default::default()
        }
    }
}

/// Body for `PATCH /users/me/profile-photo`.
#[derive(Debug, Clone, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "bindings/")
)]
pub struct ProfilePhotoUpdate {
    #[validate(length(min = 1))]
    pub profile_photo_url: String,
}

/// Response of `GET /users/me/profile-photo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePhotoResponse {
    #[serde(default)]
    pub profile_photo_url: Option<String>,
}

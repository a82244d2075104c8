use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enumerations (mapped to Postgres enum types) ---

/// Role
///
/// The RBAC field of a user. Admins run the dashboard; students file complaints;
/// drivers are assigned to buses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Student,
    Admin,
    Driver,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::Driver => "driver",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Gender {
    #[default]
    Male,
    Female,
    Other,
}

/// Background-check outcome recorded for drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type)]
#[sqlx(type_name = "police_clearance")]
#[ts(export)]
pub enum PoliceClearance {
    #[serde(rename = "verified")]
    #[sqlx(rename = "verified")]
    Verified,
    #[serde(rename = "not verified")]
    #[sqlx(rename = "not verified")]
    NotVerified,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "bus_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum BusStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[sqlx(type_name = "complaint_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ComplaintStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
}

// --- Core Records ---

/// User
///
/// A row of the `users` table. The password hash is loaded for login checks but is
/// never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    pub gender: Gender,
    pub roll_no: Option<String>,
    pub cnic: Option<String>,
    pub phone_number: Option<String>,
    pub guardian_contact: Option<String>,
    pub address: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub licence: Option<String>,
    pub police_clearance: Option<PoliceClearance>,
    // S3 keys from the presigned upload flow.
    pub cnic_image: Option<String>,
    pub id_image: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// UserOption
///
/// Slim `{ _id, name }` projection used by the dashboard's driver/assignee dropdowns.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UserOption {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// UserRef
///
/// A populated user reference (`{ _id, name, email }`) embedded in complaints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserRef {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Bus
///
/// A bus with its driver reference populated to the driver's name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Bus {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub bus_number: String,
    pub status: BusStatus,
    pub driver_id: Uuid,
    // Loaded via a JOIN on users.
    pub driver_name: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Complaint
///
/// The stored form of a complaint, references kept as raw ids.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Complaint {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub assigned_to: Option<Uuid>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ComplaintDetails
///
/// Read model of a complaint with the reporter and the assignee populated.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ComplaintDetails {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub user_id: Option<UserRef>,
    pub title: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub assigned_to: Option<UserRef>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ComplaintRow
///
/// Flat row produced by the complaint/users JOIN, folded into `ComplaintDetails`.
#[derive(Debug, Clone, FromRow)]
pub struct ComplaintRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub reporter_name: Option<String>,
    pub reporter_email: Option<String>,
    pub title: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub assigned_to: Option<Uuid>,
    pub assignee_name: Option<String>,
    pub assignee_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ComplaintRow> for ComplaintDetails {
    fn from(row: ComplaintRow) -> Self {
        let reporter = match (row.reporter_name, row.reporter_email) {
            (Some(name), Some(email)) => Some(UserRef {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };
        let assignee = match (row.assigned_to, row.assignee_name, row.assignee_email) {
            (Some(id), Some(name), Some(email)) => Some(UserRef { id, name, email }),
            _ => None,
        };
        ComplaintDetails {
            id: row.id,
            user_id: reporter,
            title: row.title,
            description: row.description,
            status: row.status,
            assigned_to: assignee,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// RegisterUserRequest
///
/// Input payload for POST /api/users/register. Which of the optional fields are
/// required depends on `role`; see `validation::required_fields_for`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RegisterUserRequest {
    pub name: String,
    #[validate(email(message = "Please provide a valid email"))]
    pub email: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub gender: Gender,
    pub roll_no: Option<String>,
    pub cnic: Option<String>,
    pub phone_number: Option<String>,
    pub guardian_contact: Option<String>,
    pub address: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub licence: Option<String>,
    pub police_clearance: Option<PoliceClearance>,
    pub cnic_image: Option<String>,
    pub id_image: Option<String>,
}

/// LoginRequest
///
/// Both fields are optional at the type level so that a missing one yields the
/// "Email and password are required" message instead of a parse error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// UpdateUserRequest
///
/// Partial update payload for PUT /api/users/{id}. Only provided fields change.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Please provide a valid email"))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_contact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub police_clearance: Option<PoliceClearance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cnic_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_image: Option<String>,
}

/// NewUser
///
/// A validated registration ready for insertion: normalized text and a bcrypt hash.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub gender: Gender,
    pub roll_no: Option<String>,
    pub cnic: Option<String>,
    pub phone_number: Option<String>,
    pub guardian_contact: Option<String>,
    pub address: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub licence: Option<String>,
    pub police_clearance: Option<PoliceClearance>,
    pub cnic_image: Option<String>,
    pub id_image: Option<String>,
}

/// UserChanges
///
/// The repository-side form of `UpdateUserRequest`, with the password already hashed.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub gender: Option<Gender>,
    pub roll_no: Option<String>,
    pub cnic: Option<String>,
    pub phone_number: Option<String>,
    pub guardian_contact: Option<String>,
    pub address: Option<String>,
    pub age: Option<i32>,
    pub city: Option<String>,
    pub licence: Option<String>,
    pub police_clearance: Option<PoliceClearance>,
    pub cnic_image: Option<String>,
    pub id_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateBusRequest {
    pub bus_number: String,
    pub status: BusStatus,
    pub driver_id: Uuid,
}

/// UpdateBusRequest
///
/// Partial update payload for PUT /api/buses/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateBusRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bus_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BusStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_id: Option<Uuid>,
}

/// CreateComplaintRequest
///
/// `userId` may be omitted; it then defaults to the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateComplaintRequest {
    pub user_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub assigned_to: Option<Uuid>,
}

/// NewComplaint
///
/// A complaint with its reporter resolved, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct UpdateComplaintRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplaintStatus>,
    /// Absent leaves the assignee alone; `null` unassigns.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    #[ts(optional)]
    #[schema(value_type = Option<Uuid>)]
    pub assigned_to: Option<Option<Uuid>>,
}

/// Wraps any value that is present in the payload, `null` included, in `Some`. Paired
/// with `#[serde(default)]` so an absent field stays `None`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// PresignedUrlRequest
///
/// Input payload for requesting a short-lived upload URL for a CNIC or ID card image.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlRequest {
    /// The original filename, used to derive the file extension.
    #[schema(example = "cnic_front.png")]
    pub filename: String,
    /// The MIME type; the upload is constrained to it.
    #[schema(example = "image/png")]
    pub file_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PresignedUrlResponse {
    /// The time-limited URL for the PUT request.
    pub upload_url: String,
    /// The object key to store on the user as `cnicImage` / `idImage`.
    pub resource_key: String,
}

// --- Response Envelopes ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// AuthenticatedUser
///
/// The user record plus a freshly issued session token, returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthenticatedUser {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AuthResponse {
    pub message: String,
    pub user: AuthenticatedUser,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub message: String,
    pub user: User,
}

/// UserList
///
/// Full records, or the `{ _id, name }` dropdown projection when `list=true`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(untagged)]
#[ts(export)]
pub enum UserList {
    Full(Vec<User>),
    Options(Vec<UserOption>),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UsersResponse {
    pub message: String,
    pub users: UserList,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BusResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub bus: Bus,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BusesResponse {
    pub buses: Vec<Bus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ComplaintResponse {
    pub message: String,
    pub complaint: Complaint,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ComplaintDetailsResponse {
    pub complaint: ComplaintDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ComplaintsResponse {
    pub complaints: Vec<ComplaintDetails>,
}

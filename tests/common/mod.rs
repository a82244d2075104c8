//! Shared fixtures for the integration tests: an in-memory `Repository` that mimics the
//! Postgres constraints, plus state and session helpers.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use transit_admin::{
    AppState,
    auth::{AuthUser, issue_token},
    config::AppConfig,
    error::{AppError, duplicate_message},
    models::{
        Bus, Complaint, ComplaintDetails, CreateBusRequest, Gender, NewComplaint, NewUser,
        PoliceClearance, Role, UpdateBusRequest, UpdateComplaintRequest, User, UserChanges,
        UserOption, UserRef,
    },
    repository::{Repository, RepositoryState},
    storage::{MockStorageService, StorageState},
};
use uuid::Uuid;

pub const TEST_PASSWORD: &str = "password123";

#[derive(Default)]
struct Store {
    users: Vec<User>,
    buses: Vec<Bus>,
    complaints: Vec<Complaint>,
}

/// In-memory stand-in for `PostgresRepository`. Unique keys and foreign keys behave like
/// the migration's constraints so handler tests see the same errors.
#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn user_count(&self) -> usize {
        self.store.lock().unwrap().users.len()
    }

    pub fn complaint_count(&self) -> usize {
        self.store.lock().unwrap().complaints.len()
    }
}

fn conflict(constraint: &str) -> AppError {
    AppError::Conflict(duplicate_message(Some(constraint)))
}

fn check_user_uniques(store: &Store, user: &User) -> Result<(), AppError> {
    for other in store.users.iter().filter(|u| u.id != user.id) {
        if other.email == user.email {
            return Err(conflict("users_email_key"));
        }
        let clashes = |a: &Option<String>, b: &Option<String>| a.is_some() && a == b;
        if clashes(&other.roll_no, &user.roll_no) {
            return Err(conflict("users_roll_no_key"));
        }
        if clashes(&other.cnic, &user.cnic) {
            return Err(conflict("users_cnic_key"));
        }
        if clashes(&other.phone_number, &user.phone_number) {
            return Err(conflict("users_phone_number_key"));
        }
        if clashes(&other.licence, &user.licence) {
            return Err(conflict("users_licence_key"));
        }
    }
    Ok(())
}

fn populate_bus(store: &Store, bus: &Bus) -> Bus {
    let mut bus = bus.clone();
    bus.driver_name = store
        .users
        .iter()
        .find(|u| u.id == bus.driver_id)
        .map(|u| u.name.clone());
    bus
}

fn user_ref(store: &Store, id: Uuid) -> Option<UserRef> {
    store.users.iter().find(|u| u.id == id).map(|u| UserRef {
        id: u.id,
        name: u.name.clone(),
        email: u.email.clone(),
    })
}

fn populate_complaint(store: &Store, c: &Complaint) -> ComplaintDetails {
    ComplaintDetails {
        id: c.id,
        user_id: user_ref(store, c.user_id),
        title: c.title.clone(),
        description: c.description.clone(),
        status: c.status,
        assigned_to: c.assigned_to.and_then(|id| user_ref(store, id)),
        created_at: c.created_at,
        updated_at: c.updated_at,
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            gender: user.gender,
            roll_no: user.roll_no,
            cnic: user.cnic,
            phone_number: user.phone_number,
            guardian_contact: user.guardian_contact,
            address: user.address,
            age: user.age,
            city: user.city,
            licence: user.licence,
            police_clearance: user.police_clearance,
            cnic_image: user.cnic_image,
            id_image: user.id_image,
            created_at: now,
            updated_at: now,
        };
        check_user_uniques(&store, &user)?;
        store.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, role: Role) -> Result<Vec<User>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().filter(|u| u.role == role).cloned().collect())
    }

    async fn list_user_options(&self, role: Role) -> Result<Vec<UserOption>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .filter(|u| u.role == role)
            .map(|u| UserOption {
                id: u.id,
                name: u.name.clone(),
            })
            .collect())
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let mut store = self.store.lock().unwrap();
        let Some(current) = store.users.iter().find(|u| u.id == id).cloned() else {
            return Ok(None);
        };

        let updated = User {
            name: changes.name.unwrap_or(current.name),
            email: changes.email.unwrap_or(current.email),
            password_hash: changes.password_hash.unwrap_or(current.password_hash),
            role: changes.role.unwrap_or(current.role),
            gender: changes.gender.unwrap_or(current.gender),
            roll_no: changes.roll_no.or(current.roll_no),
            cnic: changes.cnic.or(current.cnic),
            phone_number: changes.phone_number.or(current.phone_number),
            guardian_contact: changes.guardian_contact.or(current.guardian_contact),
            address: changes.address.or(current.address),
            age: changes.age.or(current.age),
            city: changes.city.or(current.city),
            licence: changes.licence.or(current.licence),
            police_clearance: changes.police_clearance.or(current.police_clearance),
            cnic_image: changes.cnic_image.or(current.cnic_image),
            id_image: changes.id_image.or(current.id_image),
            updated_at: Utc::now(),
            ..current
        };
        check_user_uniques(&store, &updated)?;

        if let Some(slot) = store.users.iter_mut().find(|u| u.id == id) {
            *slot = updated.clone();
        }
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        if !store.users.iter().any(|u| u.id == id) {
            return Ok(false);
        }
        // buses.driver_id is ON DELETE RESTRICT
        if store.buses.iter().any(|b| b.driver_id == id) {
            return Err(AppError::Conflict(
                "Record is still referenced by another record".to_string(),
            ));
        }
        store.users.retain(|u| u.id != id);
        store.complaints.retain(|c| c.user_id != id);
        for complaint in store.complaints.iter_mut() {
            if complaint.assigned_to == Some(id) {
                complaint.assigned_to = None;
            }
        }
        Ok(true)
    }

    async fn create_bus(&self, req: CreateBusRequest) -> Result<Bus, AppError> {
        let mut store = self.store.lock().unwrap();
        if store.buses.iter().any(|b| b.bus_number == req.bus_number) {
            return Err(conflict("buses_bus_number_key"));
        }
        let now = Utc::now();
        let bus = Bus {
            id: Uuid::new_v4(),
            bus_number: req.bus_number,
            status: req.status,
            driver_id: req.driver_id,
            driver_name: None,
            created_at: now,
            updated_at: now,
        };
        store.buses.push(bus.clone());
        Ok(populate_bus(&store, &bus))
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.buses.iter().map(|b| populate_bus(&store, b)).collect())
    }

    async fn get_bus(&self, id: Uuid) -> Result<Option<Bus>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .buses
            .iter()
            .find(|b| b.id == id)
            .map(|b| populate_bus(&store, b)))
    }

    async fn update_bus(&self, id: Uuid, req: UpdateBusRequest) -> Result<Option<Bus>, AppError> {
        let mut store = self.store.lock().unwrap();
        if let Some(number) = &req.bus_number {
            if store.buses.iter().any(|b| b.id != id && &b.bus_number == number) {
                return Err(conflict("buses_bus_number_key"));
            }
        }
        let Some(bus) = store.buses.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(number) = req.bus_number {
            bus.bus_number = number;
        }
        if let Some(status) = req.status {
            bus.status = status;
        }
        if let Some(driver_id) = req.driver_id {
            bus.driver_id = driver_id;
        }
        bus.updated_at = Utc::now();
        let bus = bus.clone();
        Ok(Some(populate_bus(&store, &bus)))
    }

    async fn delete_bus(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.buses.len();
        store.buses.retain(|b| b.id != id);
        Ok(store.buses.len() < before)
    }

    async fn driver_has_bus(&self, driver_id: Uuid) -> Result<bool, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.buses.iter().any(|b| b.driver_id == driver_id))
    }

    async fn create_complaint(&self, complaint: NewComplaint) -> Result<Complaint, AppError> {
        let mut store = self.store.lock().unwrap();
        let now = Utc::now();
        let complaint = Complaint {
            id: Uuid::new_v4(),
            user_id: complaint.user_id,
            title: complaint.title,
            description: complaint.description,
            status: Default::default(),
            assigned_to: complaint.assigned_to,
            created_at: now,
            updated_at: now,
        };
        store.complaints.push(complaint.clone());
        Ok(complaint)
    }

    async fn list_complaints(
        &self,
        reporter: Option<Uuid>,
    ) -> Result<Vec<ComplaintDetails>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .complaints
            .iter()
            .filter(|c| reporter.is_none_or(|r| c.user_id == r))
            .map(|c| populate_complaint(&store, c))
            .collect())
    }

    async fn get_complaint(&self, id: Uuid) -> Result<Option<ComplaintDetails>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .complaints
            .iter()
            .find(|c| c.id == id)
            .map(|c| populate_complaint(&store, c)))
    }

    async fn update_complaint(
        &self,
        id: Uuid,
        req: UpdateComplaintRequest,
    ) -> Result<Option<Complaint>, AppError> {
        let mut store = self.store.lock().unwrap();
        let Some(complaint) = store.complaints.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            complaint.title = title;
        }
        if let Some(description) = req.description {
            complaint.description = description;
        }
        if let Some(status) = req.status {
            complaint.status = status;
        }
        if let Some(assignee) = req.assigned_to {
            complaint.assigned_to = assignee;
        }
        complaint.updated_at = Utc::now();
        Ok(Some(complaint.clone()))
    }

    async fn delete_complaint(&self, id: Uuid) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.complaints.len();
        store.complaints.retain(|c| c.id != id);
        Ok(store.complaints.len() < before)
    }
}

// --- State helpers ---

pub fn test_config() -> AppConfig {
    AppConfig::default()
}

pub fn app_state(repo: Arc<InMemoryRepository>) -> AppState {
    app_state_with(repo, MockStorageService::new(), test_config())
}

pub fn app_state_with(
    repo: Arc<InMemoryRepository>,
    storage: MockStorageService,
    config: AppConfig,
) -> AppState {
    AppState {
        repo: repo as RepositoryState,
        storage: Arc::new(storage) as StorageState,
        config,
    }
}

// --- Seed data ---

/// Inserts a user of `role` whose password is `TEST_PASSWORD`.
pub async fn seed_user(repo: &InMemoryRepository, role: Role, email: &str) -> User {
    let password_hash = bcrypt::hash(TEST_PASSWORD, 4).unwrap();
    repo.create_user(NewUser {
        name: format!("Test {role}"),
        email: email.to_string(),
        password_hash,
        role,
        gender: Gender::Male,
        roll_no: None,
        cnic: None,
        phone_number: None,
        guardian_contact: None,
        address: None,
        age: None,
        city: None,
        licence: None,
        police_clearance: (role == Role::Driver).then_some(PoliceClearance::Verified),
        cnic_image: None,
        id_image: None,
    })
    .await
    .unwrap()
}

pub fn auth_for(user: &User) -> AuthUser {
    AuthUser::from(user)
}

pub fn bearer_for(user: &User, config: &AppConfig) -> String {
    format!("Bearer {}", issue_token(user, config).unwrap())
}

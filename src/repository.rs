use crate::{
    error::AppError,
    models::{
        Bus, Complaint, ComplaintDetails, ComplaintRow, ComplaintStatus,
        CreateBusRequest, NewComplaint, NewUser, Role, UpdateBusRequest, UpdateComplaintRequest,
        User, UserChanges, UserOption,
    },
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// The persistence contract used by the handlers and the auth extractor. Store failures
/// come back as `AppError`, so unique and foreign-key violations already carry their
/// HTTP meaning.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn create_user(&self, user: NewUser) -> Result<User, AppError>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self, role: Role) -> Result<Vec<User>, AppError>;
    // `{ _id, name }` pairs for dropdowns.
    async fn list_user_options(&self, role: Role) -> Result<Vec<UserOption>, AppError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;

    // --- Buses (driver name populated) ---
    async fn create_bus(&self, req: CreateBusRequest) -> Result<Bus, AppError>;
    async fn list_buses(&self) -> Result<Vec<Bus>, AppError>;
    async fn get_bus(&self, id: Uuid) -> Result<Option<Bus>, AppError>;
    async fn update_bus(&self, id: Uuid, req: UpdateBusRequest) -> Result<Option<Bus>, AppError>;
    async fn delete_bus(&self, id: Uuid) -> Result<bool, AppError>;
    // Whether any bus names `driver_id` as its driver.
    async fn driver_has_bus(&self, driver_id: Uuid) -> Result<bool, AppError>;

    // --- Complaints ---
    async fn create_complaint(&self, complaint: NewComplaint) -> Result<Complaint, AppError>;
    // All complaints, or only those filed by `reporter` when given.
    async fn list_complaints(
        &self,
        reporter: Option<Uuid>,
    ) -> Result<Vec<ComplaintDetails>, AppError>;
    async fn get_complaint(&self, id: Uuid) -> Result<Option<ComplaintDetails>, AppError>;
    async fn update_complaint(
        &self,
        id: Uuid,
        req: UpdateComplaintRequest,
    ) -> Result<Option<Complaint>, AppError>;
    async fn delete_complaint(&self, id: Uuid) -> Result<bool, AppError>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, role, gender, roll_no, cnic, phone_number,
    guardian_contact, address, age, city, licence, police_clearance, cnic_image, id_image,
    created_at, updated_at
"#;

// Reads a bus with its driver populated, from any relation `b` shaped like `buses`.
const BUS_SELECT: &str = r#"
    SELECT b.id, b.bus_number, b.status, b.driver_id, u.name AS driver_name,
           b.created_at, b.updated_at
"#;

const COMPLAINT_SELECT: &str = r#"
    SELECT c.id, c.user_id, r.name AS reporter_name, r.email AS reporter_email,
           c.title, c.description, c.status, c.assigned_to,
           a.name AS assignee_name, a.email AS assignee_email,
           c.created_at, c.updated_at
    FROM complaints c
    LEFT JOIN users r ON r.id = c.user_id
    LEFT JOIN users a ON a.id = c.assigned_to
"#;

const COMPLAINT_COLUMNS: &str =
    "id, user_id, title, description, status, assigned_to, created_at, updated_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn create_user(&self, user: NewUser) -> Result<User, AppError> {
        let sql = format!(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, gender, roll_no, cnic, phone_number,
                guardian_contact, address, age, city, licence, police_clearance,
                cnic_image, id_image, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, NOW(), NOW())
            RETURNING {USER_COLUMNS}
            "#
        );

        let created = sqlx::query_as::<_, User>(&sql)
            .bind(Uuid::new_v4())
            .bind(user.name)
            .bind(user.email)
            .bind(user.password_hash)
            .bind(user.role)
            .bind(user.gender)
            .bind(user.roll_no)
            .bind(user.cnic)
            .bind(user.phone_number)
            .bind(user.guardian_contact)
            .bind(user.address)
            .bind(user.age)
            .bind(user.city)
            .bind(user.licence)
            .bind(user.police_clearance)
            .bind(user.cnic_image)
            .bind(user.id_image)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self, role: Role) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(role)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_user_options(&self, role: Role) -> Result<Vec<UserOption>, AppError> {
        Ok(sqlx::query_as::<_, UserOption>(
            "SELECT id, name FROM users WHERE role = $1 ORDER BY name ASC",
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?)
    }

    /// update_user
    ///
    /// Partial update: `COALESCE` keeps the stored value for every field left `None`.
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, AppError> {
        let sql = format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                role = COALESCE($5, role),
                gender = COALESCE($6, gender),
                roll_no = COALESCE($7, roll_no),
                cnic = COALESCE($8, cnic),
                phone_number = COALESCE($9, phone_number),
                guardian_contact = COALESCE($10, guardian_contact),
                address = COALESCE($11, address),
                age = COALESCE($12, age),
                city = COALESCE($13, city),
                licence = COALESCE($14, licence),
                police_clearance = COALESCE($15, police_clearance),
                cnic_image = COALESCE($16, cnic_image),
                id_image = COALESCE($17, id_image),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(changes.role)
            .bind(changes.gender)
            .bind(changes.roll_no)
            .bind(changes.cnic)
            .bind(changes.phone_number)
            .bind(changes.guardian_contact)
            .bind(changes.address)
            .bind(changes.age)
            .bind(changes.city)
            .bind(changes.licence)
            .bind(changes.police_clearance)
            .bind(changes.cnic_image)
            .bind(changes.id_image)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    /// create_bus
    ///
    /// Inserts and reads back the populated row in one statement (CTE + JOIN).
    async fn create_bus(&self, req: CreateBusRequest) -> Result<Bus, AppError> {
        let sql = format!(
            r#"
            WITH b AS (
                INSERT INTO buses (id, bus_number, status, driver_id, created_at, updated_at)
                VALUES ($1, $2, $3, $4, NOW(), NOW())
                RETURNING *
            )
            {BUS_SELECT}
            FROM b LEFT JOIN users u ON u.id = b.driver_id
            "#
        );

        Ok(sqlx::query_as::<_, Bus>(&sql)
            .bind(Uuid::new_v4())
            .bind(req.bus_number)
            .bind(req.status)
            .bind(req.driver_id)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_buses(&self) -> Result<Vec<Bus>, AppError> {
        let sql = format!(
            "{BUS_SELECT} FROM buses b LEFT JOIN users u ON u.id = b.driver_id ORDER BY b.created_at DESC"
        );
        Ok(sqlx::query_as::<_, Bus>(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_bus(&self, id: Uuid) -> Result<Option<Bus>, AppError> {
        let sql =
            format!("{BUS_SELECT} FROM buses b LEFT JOIN users u ON u.id = b.driver_id WHERE b.id = $1");
        Ok(sqlx::query_as::<_, Bus>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_bus(&self, id: Uuid, req: UpdateBusRequest) -> Result<Option<Bus>, AppError> {
        let sql = format!(
            r#"
            WITH b AS (
                UPDATE buses
                SET bus_number = COALESCE($2, bus_number),
                    status = COALESCE($3, status),
                    driver_id = COALESCE($4, driver_id),
                    updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            {BUS_SELECT}
            FROM b LEFT JOIN users u ON u.id = b.driver_id
            "#
        );

        Ok(sqlx::query_as::<_, Bus>(&sql)
            .bind(id)
            .bind(req.bus_number)
            .bind(req.status)
            .bind(req.driver_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_bus(&self, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM buses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn driver_has_bus(&self, driver_id: Uuid) -> Result<bool, AppError> {
        Ok(
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM buses WHERE driver_id = $1)")
                .bind(driver_id)
                .fetch_one(&self.pool)
                .await?,
        )
    }

    async fn create_complaint(&self, complaint: NewComplaint) -> Result<Complaint, AppError> {
        let sql = format!(
            r#"
            INSERT INTO complaints (id, user_id, title, description, status, assigned_to, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW(), NOW())
            RETURNING {COMPLAINT_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Complaint>(&sql)
            .bind(Uuid::new_v4())
            .bind(complaint.user_id)
            .bind(complaint.title)
            .bind(complaint.description)
            .bind(ComplaintStatus::Pending)
            .bind(complaint.assigned_to)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn list_complaints(
        &self,
        reporter: Option<Uuid>,
    ) -> Result<Vec<ComplaintDetails>, AppError> {
        let sql = format!(
            "{COMPLAINT_SELECT} WHERE ($1::uuid IS NULL OR c.user_id = $1) ORDER BY c.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(reporter)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(ComplaintDetails::from).collect())
    }

    async fn get_complaint(&self, id: Uuid) -> Result<Option<ComplaintDetails>, AppError> {
        let sql = format!("{COMPLAINT_SELECT} WHERE c.id = $1");
        let row = sqlx::query_as::<_, ComplaintRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ComplaintDetails::from))
    }

    async fn update_complaint(
        &self,
        id: Uuid,
        req: UpdateComplaintRequest,
    ) -> Result<Option<Complaint>, AppError> {
        let sql = format!(
            r#"
            UPDATE complaints
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                assigned_to = CASE WHEN $6 THEN $5 ELSE assigned_to END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {COMPLAINT_COLUMNS}
            "#
        );

        Ok(sqlx::query_as::<_, Complaint>(&sql)
            .bind(id)
            .bind(req.title)
            .bind(req.description)
            .bind(req.status)
            .bind(req.assigned_to.flatten())
            .bind(req.assigned_to.is_some())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_complaint(&self, id: Uuid) -> Result<bool, AppError> {
        let res = sqlx::query("DELETE FROM complaints WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}


use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::diary::model::{FoodEntry, Meal};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub login: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub login: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub login: String,
}

/// Repository over the three collections: users, meals, food entries.
///
/// Deletes take the owning user id as well as the record id and report
/// whether exactly one record went away, so a mismatched owner reads the
/// same as a missing record. There are no joins and no transactions; the
/// service layer drives multi-record operations record by record.
#[async_trait]
pub trait DiaryStore: Send + Sync {
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User>;
    async fn find_user_by_login(&self, login: &str) -> anyhow::Result<Option<User>>;
    async fn login_or_email_taken(&self, login: &str, email: &str) -> anyhow::Result<bool>;
    async fn update_user(&self, id: i64, profile: UserProfile) -> anyhow::Result<bool>;

    async fn insert_meal(&self, meal: &Meal) -> anyhow::Result<()>;
    async fn list_meals(&self, user_id: i64, date: Option<Date>) -> anyhow::Result<Vec<Meal>>;
    async fn find_meal(&self, id: Uuid, user_id: i64) -> anyhow::Result<Option<Meal>>;
    async fn delete_meal(&self, id: Uuid, user_id: i64) -> anyhow::Result<bool>;

    async fn insert_entry(&self, entry: &FoodEntry) -> anyhow::Result<()>;
    async fn list_entries(&self, user_id: i64, date: Option<Date>)
        -> anyhow::Result<Vec<FoodEntry>>;
    async fn delete_entry(&self, id: Uuid, user_id: i64) -> anyhow::Result<bool>;
}

/// Postgres-backed store. Meals and food entries are kept as whole JSONB
/// documents with the filter columns (owner, date) extracted alongside.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DiaryStore for PgStore {
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, login, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, first_name, last_name, email, login, password_hash, created_at
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.login)
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .context("insert user")?;
        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, first_name, last_name, email, login, password_hash, created_at
            FROM users
            WHERE login = $1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn login_or_email_taken(&self, login: &str, email: &str) -> anyhow::Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (SELECT 1 FROM users WHERE login = $1 OR email = $2)"#,
        )
        .bind(login)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn update_user(&self, id: i64, profile: UserProfile) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, login = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.email)
        .bind(&profile.login)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_meal(&self, meal: &Meal) -> anyhow::Result<()> {
        let doc = serde_json::to_value(meal).context("serialize meal")?;
        sqlx::query(
            r#"
            INSERT INTO meals (id, user_id, date_created, created_at, doc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(meal.id)
        .bind(meal.user_id)
        .bind(meal.date_created)
        .bind(meal.timestamp)
        .bind(doc)
        .execute(&self.pool)
        .await
        .context("insert meal")?;
        Ok(())
    }

    async fn list_meals(&self, user_id: i64, date: Option<Date>) -> anyhow::Result<Vec<Meal>> {
        let docs = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT doc FROM meals
            WHERE user_id = $1 AND ($2::date IS NULL OR date_created = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).context("decode meal"))
            .collect()
    }

    async fn find_meal(&self, id: Uuid, user_id: i64) -> anyhow::Result<Option<Meal>> {
        let doc = sqlx::query_scalar::<_, serde_json::Value>(
            r#"SELECT doc FROM meals WHERE id = $1 AND user_id = $2"#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        doc.map(|doc| serde_json::from_value(doc).context("decode meal"))
            .transpose()
    }

    async fn delete_meal(&self, id: Uuid, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM meals WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_entry(&self, entry: &FoodEntry) -> anyhow::Result<()> {
        let doc = serde_json::to_value(entry).context("serialize food entry")?;
        sqlx::query(
            r#"
            INSERT INTO food_entries (id, user_id, date_added, created_at, doc)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.date_added)
        .bind(entry.timestamp)
        .bind(doc)
        .execute(&self.pool)
        .await
        .context("insert food entry")?;
        Ok(())
    }

    async fn list_entries(
        &self,
        user_id: i64,
        date: Option<Date>,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        let docs = sqlx::query_scalar::<_, serde_json::Value>(
            r#"
            SELECT doc FROM food_entries
            WHERE user_id = $1 AND ($2::date IS NULL OR date_added = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await?;
        docs.into_iter()
            .map(|doc| serde_json::from_value(doc).context("decode food entry"))
            .collect()
    }

    async fn delete_entry(&self, id: Uuid, user_id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM food_entries WHERE id = $1 AND user_id = $2"#)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// In-memory store for tests. `fail_entry_inserts_after` makes
/// `insert_entry` start failing after N successes, to exercise the
/// partial-effect behavior of multi-insert loops.
#[cfg(test)]
pub struct MemoryStore {
    users: std::sync::Mutex<Vec<User>>,
    meals: std::sync::Mutex<Vec<Meal>>,
    entries: std::sync::Mutex<Vec<FoodEntry>>,
    pub fail_entry_inserts_after: std::sync::Mutex<Option<usize>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(Vec::new()),
            meals: std::sync::Mutex::new(Vec::new()),
            entries: std::sync::Mutex::new(Vec::new()),
            fail_entry_inserts_after: std::sync::Mutex::new(None),
        }
    }

    pub fn entry_count(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn meal_count(&self) -> usize {
        self.meals.lock().unwrap().len()
    }
}

#[cfg(test)]
#[async_trait]
impl DiaryStore for MemoryStore {
    async fn create_user(&self, new: NewUser) -> anyhow::Result<User> {
        let mut users = self.users.lock().unwrap();
        let user = User {
            id: users.len() as i64 + 1,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            login: new.login,
            password_hash: new.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_login(&self, login: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.login == login)
            .cloned())
    }

    async fn login_or_email_taken(&self, login: &str, email: &str) -> anyhow::Result<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.login == login || u.email == email))
    }

    async fn update_user(&self, id: i64, profile: UserProfile) -> anyhow::Result<bool> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.first_name = profile.first_name;
                user.last_name = profile.last_name;
                user.email = profile.email;
                user.login = profile.login;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_meal(&self, meal: &Meal) -> anyhow::Result<()> {
        self.meals.lock().unwrap().push(meal.clone());
        Ok(())
    }

    async fn list_meals(&self, user_id: i64, date: Option<Date>) -> anyhow::Result<Vec<Meal>> {
        Ok(self
            .meals
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.user_id == user_id && date.map_or(true, |d| m.date_created == d))
            .cloned()
            .collect())
    }

    async fn find_meal(&self, id: Uuid, user_id: i64) -> anyhow::Result<Option<Meal>> {
        Ok(self
            .meals
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id == id && m.user_id == user_id)
            .cloned())
    }

    async fn delete_meal(&self, id: Uuid, user_id: i64) -> anyhow::Result<bool> {
        let mut meals = self.meals.lock().unwrap();
        let before = meals.len();
        meals.retain(|m| !(m.id == id && m.user_id == user_id));
        Ok(before - meals.len() == 1)
    }

    async fn insert_entry(&self, entry: &FoodEntry) -> anyhow::Result<()> {
        if let Some(budget) = self.fail_entry_inserts_after.lock().unwrap().as_mut() {
            if *budget == 0 {
                anyhow::bail!("storage unavailable");
            }
            *budget -= 1;
        }
        self.entries.lock().unwrap().push(entry.clone());
        Ok(())
    }

    async fn list_entries(
        &self,
        user_id: i64,
        date: Option<Date>,
    ) -> anyhow::Result<Vec<FoodEntry>> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.user_id == user_id && date.map_or(true, |d| e.date_added == d))
            .cloned()
            .collect())
    }

    async fn delete_entry(&self, id: Uuid, user_id: i64) -> anyhow::Result<bool> {
        let mut entries = self.entries.lock().unwrap();
        let before = entries.len();
        entries.retain(|e| !(e.id == id && e.user_id == user_id));
        Ok(before - entries.len() == 1)
    }
}

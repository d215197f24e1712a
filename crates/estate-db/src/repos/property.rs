use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use estate_common::models::property::{
    ListingFilter, NewProperty, Poster, Property, PropertyDetail, PropertyUpdate,
};
use sqlx::PgPool;
use uuid::Uuid;

const PROPERTY_COLUMNS: &str = "property_id, title, description, price, location, images, \
     property_type, posted_by, created_at";

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyRow {
    pub property_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub price: i64,
    pub location: String,
    pub images: Vec<String>,
    pub property_type: Option<String>,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A property joined with its poster's email (NULL when the user is gone)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PropertyWithPosterRow {
    #[sqlx(flatten)]
    pub property: PropertyRow,
    pub poster_email: Option<String>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.property_id,
            title: row.title,
            description: row.description,
            price: row.price,
            location: row.location,
            images: row.images,
            property_type: row.property_type,
            posted_by: row.posted_by,
            created_at: row.created_at,
        }
    }
}

impl From<PropertyWithPosterRow> for PropertyDetail {
    fn from(row: PropertyWithPosterRow) -> Self {
        let p = row.property;
        PropertyDetail {
            id: p.property_id,
            title: p.title,
            description: p.description,
            price: p.price,
            location: p.location,
            images: p.images,
            property_type: p.property_type,
            posted_by: row.poster_email.map(|email| Poster {
                id: p.posted_by,
                email,
            }),
            created_at: p.created_at,
        }
    }
}

pub struct PropertyRepo;

impl PropertyRepo {
    /// Insert a listing with a generated id; `created_at` defaults to now.
    pub async fn create(
        pool: &PgPool,
        property: &NewProperty,
        posted_by: Uuid,
    ) -> Result<PropertyRow> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"INSERT INTO property (property_id, title, description, price, location, images, property_type, posted_by)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {PROPERTY_COLUMNS}"#
        ))
        .bind(Uuid::new_v4())
        .bind(&property.title)
        .bind(&property.description)
        .bind(property.price)
        .bind(&property.location)
        .bind(&property.images)
        .bind(&property.property_type)
        .bind(posted_by)
        .fetch_one(pool)
        .await
        .context("Failed to create property")?;
        Ok(row)
    }

    /// List listings matching the filter, newest first.
    ///
    /// `location` matches as a case-insensitive substring, `max_price` is inclusive.
    pub async fn list(pool: &PgPool, filter: &ListingFilter) -> Result<Vec<PropertyRow>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"SELECT {PROPERTY_COLUMNS} FROM property
               WHERE ($1::TEXT IS NULL OR strpos(lower(location), lower($1::TEXT)) > 0)
                 AND ($2::BIGINT IS NULL OR price <= $2::BIGINT)
               ORDER BY created_at DESC, property_id DESC"#
        ))
        .bind(filter.location.as_deref())
        .bind(filter.max_price)
        .fetch_all(pool)
        .await
        .context("Failed to list properties")?;
        Ok(rows)
    }

    /// List listings posted by a user, newest first
    pub async fn list_by_poster(pool: &PgPool, posted_by: Uuid) -> Result<Vec<PropertyRow>> {
        let rows = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"SELECT {PROPERTY_COLUMNS} FROM property
               WHERE posted_by = $1
               ORDER BY created_at DESC, property_id DESC"#
        ))
        .bind(posted_by)
        .fetch_all(pool)
        .await
        .context("Failed to list properties by poster")?;
        Ok(rows)
    }

    pub async fn get(pool: &PgPool, property_id: Uuid) -> Result<Option<PropertyRow>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"SELECT {PROPERTY_COLUMNS} FROM property WHERE property_id = $1"#
        ))
        .bind(property_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get property")?;
        Ok(row)
    }

    pub async fn get_with_poster(
        pool: &PgPool,
        property_id: Uuid,
    ) -> Result<Option<PropertyWithPosterRow>> {
        let row = sqlx::query_as::<_, PropertyWithPosterRow>(
            r#"SELECT p.property_id, p.title, p.description, p.price, p.location, p.images,
                      p.property_type, p.posted_by, p.created_at, u.email AS poster_email
               FROM property p
               LEFT JOIN app_user u ON u.user_id = p.posted_by
               WHERE p.property_id = $1"#,
        )
        .bind(property_id)
        .fetch_optional(pool)
        .await
        .context("Failed to get property with poster")?;
        Ok(row)
    }

    /// Apply a partial update. Returns `None` if the property does not exist.
    pub async fn update(
        pool: &PgPool,
        property_id: Uuid,
        update: &PropertyUpdate,
    ) -> Result<Option<PropertyRow>> {
        let row = sqlx::query_as::<_, PropertyRow>(&format!(
            r#"UPDATE property SET
                   title = COALESCE($2, title),
                   description = CASE WHEN $8 THEN $3 ELSE description END,
                   price = COALESCE($4, price),
                   location = COALESCE($5, location),
                   images = COALESCE($6, images),
                   property_type = CASE WHEN $9 THEN $7 ELSE property_type END
               WHERE property_id = $1
               RETURNING {PROPERTY_COLUMNS}"#
        ))
        .bind(property_id)
        .bind(&update.title)
        .bind(update.description.clone().flatten())
        .bind(update.price)
        .bind(&update.location)
        .bind(&update.images)
        .bind(update.property_type.clone().flatten())
        .bind(update.description.is_some())
        .bind(update.property_type.is_some())
        .fetch_optional(pool)
        .await
        .context("Failed to update property")?;
        Ok(row)
    }

    /// Delete a property. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, property_id: Uuid) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM property WHERE property_id = $1"#)
            .bind(property_id)
            .execute(pool)
            .await
            .context("Failed to delete property")?;
        Ok(result.rows_affected() > 0)
    }
}

// src/db/property_repo.rs

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::property::{
        Property, PropertyListQuery, PropertyState, PropertyStatus, PropertyType,
    },
};

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

#[allow(clippy::too_many_arguments)]
impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        property_code: &str,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        location: Option<&str>,
        zone: Option<&str>,
        thana: Option<&str>,
        area: Option<&str>,
        address: Option<&str>,
        city: Option<&str>,
        state: PropertyState,
        property_type: PropertyType,
        square_feet: Option<i32>,
        bedrooms: Option<i32>,
        bathrooms: Option<i32>,
        images: &[String],
        features: &[String],
        uploaded_by: Uuid,
        assigned_agent: Option<Uuid>,
    ) -> Result<Property, AppError> {
        sqlx::query_as::<_, Property>(
            r#"
            INSERT INTO properties (
                property_code, name, description, price,
                location, zone, thana, area, address, city,
                state, property_type, square_feet, bedrooms, bathrooms,
                images, features, uploaded_by, assigned_agent
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(property_code)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(location)
        .bind(zone)
        .bind(thana)
        .bind(area)
        .bind(address)
        .bind(city)
        .bind(state)
        .bind(property_type)
        .bind(square_feet)
        .bind(bedrooms)
        .bind(bathrooms)
        .bind(images)
        .bind(features)
        .bind(uploaded_by)
        .bind(assigned_agent)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(format!(
                        "O código '{}' já está em uso.",
                        property_code
                    ));
                }
            }
            e.into()
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(property)
    }

    /// Busca + incremento monotônico do contador de visualizações.
    pub async fn find_and_count_view(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>(
            "UPDATE properties SET view_count = view_count + 1 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(property)
    }

    pub async fn list(&self, q: &PropertyListQuery) -> Result<Vec<Property>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM properties WHERE 1=1");

        if let Some(raw) = &q.property_type {
            if let Some(pt) = PropertyType::parse(raw) {
                builder.push(" AND property_type = ");
                builder.push_bind(pt);
            }
        }
        if let Some(raw) = &q.state {
            if let Some(state) = PropertyState::parse(raw) {
                builder.push(" AND state = ");
                builder.push_bind(state);
            }
        }
        if let Some(status) = q.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(min) = q.min_price {
            builder.push(" AND price >= ");
            builder.push_bind(min);
        }
        if let Some(max) = q.max_price {
            builder.push(" AND price <= ");
            builder.push_bind(max);
        }
        if let Some(location) = &q.location {
            builder.push(" AND location ILIKE ");
            builder.push_bind(format!("%{}%", location));
        }
        if let Some(zone) = &q.zone {
            builder.push(" AND zone ILIKE ");
            builder.push_bind(format!("%{}%", zone));
        }
        if let Some(code) = &q.property_code {
            builder.push(" AND property_code = ");
            builder.push_bind(code.clone());
        }
        if let Some(search) = &q.search {
            let term = format!("%{}%", search);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(term.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(term.clone());
            builder.push(" OR address ILIKE ");
            builder.push_bind(term);
            builder.push(")");
        }

        // Ordenação: whitelist, nunca interpolar entrada do usuário
        let order = match q.sort.as_deref() {
            Some("price") => " ORDER BY price ASC",
            Some("-price") => " ORDER BY price DESC",
            Some("createdAt") => " ORDER BY created_at ASC",
            _ => " ORDER BY created_at DESC",
        };
        builder.push(order);

        let limit = q.limit.unwrap_or(20).clamp(1, 100);
        let offset = (q.page.unwrap_or(1).max(1) - 1) * limit;
        builder.push(" LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let properties = builder
            .build_query_as::<Property>()
            .fetch_all(&self.pool)
            .await?;
        Ok(properties)
    }

    /// Atualização parcial; estado/categoria chegam já normalizados.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        price: Option<Decimal>,
        location: Option<&str>,
        zone: Option<&str>,
        thana: Option<&str>,
        area: Option<&str>,
        address: Option<&str>,
        city: Option<&str>,
        state: Option<PropertyState>,
        property_type: Option<PropertyType>,
        square_feet: Option<i32>,
        bedrooms: Option<i32>,
        bathrooms: Option<i32>,
        images: Option<&[String]>,
        features: Option<&[String]>,
        status: Option<PropertyStatus>,
        is_published: Option<bool>,
    ) -> Result<Property, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE properties SET updated_at = NOW()");

        if let Some(v) = name {
            builder.push(", name = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = description {
            builder.push(", description = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = price {
            builder.push(", price = ");
            builder.push_bind(v);
        }
        if let Some(v) = location {
            builder.push(", location = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = zone {
            builder.push(", zone = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = thana {
            builder.push(", thana = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = area {
            builder.push(", area = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = address {
            builder.push(", address = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = city {
            builder.push(", city = ");
            builder.push_bind(v.to_owned());
        }
        if let Some(v) = state {
            builder.push(", state = ");
            builder.push_bind(v);
        }
        if let Some(v) = property_type {
            builder.push(", property_type = ");
            builder.push_bind(v);
        }
        if let Some(v) = square_feet {
            builder.push(", square_feet = ");
            builder.push_bind(v);
        }
        if let Some(v) = bedrooms {
            builder.push(", bedrooms = ");
            builder.push_bind(v);
        }
        if let Some(v) = bathrooms {
            builder.push(", bathrooms = ");
            builder.push_bind(v);
        }
        if let Some(v) = images {
            builder.push(", images = ");
            builder.push_bind(v.to_vec());
        }
        if let Some(v) = features {
            builder.push(", features = ");
            builder.push_bind(v.to_vec());
        }
        if let Some(v) = status {
            builder.push(", status = ");
            builder.push_bind(v);
        }
        // isPublished e publishedToFrontend andam em sincronia
        if let Some(v) = is_published {
            builder.push(", is_published = ");
            builder.push_bind(v);
            builder.push(", published_to_frontend = ");
            builder.push_bind(v);
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        let property = builder
            .build_query_as::<Property>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Imóvel"))?;
        Ok(property)
    }

    pub async fn set_published(&self, id: Uuid, published: bool) -> Result<Property, AppError> {
        let property = sqlx::query_as::<_, Property>(
            r#"
            UPDATE properties
            SET is_published = $2, published_to_frontend = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(published)
        .fetch_optional(&self.pool)
        .await?;
        property.ok_or(AppError::NotFound("Imóvel"))
    }

    pub async fn set_assigned_agent(&self, id: Uuid, agent_id: Uuid) -> Result<Property, AppError> {
        let property = sqlx::query_as::<_, Property>(
            "UPDATE properties SET assigned_agent = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(agent_id)
        .fetch_optional(&self.pool)
        .await?;
        property.ok_or(AppError::NotFound("Imóvel"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Imóvel"));
        }
        Ok(())
    }
}

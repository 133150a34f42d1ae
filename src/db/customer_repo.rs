// src/db/customer_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::customer::{
        AddNotePayload, CreateCustomerPayload, Customer, CustomerListQuery, CustomerNote,
        CustomerStatus, MovedFrom, Priority, UpdateCustomerPayload,
    },
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        p: &CreateCustomerPayload,
        added_by: Uuid,
        status: CustomerStatus,
        priority: Priority,
        source: &str,
        is_follow_up_due: bool,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (
                name, phone, email, address, customer_zone, customer_thana,
                budget, preferred_location, property_type, interested_properties,
                assigned_agent, added_by, status, priority,
                next_follow_up_date, next_follow_up_action, is_follow_up_due,
                source, referred_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(&p.name)
        .bind(&p.phone)
        .bind(&p.email)
        .bind(&p.address)
        .bind(&p.customer_zone)
        .bind(&p.customer_thana)
        .bind(p.budget.clone().map(Json))
        .bind(p.preferred_location.clone().unwrap_or_default())
        .bind(p.property_type.clone().unwrap_or_default())
        .bind(p.interested_properties.clone().unwrap_or_default())
        .bind(p.assigned_agent)
        .bind(added_by)
        .bind(status)
        .bind(priority)
        .bind(p.next_follow_up_date)
        .bind(&p.next_follow_up_action)
        .bind(is_follow_up_due)
        .bind(source)
        .bind(&p.referred_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Listagem com filtros. `restrict_to_agent` limita à visibilidade do
    /// agente (atribuído a ele OU cadastrado por ele).
    pub async fn list(
        &self,
        q: &CustomerListQuery,
        restrict_to_agent: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT * FROM customers WHERE 1=1");

        if let Some(agent) = restrict_to_agent {
            builder.push(" AND (assigned_agent = ");
            builder.push_bind(agent);
            builder.push(" OR added_by = ");
            builder.push_bind(agent);
            builder.push(")");
        }
        if let Some(status) = q.status {
            builder.push(" AND status = ");
            builder.push_bind(status);
        }
        if let Some(priority) = q.priority {
            builder.push(" AND priority = ");
            builder.push_bind(priority);
        }
        if let Some(zone) = &q.zone {
            builder.push(" AND customer_zone ILIKE ");
            builder.push_bind(format!("%{}%", zone));
        }
        if let Some(source) = &q.source {
            builder.push(" AND source = ");
            builder.push_bind(source.clone());
        }
        if let Some(agent) = q.assigned_agent {
            builder.push(" AND assigned_agent = ");
            builder.push_bind(agent);
        }
        if let Some(search) = &q.search {
            let term = format!("%{}%", search);
            builder.push(" AND (name ILIKE ");
            builder.push_bind(term.clone());
            builder.push(" OR phone ILIKE ");
            builder.push_bind(term.clone());
            builder.push(" OR email ILIKE ");
            builder.push_bind(term);
            builder.push(")");
        }

        let limit = q.limit.unwrap_or(20).clamp(1, 100);
        let offset = (q.page.unwrap_or(1).max(1) - 1) * limit;
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let customers = builder
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    /// Clientes de outros agentes: exclui deliberadamente os do chamador.
    pub async fn list_foreign(&self, agent_id: Uuid) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE (assigned_agent IS DISTINCT FROM $1) AND added_by <> $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(agent_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    /// Atualização parcial. `is_follow_up_due` é sempre reescrito — o
    /// recálculo roda em todo caminho de escrita, não só em edições de
    /// follow-up.
    pub async fn update(
        &self,
        id: Uuid,
        p: &UpdateCustomerPayload,
        is_follow_up_due: bool,
    ) -> Result<Customer, AppError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE customers SET updated_at = NOW(), is_follow_up_due = ");
        builder.push_bind(is_follow_up_due);

        if let Some(name) = &p.name {
            builder.push(", name = ");
            builder.push_bind(name.clone());
        }
        if let Some(phone) = &p.phone {
            builder.push(", phone = ");
            builder.push_bind(phone.clone());
        }
        if let Some(email) = &p.email {
            builder.push(", email = ");
            builder.push_bind(email.clone());
        }
        if let Some(address) = &p.address {
            builder.push(", address = ");
            builder.push_bind(address.clone());
        }
        if let Some(zone) = &p.customer_zone {
            builder.push(", customer_zone = ");
            builder.push_bind(zone.clone());
        }
        if let Some(thana) = &p.customer_thana {
            builder.push(", customer_thana = ");
            builder.push_bind(thana.clone());
        }
        if let Some(budget) = &p.budget {
            builder.push(", budget = ");
            builder.push_bind(Json(budget.clone()));
        }
        if let Some(locations) = &p.preferred_location {
            builder.push(", preferred_location = ");
            builder.push_bind(locations.clone());
        }
        if let Some(types) = &p.property_type {
            builder.push(", property_type = ");
            builder.push_bind(types.clone());
        }
        if let Some(props) = &p.interested_properties {
            builder.push(", interested_properties = ");
            builder.push_bind(props.clone());
        }
        if let Some(status) = p.status {
            builder.push(", status = ");
            builder.push_bind(status);
        }
        if let Some(priority) = p.priority {
            builder.push(", priority = ");
            builder.push_bind(priority);
        }
        if let Some(last_contact) = p.last_contact_date {
            builder.push(", last_contact_date = ");
            builder.push_bind(last_contact);
        }
        if let Some(next) = p.next_follow_up_date {
            builder.push(", next_follow_up_date = ");
            builder.push_bind(next);
        }
        if let Some(action) = &p.next_follow_up_action {
            builder.push(", next_follow_up_action = ");
            builder.push_bind(action.clone());
        }
        if let Some(source) = &p.source {
            builder.push(", source = ");
            builder.push_bind(source.clone());
        }
        if let Some(referred) = &p.referred_by {
            builder.push(", referred_by = ");
            builder.push_bind(referred.clone());
        }

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING *");

        let customer = builder
            .build_query_as::<Customer>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        Ok(customer)
    }

    /// Lado primário da atribuição: grava o agente e, se houve troca real,
    /// o slot moved_from com o agente anterior.
    pub async fn set_assigned_agent(
        &self,
        id: Uuid,
        agent_id: Uuid,
        moved_from: Option<&MovedFrom>,
    ) -> Result<Customer, AppError> {
        let customer = match moved_from {
            Some(m) => {
                sqlx::query_as::<_, Customer>(
                    r#"
                    UPDATE customers
                    SET assigned_agent = $2, moved_from = $3, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(agent_id)
                .bind(Json(m.clone()))
                .fetch_optional(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Customer>(
                    r#"
                    UPDATE customers
                    SET assigned_agent = $2, updated_at = NOW()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(id)
                .bind(agent_id)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        customer.ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn update_region(
        &self,
        id: Uuid,
        zone: Option<&str>,
        thana: Option<&str>,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET customer_zone = COALESCE($2, customer_zone),
                customer_thana = COALESCE($3, customer_thana),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(zone)
        .bind(thana)
        .fetch_optional(&self.pool)
        .await?;
        customer.ok_or(AppError::NotFound("Cliente"))
    }

    /// Fechamento pelo agente: rejeição, não venda.
    pub async fn agent_close(
        &self,
        id: Uuid,
        closed_by: Uuid,
        reason: Option<&str>,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET agent_closed = TRUE,
                closed_by = $2,
                closed_at = NOW(),
                close_reason = $3,
                status = 'closed',
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(closed_by)
        .bind(reason)
        .fetch_optional(&self.pool)
        .await?;
        customer.ok_or(AppError::NotFound("Cliente"))
    }

    /// Inverso exato do agent_close: limpa os quatro campos e volta a 'new'.
    pub async fn reopen(&self, id: Uuid) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET agent_closed = FALSE,
                closed_by = NULL,
                closed_at = NULL,
                close_reason = NULL,
                status = 'new',
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        customer.ok_or(AppError::NotFound("Cliente"))
    }

    /// Propagação de visita concluída: status vira visit-done e os campos de
    /// follow-up da visita, quando presentes, sobrescrevem os do cliente.
    pub async fn apply_completed_visit(
        &self,
        id: Uuid,
        next_follow_up: Option<DateTime<Utc>>,
        follow_up_action: Option<&str>,
    ) -> Result<Customer, AppError> {
        // O vencimento é derivado da data efetiva (a nova ou a já gravada)
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET status = 'visit-done',
                last_contact_date = NOW(),
                next_follow_up_date = COALESCE($2, next_follow_up_date),
                next_follow_up_action = COALESCE($3, next_follow_up_action),
                is_follow_up_due = COALESCE($2, next_follow_up_date) IS NOT NULL
                                   AND COALESCE($2, next_follow_up_date) <= NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(next_follow_up)
        .bind(follow_up_action)
        .fetch_optional(&self.pool)
        .await?;
        customer.ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Cliente"));
        }
        Ok(())
    }

    // =========================================================================
    //  NOTAS
    // =========================================================================

    pub async fn add_note(
        &self,
        customer_id: Uuid,
        p: &AddNotePayload,
        created_by: Uuid,
    ) -> Result<CustomerNote, AppError> {
        let note = sqlx::query_as::<_, CustomerNote>(
            r#"
            INSERT INTO customer_notes (customer_id, text, next_follow_up_date, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(&p.note)
        .bind(p.next_follow_up_date)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;
        Ok(note)
    }

    pub async fn list_notes(&self, customer_id: Uuid) -> Result<Vec<CustomerNote>, AppError> {
        let notes = sqlx::query_as::<_, CustomerNote>(
            "SELECT * FROM customer_notes WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    /// A nota pode reagendar o follow-up do cliente.
    pub async fn set_follow_up(
        &self,
        id: Uuid,
        next_follow_up_date: DateTime<Utc>,
        is_follow_up_due: bool,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE customers
            SET next_follow_up_date = $2,
                is_follow_up_due = $3,
                last_contact_date = NOW(),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(next_follow_up_date)
        .bind(is_follow_up_due)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    // =========================================================================
    //  FOLLOW-UPS VENCIDOS
    // =========================================================================

    pub async fn list_due_follow_ups(
        &self,
        restrict_to_agent: Option<Uuid>,
    ) -> Result<Vec<Customer>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT * FROM customers \
             WHERE next_follow_up_date IS NOT NULL AND next_follow_up_date <= NOW() \
             AND status NOT IN ('closed', 'closed_won')",
        );
        if let Some(agent) = restrict_to_agent {
            builder.push(" AND (assigned_agent = ");
            builder.push_bind(agent);
            builder.push(" OR added_by = ");
            builder.push_bind(agent);
            builder.push(")");
        }
        builder.push(" ORDER BY next_follow_up_date ASC");

        let customers = builder
            .build_query_as::<Customer>()
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn count_due_follow_ups(
        &self,
        restrict_to_agent: Option<Uuid>,
    ) -> Result<i64, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT COUNT(*) FROM customers \
             WHERE next_follow_up_date IS NOT NULL AND next_follow_up_date <= NOW() \
             AND status NOT IN ('closed', 'closed_won')",
        );
        if let Some(agent) = restrict_to_agent {
            builder.push(" AND (assigned_agent = ");
            builder.push_bind(agent);
            builder.push(" OR added_by = ");
            builder.push_bind(agent);
            builder.push(")");
        }

        let count: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count)
    }
}

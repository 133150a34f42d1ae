// src/services/customer_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, SourceRepository, UserRepository, VisitRepository},
    models::{
        auth::User,
        customer::{
            AddNotePayload, AgentClosePayload, CreateCustomerPayload, Customer, CustomerDetail,
            CustomerListQuery, CustomerNote, CustomerStatus, MoveCustomerPayload, Priority,
            UpdateCustomerPayload,
        },
    },
    services::{
        lifecycle::{self, Reassignment},
        notification_service::{NotificationEvent, Notifier},
    },
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    user_repo: UserRepository,
    visit_repo: VisitRepository,
    source_repo: SourceRepository,
    notifier: Notifier,
}

impl CustomerService {
    pub fn new(
        repo: CustomerRepository,
        user_repo: UserRepository,
        visit_repo: VisitRepository,
        source_repo: SourceRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            repo,
            user_repo,
            visit_repo,
            source_repo,
            notifier,
        }
    }

    // =========================================================================
    //  AUTORIZAÇÃO (regra de posse, não só de papel)
    // =========================================================================

    /// Agente só enxerga clientes atribuídos a ele ou cadastrados por ele.
    fn ensure_can_access(&self, actor: &User, customer: &Customer) -> Result<(), AppError> {
        if actor.role.is_admin() {
            return Ok(());
        }
        if customer.assigned_agent == Some(actor.id) || customer.added_by == actor.id {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Você não tem acesso a este cliente.".into(),
        ))
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    pub async fn create(
        &self,
        actor: &User,
        payload: CreateCustomerPayload,
    ) -> Result<Customer, AppError> {
        // A fonte, quando informada, precisa existir e estar ativa
        let source = match &payload.source {
            Some(value) => {
                let found = self
                    .source_repo
                    .find_by_value(value)
                    .await?
                    .filter(|s| s.is_active)
                    .ok_or_else(|| {
                        AppError::BadRequest(format!("A fonte '{}' não existe ou está inativa.", value))
                    })?;
                found.value
            }
            None => "website".to_owned(),
        };

        if let Some(agent_id) = payload.assigned_agent {
            self.ensure_agent_exists(agent_id).await?;
        }

        let now = Utc::now();
        let is_due = lifecycle::follow_up_due(payload.next_follow_up_date, now);
        let status = payload.status.unwrap_or(CustomerStatus::New);
        let priority = payload.priority.unwrap_or(Priority::Medium);

        let customer = self
            .repo
            .create(&payload, actor.id, status, priority, &source, is_due)
            .await?;

        match customer.assigned_agent {
            Some(agent_id) => {
                // Escrita reversa do motor de atribuição
                self.user_repo
                    .append_assigned_customer(agent_id, customer.id)
                    .await?;
                self.emit_assignment_events(&customer, agent_id);
            }
            None => {
                if lifecycle::announce_unassigned(actor.role) {
                    self.notifier.notify(NotificationEvent::CustomerAddedUnassigned {
                        customer_id: customer.id,
                        customer_name: display_name(&customer),
                    });
                }
            }
        }

        Ok(customer)
    }

    pub async fn list(
        &self,
        actor: &User,
        query: &CustomerListQuery,
    ) -> Result<Vec<Customer>, AppError> {
        let restriction = if actor.role.is_admin() {
            None
        } else {
            Some(actor.id)
        };
        self.repo.list(query, restriction).await
    }

    pub async fn get_detail(&self, actor: &User, id: Uuid) -> Result<CustomerDetail, AppError> {
        let customer = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.ensure_can_access(actor, &customer)?;

        let notes = self.repo.list_notes(id).await?;
        let visits = self.visit_repo.list_ids_for_customer(id).await?;

        Ok(CustomerDetail {
            customer,
            notes,
            visits,
        })
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateCustomerPayload,
    ) -> Result<Customer, AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.ensure_can_access(actor, &current)?;

        // O recálculo do vencimento roda em TODO caminho de escrita: usa a
        // data nova quando presente, senão a já persistida.
        let now = Utc::now();
        let effective_follow_up = payload
            .next_follow_up_date
            .or(current.next_follow_up_date);
        let is_due = lifecycle::follow_up_due(effective_follow_up, now);

        let mut customer = self.repo.update(id, &payload, is_due).await?;

        // Reatribuição embutida no update genérico
        if let Some(agent_id) = payload.assigned_agent {
            customer = self.reassign(actor, customer, agent_id).await?;
        }

        // Venda concluída: transição PARA closed_won
        if let Some(new_status) = payload.status {
            if lifecycle::deal_closed(current.status, new_status) {
                if let Some(agent_id) = customer.assigned_agent {
                    let amount = payload
                        .deal_amount
                        .or_else(|| customer.budget.as_ref().and_then(|b| b.0.max));
                    self.notifier.notify(NotificationEvent::DealClosed {
                        customer_id: customer.id,
                        customer_name: display_name(&customer),
                        agent_id,
                        amount,
                    });
                }
            }
        }

        Ok(customer)
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem excluir clientes.".into(),
            ));
        }
        self.repo.delete(id).await
    }

    // =========================================================================
    //  ATRIBUIÇÃO
    // =========================================================================

    pub async fn assign_agent(
        &self,
        actor: &User,
        id: Uuid,
        agent_id: Uuid,
    ) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.ensure_can_access(actor, &customer)?;
        self.reassign(actor, customer, agent_id).await
    }

    /// Núcleo da atribuição: escrita dupla + moved_from + eventos.
    async fn reassign(
        &self,
        actor: &User,
        customer: Customer,
        agent_id: Uuid,
    ) -> Result<Customer, AppError> {
        self.ensure_agent_exists(agent_id).await?;

        match lifecycle::plan_reassignment(customer.assigned_agent, agent_id, actor.id, Utc::now())
        {
            // Mesmo agente: nada a escrever, nada a notificar
            Reassignment::NoChange => Ok(customer),
            Reassignment::Assign { moved_from } => {
                let previous = customer.assigned_agent;
                let updated = self
                    .repo
                    .set_assigned_agent(customer.id, agent_id, moved_from.as_ref())
                    .await?;

                if let Some(previous_agent) = previous {
                    self.user_repo
                        .remove_assigned_customer(previous_agent, updated.id)
                        .await?;
                }
                self.user_repo
                    .append_assigned_customer(agent_id, updated.id)
                    .await?;

                self.emit_assignment_events(&updated, agent_id);
                Ok(updated)
            }
        }
    }

    fn emit_assignment_events(&self, customer: &Customer, agent_id: Uuid) {
        self.notifier.notify(NotificationEvent::CustomerAssigned {
            customer_id: customer.id,
            customer_name: display_name(customer),
            agent_id,
        });
        if lifecycle::is_high_value(customer.budget.as_ref().map(|b| &b.0)) {
            if let Some(max) = customer.budget.as_ref().and_then(|b| b.0.max) {
                self.notifier.notify(NotificationEvent::HighValueLead {
                    customer_id: customer.id,
                    customer_name: display_name(customer),
                    agent_id,
                    budget_max: max,
                });
            }
        }
    }

    pub async fn move_customer(
        &self,
        actor: &User,
        id: Uuid,
        payload: MoveCustomerPayload,
    ) -> Result<Customer, AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.ensure_can_access(actor, &current)?;

        let mut customer = self
            .repo
            .update_region(id, payload.zone.as_deref(), payload.thana.as_deref())
            .await?;

        if let Some(agent_id) = payload.agent_id {
            customer = self.reassign(actor, customer, agent_id).await?;
        }
        Ok(customer)
    }

    // =========================================================================
    //  NOTAS E FOLLOW-UP
    // =========================================================================

    pub async fn add_note(
        &self,
        actor: &User,
        id: Uuid,
        payload: AddNotePayload,
    ) -> Result<CustomerNote, AppError> {
        let customer = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.ensure_can_access(actor, &customer)?;

        let note = self.repo.add_note(id, &payload, actor.id).await?;

        // A nota pode reagendar o follow-up do cliente
        if let Some(next) = payload.next_follow_up_date {
            let is_due = lifecycle::follow_up_due(Some(next), Utc::now());
            self.repo.set_follow_up(id, next, is_due).await?;
        }

        self.notifier.notify(NotificationEvent::CustomerNote {
            customer_id: customer.id,
            customer_name: display_name(&customer),
            author_id: actor.id,
            assigned_agent: customer.assigned_agent,
            note: note.text.clone(),
        });

        Ok(note)
    }

    pub async fn due_follow_ups(&self, actor: &User) -> Result<Vec<Customer>, AppError> {
        let restriction = if actor.role.is_admin() {
            None
        } else {
            Some(actor.id)
        };
        self.repo.list_due_follow_ups(restriction).await
    }

    pub async fn due_follow_ups_count(&self, actor: &User) -> Result<i64, AppError> {
        let restriction = if actor.role.is_admin() {
            None
        } else {
            Some(actor.id)
        };
        self.repo.count_due_follow_ups(restriction).await
    }

    /// Chamador externo reporta follow-up vencido → evento deduplicado.
    pub async fn report_missed_followup(&self, customer_id: Uuid) -> Result<(), AppError> {
        let customer = self
            .repo
            .find_by_id(customer_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;
        self.notifier.notify(NotificationEvent::MissedFollowUp {
            customer_id: customer.id,
            customer_name: display_name(&customer),
        });
        Ok(())
    }

    // =========================================================================
    //  FECHAMENTO PELO AGENTE
    // =========================================================================

    pub async fn agent_close(
        &self,
        actor: &User,
        id: Uuid,
        payload: AgentClosePayload,
    ) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        // Permitido: agente atribuído, agente que cadastrou, ou admin
        let allowed = actor.role.is_admin()
            || customer.assigned_agent == Some(actor.id)
            || customer.added_by == actor.id;
        if !allowed {
            return Err(AppError::Forbidden(
                "Você não pode fechar este cliente.".into(),
            ));
        }

        self.repo
            .agent_close(id, actor.id, payload.reason.as_deref())
            .await
    }

    pub async fn reopen(&self, actor: &User, id: Uuid) -> Result<Customer, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem reabrir clientes.".into(),
            ));
        }
        self.repo.reopen(id).await
    }

    // =========================================================================
    //  LISTAGENS ESPECIAIS
    // =========================================================================

    pub async fn my_customers(&self, actor: &User) -> Result<Vec<Customer>, AppError> {
        self.repo
            .list(&CustomerListQuery::default(), Some(actor.id))
            .await
    }

    /// Clientes de outros agentes — exclui deliberadamente os do chamador.
    pub async fn foreign_customers(&self, actor: &User) -> Result<Vec<Customer>, AppError> {
        self.repo.list_foreign(actor.id).await
    }

    async fn ensure_agent_exists(&self, agent_id: Uuid) -> Result<(), AppError> {
        self.user_repo
            .find_by_id(agent_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AppError::NotFound("Agente"))?;
        Ok(())
    }
}

fn display_name(customer: &Customer) -> String {
    customer
        .name
        .clone()
        .unwrap_or_else(|| customer.phone.clone())
}

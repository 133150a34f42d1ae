// src/services/visit_service.rs

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CustomerRepository, SequenceRepository, VisitRepository},
    models::{
        auth::User,
        visit::{
            CreateVisitPayload, UpdateVisitPayload, Visit, VisitListQuery, VisitStats,
            VisitStatus,
        },
    },
    services::codes,
};

#[derive(Clone)]
pub struct VisitService {
    repo: VisitRepository,
    customer_repo: CustomerRepository,
    sequence_repo: SequenceRepository,
}

impl VisitService {
    pub fn new(
        repo: VisitRepository,
        customer_repo: CustomerRepository,
        sequence_repo: SequenceRepository,
    ) -> Self {
        Self {
            repo,
            customer_repo,
            sequence_repo,
        }
    }

    fn ensure_can_access(&self, actor: &User, visit: &Visit) -> Result<(), AppError> {
        if actor.role.is_admin() || visit.agent_id == actor.id {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Você não tem acesso a esta visita.".into(),
        ))
    }

    pub async fn create(&self, actor: &User, payload: CreateVisitPayload) -> Result<Visit, AppError> {
        let customer = self
            .customer_repo
            .find_by_id(payload.customer_id)
            .await?
            .ok_or(AppError::NotFound("Cliente"))?;

        // Sequência diária: o escopo muda a cada dia-calendário
        let today = Utc::now().date_naive();
        let seq = self
            .sequence_repo
            .next_value(&codes::visit_code_scope(today), 1)
            .await?;
        let visit_code = codes::format_visit_code(today, seq);

        let visit = self.repo.create(&visit_code, &payload, actor.id).await?;

        // Visita já concluída na criação propaga para o cliente
        if visit.status == VisitStatus::Completed {
            self.propagate_completion(&visit).await?;
        }

        tracing::info!(
            "📅 Visita {} registrada para o cliente {}",
            visit.visit_code,
            customer.id
        );
        Ok(visit)
    }

    pub async fn list(&self, actor: &User, query: &VisitListQuery) -> Result<Vec<Visit>, AppError> {
        let restriction = if actor.role.is_admin() {
            None
        } else {
            Some(actor.id)
        };
        self.repo.list(query, restriction).await
    }

    pub async fn get(&self, actor: &User, id: Uuid) -> Result<Visit, AppError> {
        let visit = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Visita"))?;
        self.ensure_can_access(actor, &visit)?;
        Ok(visit)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdateVisitPayload,
    ) -> Result<Visit, AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Visita"))?;
        self.ensure_can_access(actor, &current)?;

        let updated = self.repo.update(id, &payload).await?;

        // Conclusão via update também dispara a propagação
        if current.status != VisitStatus::Completed && updated.status == VisitStatus::Completed {
            self.propagate_completion(&updated).await?;
        }

        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        let visit = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Visita"))?;
        self.ensure_can_access(actor, &visit)?;
        // O cascade remove o id do visits[] derivado do cliente
        self.repo.delete(id).await
    }

    /// Visita concluída: cliente vai para visit-done e herda o follow-up
    /// da visita, quando presente.
    async fn propagate_completion(&self, visit: &Visit) -> Result<(), AppError> {
        self.customer_repo
            .apply_completed_visit(
                visit.customer_id,
                visit.next_follow_up,
                visit.follow_up_action.as_deref(),
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    //  ESTATÍSTICAS
    // =========================================================================

    fn stats_scope(&self, actor: &User) -> Option<Uuid> {
        if actor.role.is_admin() {
            None
        } else {
            Some(actor.id)
        }
    }

    pub async fn stats_today(&self, actor: &User) -> Result<VisitStats, AppError> {
        self.repo.stats_today(self.stats_scope(actor)).await
    }

    pub async fn stats_monthly(&self, actor: &User) -> Result<VisitStats, AppError> {
        self.repo.stats_monthly(self.stats_scope(actor)).await
    }

    pub async fn stats_total(&self, actor: &User) -> Result<VisitStats, AppError> {
        self.repo.stats_total(self.stats_scope(actor)).await
    }
}

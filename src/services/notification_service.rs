// src/services/notification_service.rs
//
// Emissor de eventos de notificação. Os serviços primários chamam
// `notify()` e seguem em frente: a entrega roda em uma task separada e
// uma falha aqui jamais derruba a escrita que a originou.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{NotificationRepository, UserRepository},
    models::{
        auth::UserRole,
        customer::Priority,
        notification::{NotificationType, RelatedEntity},
    },
};

// Eventos tipados, um por gatilho da tabela de emissão.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// Agente criou cliente sem agente atribuído → admins/super-admins.
    CustomerAddedUnassigned {
        customer_id: Uuid,
        customer_name: String,
    },
    /// assignedAgent definido ou trocado → o novo agente.
    CustomerAssigned {
        customer_id: Uuid,
        customer_name: String,
        agent_id: Uuid,
    },
    /// Atribuído E budget.max >= 500k → o agente.
    HighValueLead {
        customer_id: Uuid,
        customer_name: String,
        agent_id: Uuid,
        budget_max: Decimal,
    },
    /// Transição para closed_won → o agente (valor do negócio anexado).
    DealClosed {
        customer_id: Uuid,
        customer_name: String,
        agent_id: Uuid,
        amount: Option<Decimal>,
    },
    /// Nota adicionada → agente atribuído (se não for o autor) +
    /// admins/super-admins (excluindo o autor).
    CustomerNote {
        customer_id: Uuid,
        customer_name: String,
        author_id: Uuid,
        assigned_agent: Option<Uuid>,
        note: String,
    },
    /// Imóvel criado → broadcast para toda a equipe ativa.
    PropertyAdded {
        property_id: Uuid,
        property_code: String,
        name: String,
    },
    PropertyAssigned {
        property_id: Uuid,
        name: String,
        agent_id: Uuid,
    },
    PropertySold {
        property_id: Uuid,
        name: String,
    },
    /// Follow-up vencido reportado → super-admins, com deduplicação de 24h.
    MissedFollowUp {
        customer_id: Uuid,
        customer_name: String,
    },
}

#[derive(Clone)]
pub struct Notifier {
    user_repo: UserRepository,
    notification_repo: NotificationRepository,
}

impl Notifier {
    pub fn new(user_repo: UserRepository, notification_repo: NotificationRepository) -> Self {
        Self {
            user_repo,
            notification_repo,
        }
    }

    /// Dispara e esquece. A task loga falhas e nunca as propaga.
    pub fn notify(&self, event: NotificationEvent) {
        let emitter = self.clone();
        tokio::spawn(async move {
            if let Err(e) = emitter.dispatch(event).await {
                tracing::warn!("📣 Falha ao emitir notificação (ignorada): {}", e);
            }
        });
    }

    /// Entrega síncrona, usada pela task e pelos testes de integração.
    pub async fn dispatch(&self, event: NotificationEvent) -> Result<u64, AppError> {
        match event {
            NotificationEvent::CustomerAddedUnassigned {
                customer_id,
                customer_name,
            } => {
                let admins = self.admin_ids().await?;
                self.insert(
                    &admins,
                    NotificationType::CustomerAdded,
                    "Novo cliente sem agente",
                    &format!("O cliente '{}' foi cadastrado sem agente atribuído.", customer_name),
                    Priority::Medium,
                    Some(related("customer", customer_id)),
                    Some(format!("/customers/{}", customer_id)),
                    None,
                )
                .await
            }

            NotificationEvent::CustomerAssigned {
                customer_id,
                customer_name,
                agent_id,
            } => {
                self.insert(
                    &[agent_id],
                    NotificationType::CustomerAssigned,
                    "Cliente atribuído a você",
                    &format!("O cliente '{}' foi atribuído a você.", customer_name),
                    Priority::Medium,
                    Some(related("customer", customer_id)),
                    Some(format!("/customers/{}", customer_id)),
                    None,
                )
                .await
            }

            NotificationEvent::HighValueLead {
                customer_id,
                customer_name,
                agent_id,
                budget_max,
            } => {
                self.insert(
                    &[agent_id],
                    NotificationType::HighValueLead,
                    "Lead de alto valor",
                    &format!(
                        "O cliente '{}' tem orçamento de até {}.",
                        customer_name, budget_max
                    ),
                    Priority::High,
                    Some(related("customer", customer_id)),
                    Some(format!("/customers/{}", customer_id)),
                    Some(json!({ "budgetMax": budget_max })),
                )
                .await
            }

            NotificationEvent::DealClosed {
                customer_id,
                customer_name,
                agent_id,
                amount,
            } => {
                self.insert(
                    &[agent_id],
                    NotificationType::DealClosed,
                    "Negócio fechado",
                    &format!("O negócio com '{}' foi fechado.", customer_name),
                    Priority::High,
                    Some(related("customer", customer_id)),
                    Some(format!("/customers/{}", customer_id)),
                    Some(json!({ "dealAmount": amount })),
                )
                .await
            }

            NotificationEvent::CustomerNote {
                customer_id,
                customer_name,
                author_id,
                assigned_agent,
                note,
            } => {
                let recipients =
                    note_recipients(self.admin_ids().await?, assigned_agent, author_id);

                self.insert(
                    &recipients,
                    NotificationType::CustomerMessage,
                    &format!("Nova nota em '{}'", customer_name),
                    &note,
                    Priority::Low,
                    Some(related("customer", customer_id)),
                    Some(format!("/customers/{}", customer_id)),
                    None,
                )
                .await
            }

            NotificationEvent::PropertyAdded {
                property_id,
                property_code,
                name,
            } => {
                let staff = self
                    .user_repo
                    .list_active_by_roles(&[UserRole::Agent, UserRole::Admin, UserRole::SuperAdmin])
                    .await?;
                let recipients: Vec<Uuid> = staff.iter().map(|u| u.id).collect();
                self.insert(
                    &recipients,
                    NotificationType::PropertyAdded,
                    "Novo imóvel cadastrado",
                    &format!("O imóvel '{}' ({}) está disponível.", name, property_code),
                    Priority::Low,
                    Some(related("property", property_id)),
                    Some(format!("/properties/{}", property_id)),
                    None,
                )
                .await
            }

            NotificationEvent::PropertyAssigned {
                property_id,
                name,
                agent_id,
            } => {
                self.insert(
                    &[agent_id],
                    NotificationType::PropertyAssigned,
                    "Imóvel atribuído a você",
                    &format!("O imóvel '{}' foi atribuído a você.", name),
                    Priority::Medium,
                    Some(related("property", property_id)),
                    Some(format!("/properties/{}", property_id)),
                    None,
                )
                .await
            }

            NotificationEvent::PropertySold { property_id, name } => {
                let admins = self.admin_ids().await?;
                self.insert(
                    &admins,
                    NotificationType::PropertySold,
                    "Imóvel vendido",
                    &format!("O imóvel '{}' foi marcado como vendido.", name),
                    Priority::Medium,
                    Some(related("property", property_id)),
                    Some(format!("/properties/{}", property_id)),
                    None,
                )
                .await
            }

            NotificationEvent::MissedFollowUp {
                customer_id,
                customer_name,
            } => {
                // Evento ruidoso: suprime se já notificamos a mesma entidade
                // nas últimas 24 horas. A checagem e a inserção não são
                // atômicas: dois reports quase simultâneos podem passar
                // ambos pela janela; chamadas sequenciais deduplicam.
                let last = self
                    .notification_repo
                    .last_emitted_for_entity(NotificationType::MissedFollowup, customer_id)
                    .await?;
                if suppress_as_duplicate(last, Utc::now()) {
                    tracing::debug!(
                        "Follow-up perdido de {} já notificado nas últimas 24h, suprimido.",
                        customer_id
                    );
                    return Ok(0);
                }

                let supers = self
                    .user_repo
                    .list_active_by_roles(&[UserRole::SuperAdmin])
                    .await?;
                let recipients: Vec<Uuid> = supers.iter().map(|u| u.id).collect();
                self.insert(
                    &recipients,
                    NotificationType::MissedFollowup,
                    "Follow-up perdido",
                    &format!("O follow-up do cliente '{}' está vencido.", customer_name),
                    Priority::High,
                    Some(related("customer", customer_id)),
                    Some(format!("/customers/{}", customer_id)),
                    None,
                )
                .await
            }
        }
    }

    async fn admin_ids(&self) -> Result<Vec<Uuid>, AppError> {
        let admins = self
            .user_repo
            .list_active_by_roles(&[UserRole::Admin, UserRole::SuperAdmin])
            .await?;
        Ok(admins.iter().map(|u| u.id).collect())
    }

    #[allow(clippy::too_many_arguments)]
    async fn insert(
        &self,
        recipients: &[Uuid],
        notification_type: NotificationType,
        title: &str,
        message: &str,
        priority: Priority,
        related_entity: Option<RelatedEntity>,
        action_url: Option<String>,
        metadata: Option<serde_json::Value>,
    ) -> Result<u64, AppError> {
        if recipients.is_empty() {
            return Ok(0);
        }
        self.notification_repo
            .insert_for_recipients(
                recipients,
                notification_type,
                title,
                message,
                priority,
                related_entity.as_ref(),
                action_url.as_deref(),
                metadata.as_ref(),
            )
            .await
    }
}

fn related(entity_type: &str, entity_id: Uuid) -> RelatedEntity {
    RelatedEntity {
        entity_type: entity_type.to_owned(),
        entity_id,
    }
}

/// Destinatários de uma nota: administração + agente atribuído, sem
/// duplicatas; o autor nunca é notificado da própria nota.
fn note_recipients(
    admins: Vec<Uuid>,
    assigned_agent: Option<Uuid>,
    author_id: Uuid,
) -> Vec<Uuid> {
    let mut recipients = admins;
    if let Some(agent) = assigned_agent {
        recipients.push(agent);
    }
    recipients.retain(|id| *id != author_id);
    recipients.sort();
    recipients.dedup();
    recipients
}

/// Janela de supressão de 24 horas por entidade para eventos ruidosos.
fn suppress_as_duplicate(last_emitted: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    matches!(last_emitted, Some(t) if now - t < Duration::hours(24))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autor_da_nota_nunca_e_notificado() {
        let admin_a = Uuid::new_v4();
        let admin_b = Uuid::new_v4();
        let agent = Uuid::new_v4();

        // Autor é um dos admins: sai da lista, o agente entra
        let recipients = note_recipients(vec![admin_a, admin_b], Some(agent), admin_b);
        assert!(!recipients.contains(&admin_b));
        assert!(recipients.contains(&admin_a));
        assert!(recipients.contains(&agent));
        assert_eq!(recipients.len(), 2);
    }

    #[test]
    fn agente_autor_nao_recebe_a_propria_nota() {
        let admin = Uuid::new_v4();
        let agent = Uuid::new_v4();
        let recipients = note_recipients(vec![admin], Some(agent), agent);
        assert_eq!(recipients, vec![admin]);
    }

    #[test]
    fn agente_que_tambem_e_admin_recebe_uma_vez() {
        let author = Uuid::new_v4();
        let agent_admin = Uuid::new_v4();
        let recipients = note_recipients(vec![agent_admin], Some(agent_admin), author);
        assert_eq!(recipients, vec![agent_admin]);
    }

    #[test]
    fn cliente_sem_agente_notifica_so_a_administracao() {
        let admin = Uuid::new_v4();
        let author = Uuid::new_v4();
        let recipients = note_recipients(vec![admin], None, author);
        assert_eq!(recipients, vec![admin]);
    }

    #[test]
    fn supressao_cobre_so_as_ultimas_24_horas() {
        let now = Utc::now();
        assert!(!suppress_as_duplicate(None, now));
        assert!(suppress_as_duplicate(Some(now - Duration::hours(1)), now));
        assert!(suppress_as_duplicate(Some(now - Duration::hours(23)), now));
        assert!(!suppress_as_duplicate(Some(now - Duration::hours(25)), now));
    }
}

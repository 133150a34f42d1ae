// src/services/property_service.rs

use chrono::Utc;
use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{PropertyRepository, SequenceRepository, UserRepository},
    models::{
        auth::{User, UserRole},
        property::{
            CreatePropertyForm, Property, PropertyListQuery, PropertyState, PropertyStatus,
            PropertyType, UpdatePropertyPayload,
        },
    },
    services::{
        codes,
        notification_service::{NotificationEvent, Notifier},
    },
};

// Imagem exibida quando o anúncio não traz nenhuma
const PLACEHOLDER_IMAGE: &str = "/uploads/properties/placeholder.jpg";

#[derive(Clone)]
pub struct PropertyService {
    repo: PropertyRepository,
    user_repo: UserRepository,
    sequence_repo: SequenceRepository,
    notifier: Notifier,
    code_prefix: String,
}

impl PropertyService {
    pub fn new(
        repo: PropertyRepository,
        user_repo: UserRepository,
        sequence_repo: SequenceRepository,
        notifier: Notifier,
        code_prefix: String,
    ) -> Self {
        Self {
            repo,
            user_repo,
            sequence_repo,
            notifier,
            code_prefix,
        }
    }

    fn ensure_can_modify(&self, actor: &User, property: &Property) -> Result<(), AppError> {
        if actor.role.is_admin() {
            return Ok(());
        }
        if property.assigned_agent == Some(actor.id) || property.uploaded_by == actor.id {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "Você não tem acesso a este imóvel.".into(),
        ))
    }

    /// Código gerado apenas quando ausente, nunca regenerado. Se o contador
    /// falhar, cai no código de contingência (tempo + aleatório).
    async fn next_property_code(&self) -> String {
        match self
            .sequence_repo
            .next_value(&self.code_prefix, codes::PROPERTY_CODE_START)
            .await
        {
            Ok(n) => codes::format_property_code(&self.code_prefix, n),
            Err(e) => {
                tracing::warn!("Contador de códigos falhou, usando contingência: {}", e);
                let random: u32 = rand::thread_rng().gen_range(0..1000);
                codes::fallback_property_code(
                    &self.code_prefix,
                    Utc::now().timestamp(),
                    random,
                )
            }
        }
    }

    pub async fn create(
        &self,
        actor: &User,
        form: CreatePropertyForm,
    ) -> Result<Property, AppError> {
        let name = form
            .name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("O nome do imóvel é obrigatório.".into()))?;

        let price = form.price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(AppError::BadRequest("O preço não pode ser negativo.".into()));
        }
        if let Some(sq) = form.square_feet {
            if sq < 0 {
                return Err(AppError::BadRequest(
                    "A metragem não pode ser negativa.".into(),
                ));
            }
        }

        if let Some(agent_id) = form.assigned_agent {
            self.ensure_agent_exists(agent_id).await?;
        }

        let property_code = match &form.property_code {
            Some(code) if !code.trim().is_empty() => code.trim().to_owned(),
            _ => self.next_property_code().await,
        };

        let images = if form.images.is_empty() {
            vec![PLACEHOLDER_IMAGE.to_owned()]
        } else {
            form.images.clone()
        };

        let property = self
            .repo
            .create(
                &property_code,
                name,
                form.description.as_deref(),
                price,
                form.location.as_deref(),
                form.zone.as_deref(),
                form.thana.as_deref(),
                form.area.as_deref(),
                form.address.as_deref(),
                form.city.as_deref(),
                form.state.unwrap_or(PropertyState::Sell),
                form.property_type.unwrap_or(PropertyType::Apartment),
                form.square_feet,
                form.bedrooms,
                form.bathrooms,
                &images,
                &form.features,
                actor.id,
                form.assigned_agent,
            )
            .await?;

        // Broadcast: um registro por membro ativo da equipe
        self.notifier.notify(NotificationEvent::PropertyAdded {
            property_id: property.id,
            property_code: property.property_code.clone(),
            name: property.name.clone(),
        });

        if let Some(agent_id) = property.assigned_agent {
            self.user_repo
                .append_assigned_property(agent_id, property.id)
                .await?;
            self.notifier.notify(NotificationEvent::PropertyAssigned {
                property_id: property.id,
                name: property.name.clone(),
                agent_id,
            });
        }

        Ok(property)
    }

    pub async fn list(&self, query: &PropertyListQuery) -> Result<Vec<Property>, AppError> {
        self.repo.list(query).await
    }

    /// O detalhe incrementa o contador de visualizações (monotônico).
    pub async fn get(&self, id: Uuid) -> Result<Property, AppError> {
        self.repo
            .find_and_count_view(id)
            .await?
            .ok_or(AppError::NotFound("Imóvel"))
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        payload: UpdatePropertyPayload,
    ) -> Result<Property, AppError> {
        let current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Imóvel"))?;
        self.ensure_can_modify(actor, &current)?;

        if let Some(price) = payload.price {
            if price < Decimal::ZERO {
                return Err(AppError::BadRequest("O preço não pode ser negativo.".into()));
            }
        }

        // Normalizadores tolerantes: "sale" -> sell, caixa livre na categoria
        let state = match payload.state.as_deref() {
            Some(raw) => Some(PropertyState::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("Estado de imóvel inválido: '{}'.", raw))
            })?),
            None => None,
        };
        let property_type = match payload.property_type.as_deref() {
            Some(raw) => Some(PropertyType::parse(raw).ok_or_else(|| {
                AppError::BadRequest(format!("Categoria de imóvel inválida: '{}'.", raw))
            })?),
            None => None,
        };

        let updated = self
            .repo
            .update(
                id,
                payload.name.as_deref(),
                payload.description.as_deref(),
                payload.price,
                payload.location.as_deref(),
                payload.zone.as_deref(),
                payload.thana.as_deref(),
                payload.area.as_deref(),
                payload.address.as_deref(),
                payload.city.as_deref(),
                state,
                property_type,
                payload.square_feet,
                payload.bedrooms,
                payload.bathrooms,
                payload.images.as_deref(),
                payload.features.as_deref(),
                payload.status,
                payload.is_published,
            )
            .await?;

        // Transição para vendido notifica a administração
        if current.status != PropertyStatus::Sold && updated.status == PropertyStatus::Sold {
            self.notifier.notify(NotificationEvent::PropertySold {
                property_id: updated.id,
                name: updated.name.clone(),
            });
        }

        Ok(updated)
    }

    pub async fn set_published(
        &self,
        actor: &User,
        id: Uuid,
        published: bool,
    ) -> Result<Property, AppError> {
        if !actor.role.is_admin() {
            return Err(AppError::Forbidden(
                "Apenas administradores podem publicar imóveis.".into(),
            ));
        }
        self.repo.set_published(id, published).await
    }

    pub async fn assign_agent(
        &self,
        actor: &User,
        id: Uuid,
        agent_id: Uuid,
    ) -> Result<Property, AppError> {
        let property = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound("Imóvel"))?;
        self.ensure_can_modify(actor, &property)?;
        self.ensure_agent_exists(agent_id).await?;

        // Mesmo agente: insert idempotente, sem nova notificação
        if property.assigned_agent == Some(agent_id) {
            return Ok(property);
        }

        let updated = self.repo.set_assigned_agent(id, agent_id).await?;

        if let Some(previous) = property.assigned_agent {
            self.user_repo
                .remove_assigned_property(previous, id)
                .await?;
        }
        self.user_repo
            .append_assigned_property(agent_id, id)
            .await?;

        self.notifier.notify(NotificationEvent::PropertyAssigned {
            property_id: updated.id,
            name: updated.name.clone(),
            agent_id,
        });

        Ok(updated)
    }

    /// Exclusão restrita ao super-admin.
    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<(), AppError> {
        if actor.role != UserRole::SuperAdmin {
            return Err(AppError::Forbidden(
                "Apenas o super-admin pode excluir imóveis.".into(),
            ));
        }
        self.repo.delete(id).await
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

// src/services/lifecycle.rs
//
// A máquina de estados do lead, consolidada em um único lugar. Os
// endpoints mutantes chamam estas funções puras para derivar campos e
// decidir quais eventos emitir; nenhuma delas toca o banco.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    auth::UserRole,
    customer::{Budget, CustomerStatus, MovedFrom},
};

/// Orçamento máximo a partir do qual um lead é "high value".
pub fn high_value_threshold() -> Decimal {
    Decimal::from(500_000_i64)
}

/// Derivação central: o follow-up está vencido?
/// Falso quando não há data agendada.
pub fn follow_up_due(next_follow_up_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match next_follow_up_date {
        Some(date) => date <= now,
        None => false,
    }
}

pub fn is_high_value(budget: Option<&Budget>) -> bool {
    budget
        .and_then(|b| b.max)
        .map(|max| max >= high_value_threshold())
        .unwrap_or(false)
}

/// O sinal de venda concluída é a transição PARA `closed_won` —
/// distinto de `closed`, que é rejeição pelo agente.
pub fn deal_closed(old: CustomerStatus, new: CustomerStatus) -> bool {
    old != CustomerStatus::ClosedWon && new == CustomerStatus::ClosedWon
}

/// Cliente criado sem agente só vira alerta quando quem criou foi um
/// agente; a administração não notifica a si mesma.
pub fn announce_unassigned(creator_role: UserRole) -> bool {
    !creator_role.is_admin()
}

/// Plano de reatribuição de agente.
#[derive(Debug, PartialEq)]
pub enum Reassignment {
    /// Mesmo agente: nenhuma escrita (nem moved_from, nem coleção reversa).
    NoChange,
    /// Troca real; `moved_from` presente quando havia agente anterior.
    Assign { moved_from: Option<MovedFrom> },
}

pub fn plan_reassignment(
    current_agent: Option<Uuid>,
    new_agent: Uuid,
    actor: Uuid,
    now: DateTime<Utc>,
) -> Reassignment {
    match current_agent {
        Some(current) if current == new_agent => Reassignment::NoChange,
        Some(previous) => Reassignment::Assign {
            moved_from: Some(MovedFrom {
                agent: previous,
                moved_at: now,
                moved_by: actor,
            }),
        },
        None => Reassignment::Assign { moved_from: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn budget(max: i64) -> Budget {
        Budget {
            min: None,
            max: Some(Decimal::from(max)),
        }
    }

    #[test]
    fn follow_up_vencido_apenas_com_data_passada() {
        let now = Utc::now();
        assert!(!follow_up_due(None, now));
        assert!(!follow_up_due(Some(now + Duration::days(1)), now));
        assert!(follow_up_due(Some(now - Duration::hours(1)), now));
        // Limite inclusivo: date == now conta como vencido
        assert!(follow_up_due(Some(now), now));
    }

    #[test]
    fn high_value_no_limiar_de_500_mil() {
        assert!(is_high_value(Some(&budget(500_000))));
        assert!(is_high_value(Some(&budget(900_000))));
        assert!(!is_high_value(Some(&budget(100_000))));
        assert!(!is_high_value(Some(&Budget { min: None, max: None })));
        assert!(!is_high_value(None));
    }

    #[test]
    fn deal_closed_e_a_transicao_para_closed_won() {
        assert!(deal_closed(CustomerStatus::Sellable, CustomerStatus::ClosedWon));
        assert!(deal_closed(CustomerStatus::New, CustomerStatus::ClosedWon));
        // Já estava em closed_won: não re-dispara
        assert!(!deal_closed(CustomerStatus::ClosedWon, CustomerStatus::ClosedWon));
        // Fechamento pelo agente não é venda
        assert!(!deal_closed(CustomerStatus::Sellable, CustomerStatus::Closed));
    }

    #[test]
    fn so_agente_dispara_alerta_de_cliente_sem_agente() {
        assert!(announce_unassigned(UserRole::Agent));
        assert!(!announce_unassigned(UserRole::Admin));
        assert!(!announce_unassigned(UserRole::SuperAdmin));
    }

    #[test]
    fn reatribuir_o_mesmo_agente_e_no_op() {
        let agent = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let plan = plan_reassignment(Some(agent), agent, actor, Utc::now());
        assert_eq!(plan, Reassignment::NoChange);
    }

    #[test]
    fn primeira_atribuicao_nao_gera_moved_from() {
        let plan = plan_reassignment(None, Uuid::new_v4(), Uuid::new_v4(), Utc::now());
        match plan {
            Reassignment::Assign { moved_from } => assert!(moved_from.is_none()),
            _ => panic!("esperava Assign"),
        }
    }

    #[test]
    fn troca_de_agente_retem_o_anterior_no_slot() {
        let previous = Uuid::new_v4();
        let next = Uuid::new_v4();
        let actor = Uuid::new_v4();
        let now = Utc::now();
        match plan_reassignment(Some(previous), next, actor, now) {
            Reassignment::Assign {
                moved_from: Some(m),
            } => {
                assert_eq!(m.agent, previous);
                assert_eq!(m.moved_by, actor);
                assert_eq!(m.moved_at, now);
            }
            other => panic!("esperava Assign com moved_from, veio {:?}", other),
        }
    }
}

//! Gate de elegibilidade do prestador
//!
//! Bloqueia prestadores inadimplentes ou sinalizados de aceitar novos
//! chamados. Consultado duas vezes por aceitação: no broadcast (barato,
//! pode estar defasado) e no claim (autoritativo, precisa estar fresco).

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::provider::{BlockReason, ProviderEligibility};
use crate::repositories::provider_repository::ProviderRepository;
use crate::utils::errors::AppError;

/// Resultado do gate para um prestador
#[derive(Debug, Clone, Serialize)]
pub struct EligibilityCheck {
    pub can_accept: bool,
    pub block_reason: BlockReason,
}

/// Situação de débito do prestador
#[derive(Debug, Clone, Serialize)]
pub struct DebtStatus {
    pub current_debt: Decimal,
    pub max_limit: Decimal,
}

/// Decisão pura sobre o read model do ledger
///
/// `can_accept` é falso se houver qualquer motivo de bloqueio OU se o
/// débito corrente exceder o limite, independentemente do motivo.
pub fn evaluate(eligibility: &ProviderEligibility) -> EligibilityCheck {
    if eligibility.block_reason != BlockReason::None {
        return EligibilityCheck {
            can_accept: false,
            block_reason: eligibility.block_reason,
        };
    }

    if eligibility.current_debt > eligibility.max_debt_limit {
        return EligibilityCheck {
            can_accept: false,
            block_reason: BlockReason::OverDebtLimit,
        };
    }

    EligibilityCheck {
        can_accept: true,
        block_reason: BlockReason::None,
    }
}

pub struct EligibilityService {
    repository: ProviderRepository,
}

impl EligibilityService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ProviderRepository::new(pool),
        }
    }

    pub async fn check_debt_limit(&self, provider_id: Uuid) -> Result<DebtStatus, AppError> {
        let eligibility = self
            .repository
            .find_eligibility(provider_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Eligibility ledger entry for provider '{}' not found",
                    provider_id
                ))
            })?;

        Ok(DebtStatus {
            current_debt: eligibility.current_debt,
            max_limit: eligibility.max_debt_limit,
        })
    }

    pub async fn check_can_accept(&self, provider_id: Uuid) -> Result<EligibilityCheck, AppError> {
        match self.repository.find_eligibility(provider_id).await? {
            Some(eligibility) => Ok(evaluate(&eligibility)),
            // Prestador ainda sem lançamento no ledger: sem débito e sem flags
            None => {
                log::warn!(
                    "Prestador {} sem lançamento no ledger de elegibilidade",
                    provider_id
                );
                Ok(EligibilityCheck {
                    can_accept: true,
                    block_reason: BlockReason::None,
                })
            }
        }
    }

    /// Gate autoritativo usado no momento do claim
    pub async fn ensure_can_accept(&self, provider_id: Uuid) -> Result<(), AppError> {
        let check = self.check_can_accept(provider_id).await?;
        if !check.can_accept {
            return Err(AppError::NotEligible {
                block_reason: check.block_reason,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn eligibility(debt: &str, limit: &str, reason: BlockReason) -> ProviderEligibility {
        ProviderEligibility {
            provider_id: Uuid::new_v4(),
            current_debt: debt.parse().unwrap(),
            max_debt_limit: limit.parse().unwrap(),
            block_reason: reason,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_evaluate_clean_provider_can_accept() {
        let check = evaluate(&eligibility("40.00", "100.00", BlockReason::None));
        assert!(check.can_accept);
        assert_eq!(check.block_reason, BlockReason::None);
    }

    #[test]
    fn test_evaluate_debt_at_limit_still_accepts() {
        let check = evaluate(&eligibility("100.00", "100.00", BlockReason::None));
        assert!(check.can_accept);
    }

    #[test]
    fn test_evaluate_over_debt_limit_blocks() {
        let check = evaluate(&eligibility("100.01", "100.00", BlockReason::None));
        assert!(!check.can_accept);
        assert_eq!(check.block_reason, BlockReason::OverDebtLimit);
    }

    #[test]
    fn test_evaluate_block_reason_always_blocks() {
        // Independente do débito estar dentro do limite
        for reason in [
            BlockReason::FinancialBlocked,
            BlockReason::FraudFlagged,
            BlockReason::PermanentlyBlocked,
            BlockReason::AdminBlocked,
        ] {
            let check = evaluate(&eligibility("0.00", "100.00", reason));
            assert!(!check.can_accept, "motivo {:?} deveria bloquear", reason);
            assert_eq!(check.block_reason, reason);
        }
    }

    #[test]
    fn test_block_reason_severity_ordering() {
        assert!(
            BlockReason::PermanentlyBlocked.severity() > BlockReason::FraudFlagged.severity()
        );
        assert!(BlockReason::AdminBlocked.severity() > BlockReason::FraudFlagged.severity());
        assert!(BlockReason::FraudFlagged.severity() > BlockReason::OverDebtLimit.severity());
        assert!(BlockReason::OverDebtLimit.severity() > BlockReason::None.severity());
        assert!(BlockReason::PermanentlyBlocked.is_terminal());
        assert!(!BlockReason::FinancialBlocked.is_terminal());
    }
}

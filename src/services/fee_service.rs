//! Serviço de comissão
//!
//! Cálculo puro da divisão de comissão e resolução centralizada do
//! percentual efetivo. O resultado é congelado no chamado no momento do
//! aceite; mudanças de configuração nunca alteram um chamado fechado.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::fee::{CommissionSource, FeeBreakdown, ProviderFeeConfig};
use crate::repositories::fee_repository::FeeRepository;
use crate::utils::errors::AppError;

/// Calcular a divisão de comissão para um valor e percentual
///
/// Entradas fora do intervalo retornam erro de validação: comissão mal
/// configurada bloqueia a liquidação, não vira default silencioso.
pub fn calculate_fee(amount: Decimal, percentage: Decimal) -> Result<FeeBreakdown, AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "Valor do serviço deve ser positivo: {}",
            amount
        )));
    }
    if percentage < Decimal::ZERO || percentage > Decimal::from(100) {
        return Err(AppError::Validation(format!(
            "Percentual de comissão fora do intervalo [0, 100]: {}",
            percentage
        )));
    }

    let fee_amount = (amount * percentage / Decimal::from(100))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    // O resto do arredondamento fica com o prestador: a soma fecha exata
    let provider_net_amount = amount - fee_amount;

    Ok(FeeBreakdown {
        service_value: amount,
        fee_percentage: percentage,
        fee_amount,
        provider_net_amount,
    })
}

/// Resolver o percentual efetivo para um prestador
///
/// Precedência, da maior para a menor: isenção ativa (força 0) >
/// promoção ativa > override individual > percentual global.
pub fn resolve_commission(
    global_percentage: Decimal,
    config: Option<&ProviderFeeConfig>,
    now: DateTime<Utc>,
) -> (Decimal, CommissionSource) {
    if let Some(cfg) = config {
        if let Some(until) = cfg.exemption_until {
            if until > now {
                return (Decimal::ZERO, CommissionSource::Exemption);
            }
        }
        if let (Some(pct), Some(ends_at)) = (cfg.promo_percentage, cfg.promo_ends_at) {
            if ends_at > now {
                return (pct, CommissionSource::Promotion);
            }
        }
        if let Some(pct) = cfg.individual_percentage {
            return (pct, CommissionSource::Individual);
        }
    }
    (global_percentage, CommissionSource::Global)
}

/// Serviço que resolve a configuração vigente e calcula a divisão
pub struct FeeService {
    repository: FeeRepository,
}

impl FeeService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: FeeRepository::new(pool),
        }
    }

    /// Resolver e calcular a comissão do prestador neste instante.
    /// Falha de configuração é um bloqueio duro da liquidação.
    pub async fn freeze_for(
        &self,
        provider_id: Uuid,
        amount: Decimal,
    ) -> Result<(FeeBreakdown, CommissionSource), AppError> {
        let settings = self.repository.find_settings().await?.ok_or_else(|| {
            AppError::Validation("Configuração global de comissão ausente".to_string())
        })?;
        let config = self.repository.find_provider_config(provider_id).await?;

        let (percentage, source) =
            resolve_commission(settings.global_percentage, config.as_ref(), Utc::now());
        let breakdown = calculate_fee(amount, percentage)?;

        Ok((breakdown, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn config(
        individual: Option<&str>,
        exemption_until: Option<DateTime<Utc>>,
        promo: Option<(&str, DateTime<Utc>)>,
    ) -> ProviderFeeConfig {
        ProviderFeeConfig {
            provider_id: Uuid::new_v4(),
            individual_percentage: individual.map(dec),
            exemption_until,
            promo_percentage: promo.map(|(p, _)| dec(p)),
            promo_ends_at: promo.map(|(_, ends)| ends),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_calculate_fee_basic_scenario() {
        // amount=200.00, percentage=15 -> fee=30.00, net=170.00
        let breakdown = calculate_fee(dec("200.00"), dec("15")).unwrap();
        assert_eq!(breakdown.fee_amount, dec("30.00"));
        assert_eq!(breakdown.provider_net_amount, dec("170.00"));
    }

    #[test]
    fn test_calculate_fee_sum_is_exact() {
        let amounts = ["200.00", "100.01", "0.01", "149.99", "333.33"];
        let percentages = ["0", "7.5", "15", "33.33", "50", "100"];

        for amount in amounts {
            for percentage in percentages {
                let breakdown = calculate_fee(dec(amount), dec(percentage)).unwrap();
                assert_eq!(
                    breakdown.fee_amount + breakdown.provider_net_amount,
                    dec(amount),
                    "soma não fecha para {} @ {}%",
                    amount,
                    percentage
                );
            }
        }
    }

    #[test]
    fn test_calculate_fee_rejects_invalid_inputs() {
        assert!(calculate_fee(dec("0"), dec("15")).is_err());
        assert!(calculate_fee(dec("-10"), dec("15")).is_err());
        assert!(calculate_fee(dec("100"), dec("-1")).is_err());
        assert!(calculate_fee(dec("100"), dec("100.01")).is_err());
    }

    #[test]
    fn test_calculate_fee_bounds() {
        let zero = calculate_fee(dec("80.00"), dec("0")).unwrap();
        assert_eq!(zero.fee_amount, dec("0.00"));
        assert_eq!(zero.provider_net_amount, dec("80.00"));

        let full = calculate_fee(dec("80.00"), dec("100")).unwrap();
        assert_eq!(full.fee_amount, dec("80.00"));
        assert_eq!(full.provider_net_amount, dec("0.00"));
    }

    #[test]
    fn test_resolve_commission_global_default() {
        let now = Utc::now();
        assert_eq!(
            resolve_commission(dec("15"), None, now),
            (dec("15"), CommissionSource::Global)
        );
        // Config sem nenhum override também cai no global
        let cfg = config(None, None, None);
        assert_eq!(
            resolve_commission(dec("15"), Some(&cfg), now),
            (dec("15"), CommissionSource::Global)
        );
    }

    #[test]
    fn test_resolve_commission_individual_override() {
        let now = Utc::now();
        let cfg = config(Some("10"), None, None);
        assert_eq!(
            resolve_commission(dec("15"), Some(&cfg), now),
            (dec("10"), CommissionSource::Individual)
        );
    }

    #[test]
    fn test_resolve_commission_promotion_beats_individual() {
        let now = Utc::now();
        let cfg = config(Some("10"), None, Some(("5", now + Duration::days(1))));
        assert_eq!(
            resolve_commission(dec("15"), Some(&cfg), now),
            (dec("5"), CommissionSource::Promotion)
        );
    }

    #[test]
    fn test_resolve_commission_exemption_beats_everything() {
        let now = Utc::now();
        let cfg = config(
            Some("10"),
            Some(now + Duration::days(30)),
            Some(("5", now + Duration::days(1))),
        );
        assert_eq!(
            resolve_commission(dec("15"), Some(&cfg), now),
            (Decimal::ZERO, CommissionSource::Exemption)
        );
    }

    #[test]
    fn test_resolve_commission_expired_overrides_are_ignored() {
        let now = Utc::now();
        let cfg = config(
            None,
            Some(now - Duration::days(1)),
            Some(("5", now - Duration::hours(1))),
        );
        assert_eq!(
            resolve_commission(dec("15"), Some(&cfg), now),
            (dec("15"), CommissionSource::Global)
        );
    }
}

use serde::Serialize;

use crate::core::{HorizonYears, Projection, ScenarioTier};

pub const UNREACHABLE_LABEL: &str = "nunca";

/// Copy for the result screen, chosen by tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Narrative {
    pub tone: &'static str,
    pub headline: String,
    pub subheadline: Option<String>,
    pub message: String,
    pub strategy: &'static str,
    pub offer: String,
    pub cta_label: &'static str,
    pub cta_href: &'static str,
}

/// Formats a horizon the way the result screen shows it: one decimal, comma
/// separator, `"nunca"` when the target is out of reach.
pub fn format_years(horizon: HorizonYears) -> String {
    match horizon.finite() {
        Some(years) => format!("{years:.1} anos").replace('.', ","),
        None => UNREACHABLE_LABEL.to_string(),
    }
}

pub fn narrative_for(projection: &Projection) -> Narrative {
    let name = projection.name.as_str();
    let result = &projection.result;
    let baseline = format_years(result.baseline_years);
    let optimized = format_years(result.optimized_years);

    match result.tier {
        ScenarioTier::Entry => Narrative {
            tone: "warning",
            headline: format!("{name}, atenção ao seu futuro."),
            subheadline: None,
            message: if result.baseline_years.is_unreachable() {
                "No seu ritmo atual, a liberdade financeira não chega.".to_string()
            } else {
                format!("No seu ritmo atual, a liberdade financeira pode demorar {baseline} para chegar.")
            },
            strategy: "Estratégia de Aceleração",
            offer: reduced_offer(result.optimized_years, &optimized),
            cta_label: "Acessar Plano de Aceleração",
            cta_href: "#offer-iniciante",
        },
        ScenarioTier::Investor => Narrative {
            tone: "celebration",
            headline: format!("Parabéns, {name}!"),
            subheadline: Some("Você está construindo um legado sólido.".to_string()),
            message: if result.baseline_years.is_unreachable() {
                "Sua projeção atual ainda não alcança o primeiro milhão.".to_string()
            } else {
                format!("Sua projeção aponta que você chegará lá em {baseline}.")
            },
            strategy: "Eficiência Tributária",
            offer: anticipated_offer(result.optimized_years, &optimized),
            cta_label: "Conhecer Mentoria Wealth",
            cta_href: "#offer-expert",
        },
    }
}

fn reduced_offer(optimized: HorizonYears, label: &str) -> String {
    if optimized.is_unreachable() {
        "Com uma Estratégia de Aceleração, você pode começar a construir esse caminho.".to_string()
    } else {
        format!("Com uma Estratégia de Aceleração, você poderia reduzir isso para apenas {label}.")
    }
}

fn anticipated_offer(optimized: HorizonYears, label: &str) -> String {
    if optimized.is_unreachable() {
        "Com Eficiência Tributária você pode colocar essa meta ao seu alcance.".to_string()
    } else {
        format!(
            "Mas sabia que com Eficiência Tributária você pode antecipar sua liberdade para {label}?"
        )
    }
}

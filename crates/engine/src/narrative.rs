use rust_decimal::Decimal;

// ---------------------------------------------------------------------------
// Narrative text
// ---------------------------------------------------------------------------
//
// All user-facing text lives here, isolated from the numeric engine.
// Everything is a pure function of the trace outcome, so the wording can
// change (or be localized) without touching the matching algorithm.

/// Outcome of one supplier's trace, carrying only the numbers the
/// narrative needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceOutcome {
    Reconciled,
    CreditShortfall { shortfall: Decimal, candidates: usize },
    OrphanedCredit { excess: Decimal, candidates: usize },
    Untraceable,
}

/// Format a decimal in Brazilian convention: `.` thousands separator,
/// `,` decimal separator, always two decimal places.
pub fn format_brl(value: Decimal) -> String {
    let rounded = value.round_dp(2);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let abs = rounded.abs();

    let text = format!("{abs:.2}");
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text, "00".to_string()),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

pub struct TraceFigures {
    pub credit_count: usize,
    pub total_credit: Decimal,
    pub debit_count: usize,
    pub total_debit: Decimal,
    pub financial_amount: Decimal,
    pub total_traced: Decimal,
}

/// Deterministic observation text: what was found and how the two sides
/// compare, plus the outcome-specific finding.
pub fn observation(figures: &TraceFigures, outcome: &TraceOutcome) -> String {
    let mut text = format!(
        "Encontrados {} lancamentos a credito somando R$ {} e {} a debito somando R$ {}. \
         Financeiro: R$ {}; rastreado no razao: R$ {}.",
        figures.credit_count,
        format_brl(figures.total_credit),
        figures.debit_count,
        format_brl(figures.total_debit),
        format_brl(figures.financial_amount),
        format_brl(figures.total_traced),
    );

    match outcome {
        TraceOutcome::Reconciled => {
            text.push_str(" Saldos conciliados.");
        }
        TraceOutcome::CreditShortfall {
            shortfall,
            candidates,
        } => {
            text.push_str(&format!(
                " Valor de R$ {} nao contabilizado no razao.",
                format_brl(*shortfall)
            ));
            if *candidates == 0 {
                // No ledger line to attach: the finding stands alone at
                // medium confidence.
                text.push_str(" Confianca MEDIA, sem lancamento associado.");
            }
        }
        TraceOutcome::OrphanedCredit { excess, .. } => {
            text.push_str(&format!(
                " Credito de R$ {} no razao sem contrapartida no financeiro.",
                format_brl(*excess)
            ));
        }
        TraceOutcome::Untraceable => {
            text.push_str(" Nenhum lancamento rastreavel para o fornecedor.");
        }
    }

    text
}

/// Deterministic action string selected by outcome case.
pub fn recommendation(outcome: &TraceOutcome) -> String {
    match outcome {
        TraceOutcome::Reconciled => "Saldos conciliam. Nenhuma acao necessaria.".to_string(),
        TraceOutcome::CreditShortfall {
            shortfall,
            candidates,
        } => {
            if *candidates > 0 {
                format!(
                    "Alerta: credito de R$ {} ausente para o fornecedor. {} lancamento(s) \
                     candidato(s) identificado(s) na conta; verificar atribuicao.",
                    format_brl(*shortfall),
                    candidates
                )
            } else {
                format!(
                    "Alerta: credito de R$ {} ausente para o fornecedor. Nenhum candidato \
                     identificado; verificar contabilizacao.",
                    format_brl(*shortfall)
                )
            }
        }
        TraceOutcome::OrphanedCredit { excess, .. } => format!(
            "Alerta: credito orfao de R$ {} no razao sem contrapartida financeira; \
             verificar baixa no financeiro.",
            format_brl(*excess)
        ),
        TraceOutcome::Untraceable => {
            "Diferenca nao rastreavel; revisar os extratos de origem.".to_string()
        }
    }
}

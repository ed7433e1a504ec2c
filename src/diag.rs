//! The stable diagnostic catalogue and its two locale renderings.
//!
//! Every checker in [`crate::validate`] and [`crate::tableau`] reports
//! failures as a [`Diagnostic`] rather than a formatted string, so the
//! identifier stays stable across locales; [`Diagnostic::message`] resolves
//! it to user-facing text only at the presentation boundary.

use crate::rule::RuleKind;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Locale {
    #[default]
    Pt,
    En,
}

impl std::str::FromStr for Locale {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pt" => Ok(Locale::Pt),
            "en" => Ok(Locale::En),
            other => Err(format!("unknown locale '{other}' (expected 'pt' or 'en')")),
        }
    }
}

/// A single accumulated failure. Construction never panics and never
/// unwinds the pipeline: every stage that can fail returns these in an
/// ordered `Vec` instead of short-circuiting the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    SyntaxError { line: u32, col: u32, detail: String },
    NonSequentialLineNumbering { line: u32, col: u32, expected: u32, found: u32 },
    InvalidInitialTableau { line: u32 },
    CloseBracketWithoutBox { line: u32, col: u32 },
    BoxMustBeDisposed { line: u32 },
    BoxMustBeDisposedByRule { line: u32 },
    ReferencedLineNotDefined { line: u32, reference: u32 },
    UsingDiscardedRule { line: u32, reference: u32 },
    AlreadyUsedRuleInBranch { line: u32, reference: u32 },
    PremiseShouldBeTrue { line: u32 },
    ConclusionShouldBeFalse { line: u32 },
    WrongTrueValue { line: u32 },
    RuleMustBeAlpha { line: u32 },
    RuleMustBeBeta { line: u32 },
    RuleCannotBeApplied { line: u32, reference: u32 },
    IsNotNegationTrue { line: u32, reference: u32 },
    IsNotNegationFalse { line: u32, reference: u32 },
    IsNotConjunctionTrue { line: u32, reference: u32 },
    IsNotConjunctionFalse { line: u32, reference: u32 },
    IsNotDisjunctionTrue { line: u32, reference: u32 },
    IsNotDisjunctionFalse { line: u32, reference: u32 },
    IsNotImplication { line: u32, reference: u32 },
    InvalidNegation { line: u32, reference: u32 },
    InvalidLeftConjunction { line: u32, reference: u32 },
    InvalidRightConjunction { line: u32, reference: u32 },
    InvalidLeftOrRightDisjunction { line: u32, reference: u32 },
    InvalidLeftOrRightConjunction { line: u32, reference: u32 },
    InvalidLeftImplication { line: u32, reference: u32 },
    InvalidRightImplication { line: u32, reference: u32 },
    InvalidLeftRightImplication { line: u32, reference: u32 },
    /// The eight "next/previous part of an alpha pair already taken" flavours
    /// the source spells as distinct message templates collapse onto one
    /// variant carrying which rule kind was involved.
    InvalidAlphaNextPrevious { line: u32, reference: u32, kind: RuleKind },
    InvalidBetaRule { line: u32, reference: u32 },
    InvalidUniversalFormula { line: u32, reference: u32 },
    InvalidExistentialFormula { line: u32, reference: u32 },
    InvalidSubstitutionUniversal { line: u32, reference: u32 },
    InvalidSubstitutionExistential { line: u32, reference: u32 },
    VariableIsNotFresh { line: u32, reference: u32 },
    InvalidResult { line: u32 },
}

impl Diagnostic {
    /// The line this diagnostic anchors to, for sorting and caret display.
    #[must_use]
    pub fn line(&self) -> u32 {
        match self {
            Diagnostic::SyntaxError { line, .. }
            | Diagnostic::NonSequentialLineNumbering { line, .. }
            | Diagnostic::InvalidInitialTableau { line }
            | Diagnostic::CloseBracketWithoutBox { line, .. }
            | Diagnostic::BoxMustBeDisposed { line }
            | Diagnostic::BoxMustBeDisposedByRule { line }
            | Diagnostic::ReferencedLineNotDefined { line, .. }
            | Diagnostic::UsingDiscardedRule { line, .. }
            | Diagnostic::AlreadyUsedRuleInBranch { line, .. }
            | Diagnostic::PremiseShouldBeTrue { line }
            | Diagnostic::ConclusionShouldBeFalse { line }
            | Diagnostic::WrongTrueValue { line }
            | Diagnostic::RuleMustBeAlpha { line }
            | Diagnostic::RuleMustBeBeta { line }
            | Diagnostic::RuleCannotBeApplied { line, .. }
            | Diagnostic::IsNotNegationTrue { line, .. }
            | Diagnostic::IsNotNegationFalse { line, .. }
            | Diagnostic::IsNotConjunctionTrue { line, .. }
            | Diagnostic::IsNotConjunctionFalse { line, .. }
            | Diagnostic::IsNotDisjunctionTrue { line, .. }
            | Diagnostic::IsNotDisjunctionFalse { line, .. }
            | Diagnostic::IsNotImplication { line, .. }
            | Diagnostic::InvalidNegation { line, .. }
            | Diagnostic::InvalidLeftConjunction { line, .. }
            | Diagnostic::InvalidRightConjunction { line, .. }
            | Diagnostic::InvalidLeftOrRightDisjunction { line, .. }
            | Diagnostic::InvalidLeftOrRightConjunction { line, .. }
            | Diagnostic::InvalidLeftImplication { line, .. }
            | Diagnostic::InvalidRightImplication { line, .. }
            | Diagnostic::InvalidLeftRightImplication { line, .. }
            | Diagnostic::InvalidAlphaNextPrevious { line, .. }
            | Diagnostic::InvalidBetaRule { line, .. }
            | Diagnostic::InvalidUniversalFormula { line, .. }
            | Diagnostic::InvalidExistentialFormula { line, .. }
            | Diagnostic::InvalidSubstitutionUniversal { line, .. }
            | Diagnostic::InvalidSubstitutionExistential { line, .. }
            | Diagnostic::VariableIsNotFresh { line, .. }
            | Diagnostic::InvalidResult { line } => *line,
        }
    }

    /// Stable identifier, as listed in the error catalogue; independent of
    /// locale and safe to match on or log.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::SyntaxError { .. } => "SyntaxError",
            Diagnostic::NonSequentialLineNumbering { .. } => "NonSequentialLineNumbering",
            Diagnostic::InvalidInitialTableau { .. } => "InvalidInitialTableau",
            Diagnostic::CloseBracketWithoutBox { .. } => "CloseBracketWithoutBox",
            Diagnostic::BoxMustBeDisposed { .. } => "BoxMustBeDisposed",
            Diagnostic::BoxMustBeDisposedByRule { .. } => "BoxMustBeDisposedByRule",
            Diagnostic::ReferencedLineNotDefined { .. } => "ReferencedLineNotDefined",
            Diagnostic::UsingDiscardedRule { .. } => "UsingDiscardedRule",
            Diagnostic::AlreadyUsedRuleInBranch { .. } => "AlreadyUsedRuleInBranch",
            Diagnostic::PremiseShouldBeTrue { .. } => "PremiseShouldBeTrue",
            Diagnostic::ConclusionShouldBeFalse { .. } => "ConclusionShouldBeFalse",
            Diagnostic::WrongTrueValue { .. } => "WrongTrueValue",
            Diagnostic::RuleMustBeAlpha { .. } => "RuleMustBeAlpha",
            Diagnostic::RuleMustBeBeta { .. } => "RuleMustBeBeta",
            Diagnostic::RuleCannotBeApplied { .. } => "RuleCannotBeApplied",
            Diagnostic::IsNotNegationTrue { .. } => "IsNotNegationTrue",
            Diagnostic::IsNotNegationFalse { .. } => "IsNotNegationFalse",
            Diagnostic::IsNotConjunctionTrue { .. } => "IsNotConjunctionTrue",
            Diagnostic::IsNotConjunctionFalse { .. } => "IsNotConjunctionFalse",
            Diagnostic::IsNotDisjunctionTrue { .. } => "IsNotDisjunctionTrue",
            Diagnostic::IsNotDisjunctionFalse { .. } => "IsNotDisjunctionFalse",
            Diagnostic::IsNotImplication { .. } => "IsNotImplication",
            Diagnostic::InvalidNegation { .. } => "InvalidNegation",
            Diagnostic::InvalidLeftConjunction { .. } => "InvalidLeftConjunction",
            Diagnostic::InvalidRightConjunction { .. } => "InvalidRightConjunction",
            Diagnostic::InvalidLeftOrRightDisjunction { .. } => "InvalidLeftOrRightDisjunction",
            Diagnostic::InvalidLeftOrRightConjunction { .. } => "InvalidLeftOrRightConjunction",
            Diagnostic::InvalidLeftImplication { .. } => "InvalidLeftImplication",
            Diagnostic::InvalidRightImplication { .. } => "InvalidRightImplication",
            Diagnostic::InvalidLeftRightImplication { .. } => "InvalidLeftRightImplication",
            Diagnostic::InvalidAlphaNextPrevious { .. } => "InvalidAlphaNextPrevious",
            Diagnostic::InvalidBetaRule { .. } => "InvalidBetaRule",
            Diagnostic::InvalidUniversalFormula { .. } => "InvalidUniversalFormula",
            Diagnostic::InvalidExistentialFormula { .. } => "InvalidExistentialFormula",
            Diagnostic::InvalidSubstitutionUniversal { .. } => "InvalidSubstitutionUniversal",
            Diagnostic::InvalidSubstitutionExistential { .. } => "InvalidSubstitutionExistential",
            Diagnostic::VariableIsNotFresh { .. } => "VariableIsNotFresh",
            Diagnostic::InvalidResult { .. } => "InvalidResult",
        }
    }

    /// Renders the diagnostic text in `locale`.
    #[must_use]
    pub fn message(&self, locale: Locale) -> String {
        match locale {
            Locale::En => self.message_en(),
            Locale::Pt => self.message_pt(),
        }
    }

    fn message_en(&self) -> String {
        match self {
            Diagnostic::SyntaxError { line, col, detail } => {
                format!("line {line}, column {col}: syntax error: {detail}")
            }
            Diagnostic::NonSequentialLineNumbering { line, expected, found, .. } => format!(
                "line {line}: expected line number {expected}, found {found}"
            ),
            Diagnostic::InvalidInitialTableau { line } => format!(
                "line {line}: the initial tableau must be a sequence of premises followed by exactly one conclusion"
            ),
            Diagnostic::CloseBracketWithoutBox { line, .. } => {
                format!("line {line}: '}}' does not close any open branch")
            }
            Diagnostic::BoxMustBeDisposed { line } => {
                format!("line {line}: the branch opened here is never closed")
            }
            Diagnostic::BoxMustBeDisposedByRule { line } => format!(
                "line {line}: the branch opened here must be closed by a closure rule before reuse"
            ),
            Diagnostic::ReferencedLineNotDefined { line, reference } => {
                format!("line {line}: line {reference} is not defined")
            }
            Diagnostic::UsingDiscardedRule { line, reference } => format!(
                "line {line}: line {reference} is not visible from here"
            ),
            Diagnostic::AlreadyUsedRuleInBranch { line, reference } => format!(
                "line {line}: rule on line {reference} was already used in this branch"
            ),
            Diagnostic::PremiseShouldBeTrue { line } => {
                format!("line {line}: a premise must be signed T")
            }
            Diagnostic::ConclusionShouldBeFalse { line } => {
                format!("line {line}: the conclusion must be signed F")
            }
            Diagnostic::WrongTrueValue { line } => {
                format!("line {line}: wrong sign for this rule")
            }
            Diagnostic::RuleMustBeAlpha { line } => format!(
                "line {line}: this rule is non-branching and must not open a branch"
            ),
            Diagnostic::RuleMustBeBeta { line } => format!(
                "line {line}: this rule branches and must open a branch with '{{'"
            ),
            Diagnostic::RuleCannotBeApplied { line, reference } => format!(
                "line {line}: no rule can be inferred from the shape of line {reference}"
            ),
            Diagnostic::IsNotNegationTrue { line, reference } => {
                format!("line {line}: line {reference} is not (F, not phi)")
            }
            Diagnostic::IsNotNegationFalse { line, reference } => {
                format!("line {line}: line {reference} is not (T, not phi)")
            }
            Diagnostic::IsNotConjunctionTrue { line, reference } => {
                format!("line {line}: line {reference} is not a true conjunction")
            }
            Diagnostic::IsNotConjunctionFalse { line, reference } => {
                format!("line {line}: line {reference} is not a false conjunction")
            }
            Diagnostic::IsNotDisjunctionTrue { line, reference } => {
                format!("line {line}: line {reference} is not a true disjunction")
            }
            Diagnostic::IsNotDisjunctionFalse { line, reference } => {
                format!("line {line}: line {reference} is not a false disjunction")
            }
            Diagnostic::IsNotImplication { line, reference } => {
                format!("line {line}: line {reference} is not an implication of the expected sign")
            }
            Diagnostic::InvalidNegation { line, reference } => format!(
                "line {line}: this formula is not the negated subformula of line {reference}"
            ),
            Diagnostic::InvalidLeftConjunction { line, reference } => format!(
                "line {line}: this formula is not the left conjunct of line {reference}"
            ),
            Diagnostic::InvalidRightConjunction { line, reference } => format!(
                "line {line}: this formula is not the right conjunct of line {reference}"
            ),
            Diagnostic::InvalidLeftOrRightDisjunction { line, reference } => format!(
                "line {line}: this formula is not a disjunct of line {reference}"
            ),
            Diagnostic::InvalidLeftOrRightConjunction { line, reference } => format!(
                "line {line}: this formula is not a conjunct of line {reference}"
            ),
            Diagnostic::InvalidLeftImplication { line, reference } => format!(
                "line {line}: this formula is not the antecedent of line {reference}"
            ),
            Diagnostic::InvalidRightImplication { line, reference } => format!(
                "line {line}: this formula is not the consequent of line {reference}"
            ),
            Diagnostic::InvalidLeftRightImplication { line, reference } => format!(
                "line {line}: this formula is neither side of the implication on line {reference}"
            ),
            Diagnostic::InvalidAlphaNextPrevious { line, reference, kind } => format!(
                "line {line}: the other part of the {kind:?} pair from line {reference} was expected on the preceding or following line"
            ),
            Diagnostic::InvalidBetaRule { line, reference } => format!(
                "line {line}: the two children of line {reference} do not carry the expected parts"
            ),
            Diagnostic::InvalidUniversalFormula { line, reference } => format!(
                "line {line}: not a legal substitution instance of the universal on line {reference}"
            ),
            Diagnostic::InvalidExistentialFormula { line, reference } => format!(
                "line {line}: not a legal substitution instance of the existential on line {reference}"
            ),
            Diagnostic::InvalidSubstitutionUniversal { line, reference } => format!(
                "line {line}: no variable substitution into line {reference} yields this formula"
            ),
            Diagnostic::InvalidSubstitutionExistential { line, reference } => format!(
                "line {line}: no variable substitution into line {reference} yields this formula"
            ),
            Diagnostic::VariableIsNotFresh { line, reference } => format!(
                "line {line}: the variable discharged from line {reference} is not fresh"
            ),
            Diagnostic::InvalidResult { line } => {
                format!("line {line}: the closure does not follow from the referenced lines")
            }
        }
    }

    fn message_pt(&self) -> String {
        match self {
            Diagnostic::SyntaxError { line, col, detail } => {
                format!("linha {line}, coluna {col}: erro de sintaxe: {detail}")
            }
            Diagnostic::NonSequentialLineNumbering { line, expected, found, .. } => format!(
                "linha {line}: esperava o numero de linha {expected}, encontrado {found}"
            ),
            Diagnostic::InvalidInitialTableau { line } => format!(
                "linha {line}: o tableau inicial deve ser uma sequencia de premissas seguida de exatamente uma conclusao"
            ),
            Diagnostic::CloseBracketWithoutBox { line, .. } => {
                format!("linha {line}: '}}' nao fecha nenhum ramo aberto")
            }
            Diagnostic::BoxMustBeDisposed { line } => {
                format!("linha {line}: o ramo aberto aqui nunca e fechado")
            }
            Diagnostic::BoxMustBeDisposedByRule { line } => format!(
                "linha {line}: o ramo aberto aqui deve ser fechado antes de ser reutilizado"
            ),
            Diagnostic::ReferencedLineNotDefined { line, reference } => {
                format!("linha {line}: a linha {reference} nao esta definida")
            }
            Diagnostic::UsingDiscardedRule { line, reference } => format!(
                "linha {line}: a linha {reference} nao e visivel a partir daqui"
            ),
            Diagnostic::AlreadyUsedRuleInBranch { line, reference } => format!(
                "linha {line}: a regra da linha {reference} ja foi usada neste ramo"
            ),
            Diagnostic::PremiseShouldBeTrue { line } => {
                format!("linha {line}: uma premissa deve ter sinal T")
            }
            Diagnostic::ConclusionShouldBeFalse { line } => {
                format!("linha {line}: a conclusao deve ter sinal F")
            }
            Diagnostic::WrongTrueValue { line } => {
                format!("linha {line}: sinal incorreto para esta regra")
            }
            Diagnostic::RuleMustBeAlpha { line } => format!(
                "linha {line}: esta regra nao ramifica e nao deve abrir um ramo"
            ),
            Diagnostic::RuleMustBeBeta { line } => format!(
                "linha {line}: esta regra ramifica e deve abrir um ramo com '{{'"
            ),
            Diagnostic::RuleCannotBeApplied { line, reference } => format!(
                "linha {line}: nenhuma regra pode ser inferida a partir da linha {reference}"
            ),
            Diagnostic::IsNotNegationTrue { line, reference } => {
                format!("linha {line}: a linha {reference} nao e (F, nao phi)")
            }
            Diagnostic::IsNotNegationFalse { line, reference } => {
                format!("linha {line}: a linha {reference} nao e (T, nao phi)")
            }
            Diagnostic::IsNotConjunctionTrue { line, reference } => {
                format!("linha {line}: a linha {reference} nao e uma conjuncao verdadeira")
            }
            Diagnostic::IsNotConjunctionFalse { line, reference } => {
                format!("linha {line}: a linha {reference} nao e uma conjuncao falsa")
            }
            Diagnostic::IsNotDisjunctionTrue { line, reference } => {
                format!("linha {line}: a linha {reference} nao e uma disjuncao verdadeira")
            }
            Diagnostic::IsNotDisjunctionFalse { line, reference } => {
                format!("linha {line}: a linha {reference} nao e uma disjuncao falsa")
            }
            Diagnostic::IsNotImplication { line, reference } => format!(
                "linha {line}: a linha {reference} nao e uma implicacao com o sinal esperado"
            ),
            Diagnostic::InvalidNegation { line, reference } => format!(
                "linha {line}: esta formula nao e a subformula negada da linha {reference}"
            ),
            Diagnostic::InvalidLeftConjunction { line, reference } => format!(
                "linha {line}: esta formula nao e o conjunto esquerdo da linha {reference}"
            ),
            Diagnostic::InvalidRightConjunction { line, reference } => format!(
                "linha {line}: esta formula nao e o conjunto direito da linha {reference}"
            ),
            Diagnostic::InvalidLeftOrRightDisjunction { line, reference } => format!(
                "linha {line}: esta formula nao e um disjunto da linha {reference}"
            ),
            Diagnostic::InvalidLeftOrRightConjunction { line, reference } => format!(
                "linha {line}: esta formula nao e um conjunto da linha {reference}"
            ),
            Diagnostic::InvalidLeftImplication { line, reference } => format!(
                "linha {line}: esta formula nao e o antecedente da linha {reference}"
            ),
            Diagnostic::InvalidRightImplication { line, reference } => format!(
                "linha {line}: esta formula nao e o consequente da linha {reference}"
            ),
            Diagnostic::InvalidLeftRightImplication { line, reference } => format!(
                "linha {line}: esta formula nao e nenhum dos lados da implicacao da linha {reference}"
            ),
            Diagnostic::InvalidAlphaNextPrevious { line, reference, kind } => format!(
                "linha {line}: esperava-se a outra parte do par {kind:?} da linha {reference} na linha anterior ou seguinte"
            ),
            Diagnostic::InvalidBetaRule { line, reference } => format!(
                "linha {line}: os dois ramos da linha {reference} nao carregam as partes esperadas"
            ),
            Diagnostic::InvalidUniversalFormula { line, reference } => format!(
                "linha {line}: nao e uma instancia de substituicao legal do universal da linha {reference}"
            ),
            Diagnostic::InvalidExistentialFormula { line, reference } => format!(
                "linha {line}: nao e uma instancia de substituicao legal do existencial da linha {reference}"
            ),
            Diagnostic::InvalidSubstitutionUniversal { line, reference } => format!(
                "linha {line}: nenhuma substituicao de variavel na linha {reference} produz esta formula"
            ),
            Diagnostic::InvalidSubstitutionExistential { line, reference } => format!(
                "linha {line}: nenhuma substituicao de variavel na linha {reference} produz esta formula"
            ),
            Diagnostic::VariableIsNotFresh { line, reference } => format!(
                "linha {line}: a variavel descartada da linha {reference} nao e nova"
            ),
            Diagnostic::InvalidResult { line } => {
                format!("linha {line}: o fechamento nao decorre das linhas referenciadas")
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message(Locale::En))
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_locales_render_without_panicking() {
        let d = Diagnostic::VariableIsNotFresh { line: 7, reference: 3 };
        assert!(d.message(Locale::En).contains('7'));
        assert!(d.message(Locale::Pt).contains('7'));
    }

    #[test]
    fn locale_parses_from_cli_flag() {
        assert_eq!("pt".parse::<Locale>().unwrap(), Locale::Pt);
        assert_eq!("en".parse::<Locale>().unwrap(), Locale::En);
        assert!("fr".parse::<Locale>().is_err());
    }

    #[test]
    fn code_is_locale_independent() {
        let d = Diagnostic::RuleMustBeAlpha { line: 2 };
        assert_eq!(d.code(), "RuleMustBeAlpha");
    }
}

//! Polarity lexicon for Brazilian Portuguese and English news text.

/// Word weights. Keys are lowercase single words; values lie in `[-1.0, 1.0]`.
pub(crate) const LEXICON: &[(&str, f64)] = &[
    // Portuguese, positive
    ("bom", 0.6),
    ("boa", 0.6),
    ("bons", 0.6),
    ("boas", 0.6),
    ("ótimo", 0.8),
    ("ótima", 0.8),
    ("excelente", 0.9),
    ("positivo", 0.5),
    ("positiva", 0.5),
    ("alta", 0.3),
    ("cresce", 0.4),
    ("crescimento", 0.4),
    ("avanço", 0.5),
    ("avança", 0.4),
    ("lucro", 0.5),
    ("recorde", 0.5),
    ("sucesso", 0.7),
    ("vitória", 0.7),
    ("melhora", 0.5),
    ("melhor", 0.6),
    ("recuperação", 0.4),
    ("aprovado", 0.4),
    ("aprovada", 0.4),
    ("conquista", 0.6),
    ("seguro", 0.3),
    ("segura", 0.3),
    ("feliz", 0.8),
    ("esperança", 0.5),
    ("benefício", 0.5),
    ("inovação", 0.4),
    // Portuguese, negative
    ("ruim", -0.7),
    ("péssimo", -1.0),
    ("péssima", -1.0),
    ("negativo", -0.5),
    ("negativa", -0.5),
    ("queda", -0.4),
    ("cai", -0.3),
    ("crise", -0.6),
    ("prejuízo", -0.6),
    ("perda", -0.5),
    ("perdas", -0.5),
    ("fracasso", -0.8),
    ("escândalo", -0.8),
    ("corrupção", -0.8),
    ("fraude", -0.8),
    ("morte", -0.7),
    ("mortes", -0.7),
    ("violência", -0.7),
    ("ataque", -0.6),
    ("acidente", -0.6),
    ("tragédia", -0.9),
    ("pior", -0.7),
    ("problema", -0.4),
    ("problemas", -0.4),
    ("risco", -0.3),
    ("alerta", -0.3),
    ("desemprego", -0.5),
    ("inflação", -0.3),
    ("protesto", -0.3),
    ("preocupação", -0.4),
    // English, positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("positive", 0.2),
    ("growth", 0.4),
    ("success", 0.7),
    ("win", 0.5),
    ("best", 1.0),
    ("better", 0.5),
    ("happy", 0.8),
    ("record", 0.3),
    ("profit", 0.4),
    // English, negative
    ("bad", -0.7),
    ("terrible", -1.0),
    ("worst", -1.0),
    ("worse", -0.4),
    ("negative", -0.3),
    ("crisis", -0.6),
    ("loss", -0.5),
    ("failure", -0.6),
    ("scandal", -0.8),
    ("fraud", -0.8),
    ("death", -0.7),
    ("attack", -0.6),
];

/// Words that flip the polarity of the next scored word.
const NEGATORS: &[&str] = &["não", "nunca", "jamais", "nem", "sem", "not", "never"];

/// Words that scale the polarity of the next scored word.
const INTENSIFIERS: &[(&str, f64)] = &[
    ("muito", 1.3),
    ("muita", 1.3),
    ("bastante", 1.2),
    ("extremamente", 1.5),
    ("super", 1.3),
    ("pouco", 0.5),
    ("very", 1.3),
    ("extremely", 1.5),
    ("really", 1.2),
    ("slightly", 0.5),
];

/// Multiplier applied to a negated word.
const NEGATION_FACTOR: f64 = -0.5;

/// How many tokens a negator or intensifier reaches forward.
const MODIFIER_REACH: usize = 3;

/// Score a text string using the lexicon.
///
/// Splits text into lowercase alphanumeric tokens and averages the weights of
/// the tokens found in the lexicon. A negator scales the next scored word
/// by -0.5 and an intensifier by its factor, provided that word follows
/// within three tokens. The result is clamped to `[-1.0, 1.0]`. Returns `0.0`
/// for empty text or text with no scored word.
#[must_use]
pub fn polarity(text: &str) -> f64 {
    let mut scores: Vec<f64> = Vec::new();
    let mut factor = 1.0_f64;
    let mut reach = 0usize;

    for token in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        let word = token.to_lowercase();

        if NEGATORS.contains(&word.as_str()) {
            factor *= NEGATION_FACTOR;
            reach = MODIFIER_REACH;
            continue;
        }
        if let Some(&(_, boost)) = INTENSIFIERS.iter().find(|(w, _)| *w == word) {
            factor *= boost;
            reach = MODIFIER_REACH;
            continue;
        }

        if let Some(&(_, weight)) = LEXICON.iter().find(|(w, _)| *w == word) {
            scores.push((weight * factor).clamp(-1.0, 1.0));
            factor = 1.0;
            reach = 0;
        } else if reach > 0 {
            reach -= 1;
            if reach == 0 {
                factor = 1.0;
            }
        }
    }

    if scores.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.clamp(-1.0, 1.0)
}

//! Prompt construction for act summaries.

/// Hard limit on summary length, in characters.
pub const SUMMARY_MAX_CHARS: usize = 200;

/// Phrase the model must answer with when the text is not enough to summarize.
pub const INSUFFICIENT_CONTENT_PHRASE: &str = "Brak wystarczających danych do podsumowania.";

/// Upper bound on act text sent to the model, in characters.
pub const MAX_INPUT_CHARS: usize = 120_000;

/// Build the system prompt for the legal-summary assistant.
pub fn build_summary_system_prompt(max_chars: usize) -> String {
    format!(
        r#"<rola>Jesteś radcą prawnym przygotowującym przegląd nowych aktów prawnych.</rola>
<kontekst>Twoje podsumowanie trafi do zestawienia kilkunastu aktów wysyłanego e-mailem, dlatego musi być zwięzłe i konkretne.</kontekst>
<zadanie>Streść przesłany akt prawny: czego dotyczy, jakie wprowadza zmiany lub nowe obowiązki. Zwróć wyłącznie treść podsumowania.</zadanie>
<format>Tekst ciągły, bez list, punktów i numeracji. Maksymalnie {max_chars} znaków.</format>
<brak_danych>Jeżeli przesłany tekst nie pozwala przygotować podsumowania, odpowiedz dokładnie: {INSUFFICIENT_CONTENT_PHRASE}</brak_danych>
<przykład>Rozporządzenie MSWiA o ochronie przeciwpożarowej budynków: nowe wymagania dla dróg ewakuacyjnych i obowiązek corocznych przeglądów instalacji gaśniczych.</przykład>"#
    )
}

/// Build the user turn: the act text, truncated to `MAX_INPUT_CHARS`.
pub fn build_summary_user_prompt(act_text: &str) -> String {
    let trimmed = act_text.trim();
    if trimmed.chars().count() <= MAX_INPUT_CHARS {
        return trimmed.to_string();
    }
    let truncated: String = trimmed.chars().take(MAX_INPUT_CHARS).collect();
    format!("{truncated}\n[...]")
}

/// Clamp model output to `max_chars` characters.
///
/// Output within the limit is returned as-is, apart from surrounding
/// whitespace. Longer output is cut on a character boundary.
pub fn enforce_cap(summary: &str, max_chars: usize) -> String {
    let trimmed = summary.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(max_chars).collect();
    cut.trim_end().to_string()
}

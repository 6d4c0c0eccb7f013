/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} è obbligatorio"));
    }
    if trimmed.chars().count() > max_len {
        return Some(format!("{field_name} può contenere al massimo {max_len} caratteri"));
    }
    None
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Email referente obbligatoria".to_string());
    }
    if trimmed.len() > 254 {
        return Some("L'email può contenere al massimo 254 caratteri".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Inserisci un indirizzo email valido".to_string());
    }
    None
}

/// Validate a phone number: digits, spaces, '+', '-', '/', '.', at least 6 digits.
pub fn validate_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Some("Telefono referente obbligatorio".to_string());
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '+' | '-' | '/' | '.'))
    {
        return Some("Il telefono può contenere solo cifre, spazi e + - / .".to_string());
    }
    if trimmed.chars().filter(|c| c.is_ascii_digit()).count() < 6 {
        return Some("Il telefono deve contenere almeno 6 cifre".to_string());
    }
    None
}

use uuid::Uuid;

pub const INVITE_CODE_LEN: usize = 8;

/// random 8 character upper-case code
pub fn generate_invite_code() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(INVITE_CODE_LEN)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// codes are typed by hand, so compare trimmed and upper-cased
pub fn normalize_invite_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

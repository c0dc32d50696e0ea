/// Replace `${ENV_VAR}` placeholders in raw config text.
///
/// Placeholders whose variable is unset, and malformed placeholders
/// (no closing brace, empty name), are left as-is.
pub fn substitute_env(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) if end > 0 => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(val) => out.push_str(&val),
                    // Unset variable: keep the literal placeholder.
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    },
                }
                rest = &after[end + 1..];
            },
            _ => {
                // "${}" or an unterminated "${...": emit literally.
                out.push_str("${");
                rest = after;
            },
        }
    }

    out.push_str(rest);
    out
}

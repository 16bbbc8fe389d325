use anyhow::{Context, Result};

/// Prompts the user for an access token issued by the backend's sign-in.
pub fn prompt_for_token() -> Result<String> {
    println!("Access token required.");
    println!("Sign in to the project and copy the session access token.");
    println!();

    let token = rpassword::prompt_password("Enter token: ")
        .context("Failed to read token from stdin")?;

    normalize_token(&token)
}

/// Trim the pasted token and strip a leading `Bearer ` if one was copied along.
pub fn normalize_token(raw: &str) -> Result<String> {
    let token = raw.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

    if token.is_empty() {
        anyhow::bail!("Token cannot be empty");
    }

    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token() {
        assert_eq!(normalize_token("  abc.def \n").unwrap(), "abc.def");
        assert_eq!(normalize_token("Bearer xyz").unwrap(), "xyz");
        assert!(normalize_token("   ").is_err());
    }
}

// src/identity.rs
//! Username synthesis from an email address

use thiserror::Error;

/// Returned when an input string cannot be turned into an [`Identity`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid email address '{email}': {reason}")]
pub struct InvalidEmailError {
    pub email: String,
    pub reason: &'static str,
}

/// The scan subject: a normalized email plus the usernames derived from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: String,
    domain: String,
    base_username: String,
    variants: Vec<String>,
}

impl Identity {
    /// Build an identity from a raw email address.
    ///
    /// The address is trimmed and lower-cased before anything else. With
    /// `extended` set, the branded variants (`.official`, `.team`) are added.
    pub fn from_email(raw: &str, extended: bool) -> Result<Self, InvalidEmailError> {
        let email = raw.trim().to_lowercase();

        let invalid = |reason| InvalidEmailError {
            email: email.clone(),
            reason,
        };

        let (local, _) = email.split_once('@').ok_or_else(|| invalid("missing '@'"))?;
        let domain = match email.rsplit_once('@') {
            Some((_, domain)) if !domain.is_empty() => domain.to_string(),
            _ => return Err(invalid("empty domain")),
        };

        let base_username = base_username(local);
        if base_username.is_empty() {
            return Err(invalid("empty local part"));
        }

        let variants = generate_variants(&base_username, extended);

        Ok(Self {
            email,
            domain,
            base_username,
            variants,
        })
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn base_username(&self) -> &str {
        &self.base_username
    }

    /// All variants in probing priority order
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// The first `window` variants, the ones platform probes actually try
    pub fn priority_variants(&self, window: usize) -> &[String] {
        &self.variants[..window.min(self.variants.len())]
    }
}

/// Strip sub-addressing (`+tag`) and all dots from an email local part
pub fn base_username(local: &str) -> String {
    let untagged = match local.find('+') {
        Some(idx) => &local[..idx],
        None => local,
    };
    untagged.replace('.', "")
}

/// Generate the deduplicated username variants for `base`, highest priority first
pub fn generate_variants(base: &str, extended: bool) -> Vec<String> {
    let mut candidates = vec![
        base.to_string(),
        format!("{}1", base),
        format!("{}123", base),
        format!("real{}", base),
        format!("the{}", base),
        truncate_chars(base, 8),
        truncate_chars(base, 4),
        base.to_uppercase(),
        base.to_lowercase(),
    ];

    if extended {
        candidates.push(format!("{}.official", base));
        candidates.push(format!("{}.team", base));
        candidates.push(format!("official.{}", base));
    }

    let mut variants: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !variants.contains(&candidate) {
            variants.push(candidate);
        }
    }
    variants
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

//! Sender identity extraction.
//!
//! Turns a raw sender (display name plus address) into the candidate brand
//! identity the resolver matches on: a name, a slug base and a domain.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Candidate brand identity derived from one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SenderIdentity {
    /// Display name, or the address local part when no name was given
    pub name: String,
    /// `slugify(name)`; may be empty
    pub slug_base: String,
    /// Lowercased text after the last `@`, absent when there is none
    pub domain: Option<String>,
    /// The sender address as supplied (trimmed)
    pub email: String,
}

fn slug_separator() -> &'static Regex {
    static SEPARATOR: OnceLock<Regex> = OnceLock::new();
    SEPARATOR.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("slug separator pattern is valid"))
}

/// Lowercases `text`, collapses every run of characters outside `[a-z0-9]`
/// into one hyphen and strips leading/trailing hyphens.
///
/// ```
/// use newsletter_brands::identity::slugify;
///
/// assert_eq!(slugify("Acme, Inc.!"), "acme-inc");
/// assert_eq!(slugify("  "), "");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    slug_separator()
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Domain part of an address: text after the last `@`, trimmed and
/// lowercased. `None` when there is no `@` or nothing follows it.
pub fn email_domain(email: &str) -> Option<String> {
    let (_, domain) = email.trim().rsplit_once('@')?;
    let domain = domain.trim().trim_end_matches('.').to_lowercase();
    if domain.is_empty() { None } else { Some(domain) }
}

/// Derives the candidate identity for a sender. Never fails: a missing `@`
/// or an empty name only narrows what the identity can be matched on.
pub fn extract_identity(sender_email: &str, sender_name: &str) -> SenderIdentity {
    let email = sender_email.trim().to_string();

    let local_part = match email.rsplit_once('@') {
        Some((local, _)) => local.to_string(),
        None => {
            tracing::warn!(
                sender = %email,
                "Sender address has no domain, resolving by name only"
            );
            email.clone()
        }
    };

    let domain = email_domain(&email);

    let trimmed_name = sender_name.trim();
    let name = if trimmed_name.is_empty() {
        local_part
    } else {
        trimmed_name.to_string()
    };

    SenderIdentity {
        slug_base: slugify(&name),
        name,
        domain,
        email,
    }
}

/// Third-from-last label of a domain with at least three labels, used to
/// disambiguate colliding slugs (`sales.india.company.com` gives `india`).
pub fn location_hint(domain: &str) -> Option<String> {
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 3 {
        return None;
    }

    let hint = slugify(labels[labels.len() - 3]);
    if hint.is_empty() { None } else { Some(hint) }
}

/// Immediate parent of a domain, when it still has at least two labels:
/// `news.example.com` gives `example.com`, `example.com` gives nothing.
pub fn parent_domain(domain: &str) -> Option<String> {
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();
    if labels.len() < 3 {
        return None;
    }
    Some(labels[1..].join("."))
}

/// Splits a `From:` header value into `(display name, address)`.
///
/// Handles `Name <addr>`, `"Quoted, Name" <addr>`, `<addr>` and bare
/// addresses. The name is empty when the header carries none.
pub fn parse_from_header(raw: &str) -> (String, String) {
    let raw = raw.trim();

    if let (Some(open), true) = (raw.rfind('<'), raw.ends_with('>')) {
        let address = raw[open + 1..raw.len() - 1].trim().to_string();
        let name = raw[..open].trim();
        let name = name
            .strip_prefix('"')
            .and_then(|n| n.strip_suffix('"'))
            .unwrap_or(name)
            .replace("\\\"", "\"");
        return (name.trim().to_string(), address);
    }

    (String::new(), raw.to_string())
}

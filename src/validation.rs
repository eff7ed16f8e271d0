//! Validation of the values typed into the deployment prompts.
//!
//! Each validator returns the message shown next to the prompt when the input is rejected.

use lazy_static::lazy_static;
use regex::Regex;

const MAX_APP_NAME_LEN: usize = 24;
const MAX_NAMESPACE_LEN: usize = 63;

lazy_static! {
    /// Application names start with a letter and become part of resource names
    static ref APP_NAME_REGEX: Regex = Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").unwrap();

    /// DNS-1123 label
    static ref NAMESPACE_REGEX: Regex = Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap();
}

pub fn validate_app_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Application name is required".to_string());
    }

    if name.len() > MAX_APP_NAME_LEN {
        return Err(format!(
            "Application name is too long (max {MAX_APP_NAME_LEN} characters)"
        ));
    }

    if !APP_NAME_REGEX.is_match(name) {
        return Err(
            "Application name must start with a lowercase letter and contain only lowercase letters, digits and dashes"
                .to_string(),
        );
    }

    Ok(())
}

pub fn validate_namespace_name(name: &str, existing: &[String]) -> Result<(), String> {
    if name.is_empty() {
        return Err("Namespace name is required".to_string());
    }

    if name.len() > MAX_NAMESPACE_LEN {
        return Err(format!(
            "Namespace name is too long (max {MAX_NAMESPACE_LEN} characters)"
        ));
    }

    if !NAMESPACE_REGEX.is_match(name) {
        return Err(
            "Namespace name must contain only lowercase letters, digits and dashes, and start and end with a letter or digit"
                .to_string(),
        );
    }

    if existing.iter().any(|ns| ns == name) {
        return Err(format!("Namespace '{name}' already exists"));
    }

    Ok(())
}

pub fn validate_container_image(image: &str) -> Result<(), String> {
    if image.trim().is_empty() {
        return Err("Container image is required".to_string());
    }
    if image.chars().any(char::is_whitespace) {
        return Err("Container image must not contain whitespace".to_string());
    }
    Ok(())
}

pub fn validate_replicas(replicas: u32) -> Result<(), String> {
    if replicas == 0 {
        return Err("At least one replica is required".to_string());
    }
    Ok(())
}

/// Accepts an empty value (no port) or a port number in 1..=65535.
pub fn validate_port(input: &str) -> Result<(), String> {
    if input.trim().is_empty() {
        return Ok(());
    }
    match input.trim().parse::<u16>() {
        Ok(0) | Err(_) => Err("Port must be a number between 1 and 65535".to_string()),
        Ok(_) => Ok(()),
    }
}

pub fn parse_port(input: &str) -> Option<u16> {
    input.trim().parse::<u16>().ok().filter(|p| *p != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_app_name() {
        assert!(validate_app_name("web").is_ok());
        assert!(validate_app_name("my-app-2").is_ok());

        assert!(validate_app_name("").is_err());
        assert!(validate_app_name("2fast").is_err());
        assert!(validate_app_name("Web").is_err());
        assert!(validate_app_name("trailing-").is_err());
        assert!(validate_app_name(&"a".repeat(25)).is_err());
    }

    #[test]
    fn test_validate_namespace_name() {
        let existing = vec!["default".to_string(), "kube-system".to_string()];

        assert!(validate_namespace_name("team-a", &existing).is_ok());
        assert!(validate_namespace_name("1st", &existing).is_ok());

        assert!(validate_namespace_name("", &existing).is_err());
        assert!(validate_namespace_name("Team", &existing).is_err());
        assert!(validate_namespace_name("-team", &existing).is_err());
        assert!(validate_namespace_name(&"n".repeat(64), &existing).is_err());

        let err = validate_namespace_name("default", &existing).unwrap_err();
        assert!(err.contains("already exists"));
    }

    #[test]
    fn test_validate_container_image() {
        assert!(validate_container_image("nginx").is_ok());
        assert!(validate_container_image("registry.local:5000/team/app:1.0").is_ok());
        assert!(validate_container_image("").is_err());
        assert!(validate_container_image("   ").is_err());
        assert!(validate_container_image("nginx latest").is_err());
    }

    #[test]
    fn test_validate_replicas() {
        assert!(validate_replicas(0).is_err());
        assert!(validate_replicas(1).is_ok());
    }

    #[test]
    fn test_ports() {
        assert!(validate_port("").is_ok());
        assert!(validate_port("8080").is_ok());
        assert!(validate_port("0").is_err());
        assert!(validate_port("70000").is_err());
        assert!(validate_port("http").is_err());

        assert_eq!(parse_port(" 443 "), Some(443));
        assert_eq!(parse_port(""), None);
        assert_eq!(parse_port("0"), None);
    }
}

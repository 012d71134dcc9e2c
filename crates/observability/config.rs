use std::env;

#[derive(Clone, Debug)]
pub(crate) struct ServiceContext {
    pub(crate) service_name: String,
    pub(crate) environment: String,
    pub(crate) component: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ObservabilityConfig {
    pub(crate) service_context: ServiceContext,
    pub(crate) ansi: bool,
    pub(crate) with_target: bool,
    /// Warnings captured during config parsing so they can be logged after tracing is initialized.
    pub(crate) warnings: Vec<String>,
}

impl ObservabilityConfig {
    pub(crate) fn from_env(component: &str) -> Self {
        Self::from_lookup(component, |key| env::var(key).ok())
    }

    fn from_lookup(component: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let component = component.trim().to_string();
        let mut warnings = Vec::new();

        let service_name = lookup("SERVICE_NAME")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| component.clone());

        let environment = lookup("STAGE")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "unknown".to_string());

        let ansi = bool_flag(&lookup, "LOG_ANSI", true, &mut warnings);
        let with_target = bool_flag(&lookup, "LOG_WITH_TARGET", true, &mut warnings);

        Self {
            service_context: ServiceContext {
                service_name,
                environment,
                component,
            },
            ansi,
            with_target,
            warnings,
        }
    }
}

fn bool_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
    warnings: &mut Vec<String>,
) -> bool {
    let Some(raw) = lookup(key).filter(|v| !v.trim().is_empty()) else {
        return default;
    };

    match parse_bool(&raw) {
        Some(value) => value,
        None => {
            warnings.push(format!("{key} is invalid (value: {raw}); defaulting to {default}"));
            default
        }
    }
}

fn parse_bool(input: &str) -> Option<bool> {
    match input.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn service_name_falls_back_to_component() {
        let config = ObservabilityConfig::from_lookup(" worker ", lookup_from(&[]));

        assert_eq!(config.service_context.service_name, "worker");
        assert_eq!(config.service_context.environment, "unknown");
        assert!(config.ansi);
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn invalid_flags_are_reported_not_fatal() {
        let config = ObservabilityConfig::from_lookup(
            "worker",
            lookup_from(&[
                ("SERVICE_NAME", "publishing"),
                ("STAGE", "staging"),
                ("LOG_ANSI", "sometimes"),
                ("LOG_WITH_TARGET", "off"),
            ]),
        );

        assert_eq!(config.service_context.service_name, "publishing");
        assert_eq!(config.service_context.environment, "staging");
        assert!(config.ansi);
        assert!(!config.with_target);
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("LOG_ANSI"));
    }
}

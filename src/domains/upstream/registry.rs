//! Endpoint Registry - the declarative table driving both front ends.
//!
//! Every Monkeytype operation is one [`EndpointSpec`]: a name, an upstream
//! path template, an HTTP method, and a parameter spec. The registry is
//! built once at startup, validated fail-fast, and consumed by the generic
//! pipeline; neither front end contains per-endpoint code.

use std::collections::HashMap;

use super::error::RegistryError;

/// Typing test modes accepted by the leaderboard and personal-best endpoints.
pub const MODES: &[&str] = &["time", "words", "quote", "zen"];

/// HTTP method of an upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a request body is meaningful for this method.
    pub fn has_body(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

/// Value kind of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
    /// A string restricted to an enumerated set.
    Enum(&'static [&'static str]),
}

/// Where a bound parameter ends up in the upstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Substituted into a `{placeholder}` in the path template.
    Path,
    /// Query string on GET, JSON body on other methods.
    Query,
    /// JSON body (non-GET endpoints only).
    Body,
}

/// Declarative spec for one parameter of an endpoint.
#[derive(Debug, Clone)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub required: bool,
    pub kind: ParamKind,
    pub default: Option<String>,
    pub placement: Placement,
}

impl ParameterSpec {
    fn new(
        name: &'static str,
        description: &'static str,
        kind: ParamKind,
        placement: Placement,
    ) -> Self {
        Self {
            name,
            description,
            required: false,
            kind,
            default: None,
            placement,
        }
    }

    /// A required string substituted into the path.
    pub fn path(name: &'static str, description: &'static str) -> Self {
        let mut spec = Self::new(name, description, ParamKind::String, Placement::Path);
        spec.required = true;
        spec
    }

    /// An optional query string.
    pub fn query_string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::String, Placement::Query)
    }

    /// An optional numeric query parameter.
    pub fn query_number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, description, ParamKind::Number, Placement::Query)
    }

    /// An optional query string restricted to an enumerated set.
    pub fn query_enum(
        name: &'static str,
        description: &'static str,
        allowed: &'static [&'static str],
    ) -> Self {
        Self::new(name, description, ParamKind::Enum(allowed), Placement::Query)
    }

    /// A required string sent in the request body.
    pub fn body_string(name: &'static str, description: &'static str) -> Self {
        let mut spec = Self::new(name, description, ParamKind::String, Placement::Body);
        spec.required = true;
        spec
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Give the parameter a default, applied when the caller omits it.
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Declarative spec for one upstream endpoint.
#[derive(Debug, Clone)]
pub struct EndpointSpec {
    /// Logical operation name, unique across the registry.
    pub name: &'static str,

    /// Human description, shown in tool and route listings.
    pub description: &'static str,

    pub method: HttpMethod,

    /// Upstream path template relative to the configured prefix, with
    /// `{placeholder}` segments for path parameters.
    pub template: &'static str,

    pub params: Vec<ParameterSpec>,
}

impl EndpointSpec {
    fn new(
        name: &'static str,
        description: &'static str,
        method: HttpMethod,
        template: &'static str,
        params: Vec<ParameterSpec>,
    ) -> Self {
        Self {
            name,
            description,
            method,
            template,
            params,
        }
    }

    /// Placeholder names appearing in the template, in order.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut found = Vec::new();
        let mut rest = self.template;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            found.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }
        found
    }
}

/// Options the registry is parameterized over.
///
/// These are deployment differences, not core-logic differences: the path
/// prefix varies between installations and the `mode2` default is a matter
/// of taste.
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    pub path_prefix: String,
    pub default_mode2: String,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            path_prefix: "/api/v1".to_string(),
            default_mode2: "60".to_string(),
        }
    }
}

/// The full endpoint table, keyed by name, in stable definition order.
#[derive(Debug)]
pub struct Registry {
    path_prefix: String,
    entries: Vec<EndpointSpec>,
    index: HashMap<&'static str, usize>,
}

impl Registry {
    /// Build and validate the registry from the built-in Monkeytype table.
    pub fn new(options: RegistryOptions) -> Result<Self, RegistryError> {
        let entries = endpoints(&options);
        Self::from_entries(entries, options.path_prefix)
    }

    /// Build and validate a registry from an explicit endpoint table.
    ///
    /// Fails fast on duplicate names, path parameters without a matching
    /// placeholder, unbound placeholders, and body parameters on GET
    /// endpoints. These are programming errors, so construction happens
    /// once at startup and the process refuses to come up on failure.
    pub fn from_entries(
        entries: Vec<EndpointSpec>,
        path_prefix: String,
    ) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (pos, spec) in entries.iter().enumerate() {
            if index.insert(spec.name, pos).is_some() {
                return Err(RegistryError::DuplicateName(spec.name.to_string()));
            }

            let placeholders = spec.placeholders();
            for param in &spec.params {
                match param.placement {
                    Placement::Path if !placeholders.contains(&param.name) => {
                        return Err(RegistryError::MissingPlaceholder {
                            endpoint: spec.name.to_string(),
                            param: param.name.to_string(),
                            template: spec.template.to_string(),
                        });
                    }
                    Placement::Body if !spec.method.has_body() => {
                        return Err(RegistryError::BodyParamOnGet {
                            endpoint: spec.name.to_string(),
                            param: param.name.to_string(),
                        });
                    }
                    _ => {}
                }
            }
            for placeholder in placeholders {
                let bound = spec
                    .params
                    .iter()
                    .any(|p| p.placement == Placement::Path && p.name == placeholder);
                if !bound {
                    return Err(RegistryError::UnboundPlaceholder {
                        endpoint: spec.name.to_string(),
                        placeholder: placeholder.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            path_prefix,
            entries,
            index,
        })
    }

    /// Look up an endpoint by name.
    pub fn lookup(&self, name: &str) -> Option<&EndpointSpec> {
        self.index.get(name).map(|&pos| &self.entries[pos])
    }

    /// All endpoints, in definition order.
    pub fn list_all(&self) -> &[EndpointSpec] {
        &self.entries
    }

    /// The prefix prepended to every template when binding.
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }
}

/// The Monkeytype endpoint table.
fn endpoints(options: &RegistryOptions) -> Vec<EndpointSpec> {
    use HttpMethod::{Get, Post};
    use ParameterSpec as P;

    vec![
        // User endpoints
        EndpointSpec::new(
            "check_username",
            "Check if a username is available on Monkeytype",
            Get,
            "/users/check-name/{name}",
            vec![P::path("name", "Username to check for availability")],
        ),
        EndpointSpec::new(
            "get_personal_bests",
            "Get user's personal best typing scores",
            Get,
            "/users/personalBests",
            vec![
                P::query_enum(
                    "mode",
                    "Mode for personal bests (time, words, quote, zen). Defaults to 'time'",
                    MODES,
                )
                .with_default("time"),
                P::query_string(
                    "mode2",
                    "Secondary mode parameter (e.g., 15, 60 for time mode)",
                )
                .with_default(options.default_mode2.clone()),
            ],
        ),
        EndpointSpec::new("get_tags", "Get user's tags", Get, "/users/tags", vec![]),
        EndpointSpec::new(
            "get_stats",
            "Get user's typing statistics",
            Get,
            "/users/stats",
            vec![],
        ),
        EndpointSpec::new(
            "get_profile",
            "Get user's profile information",
            Get,
            "/users/profile",
            vec![],
        ),
        EndpointSpec::new(
            "send_forgot_password_email",
            "Send a forgot password email to a user",
            Post,
            "/users/forgotPassword",
            vec![P::body_string(
                "email",
                "Email address to send password reset link",
            )],
        ),
        EndpointSpec::new(
            "get_current_test_activity",
            "Get user's current test activity",
            Get,
            "/users/activity/current",
            vec![],
        ),
        EndpointSpec::new(
            "get_streak",
            "Get user's typing streak information",
            Get,
            "/users/streak",
            vec![],
        ),
        // Test result endpoints
        EndpointSpec::new(
            "get_results",
            "Get user's typing test results",
            Get,
            "/results",
            vec![
                P::query_number("timestamp", "Timestamp of the earliest result to fetch"),
                P::query_number("offset", "Offset of the item at which to begin the response"),
                P::query_number("limit", "Limit results to the given amount"),
            ],
        ),
        EndpointSpec::new(
            "get_result_by_id",
            "Get a specific typing test result by ID",
            Get,
            "/results/{resultId}",
            vec![P::path("resultId", "ID of the result to retrieve")],
        ),
        EndpointSpec::new(
            "get_last_result",
            "Get user's last typing test result",
            Get,
            "/results/last",
            vec![],
        ),
        // Public endpoints
        EndpointSpec::new(
            "get_speed_histogram",
            "Get speed histogram data",
            Get,
            "/public/speedHistogram",
            vec![],
        ),
        EndpointSpec::new(
            "get_typing_stats",
            "Get global typing statistics",
            Get,
            "/public/typingStats",
            vec![],
        ),
        // Leaderboard endpoints
        EndpointSpec::new(
            "get_leaderboard",
            "Get typing test leaderboard",
            Get,
            "/leaderboards",
            vec![
                P::query_string("language", "Language for the leaderboard").required(),
                P::query_enum(
                    "mode",
                    "Mode for the leaderboard (time, words, quote, zen)",
                    MODES,
                )
                .required(),
                P::query_string("mode2", "Secondary mode parameter (e.g., 15, 60, etc.)")
                    .required(),
                P::query_number("skip", "Number of entries to skip"),
                P::query_number("limit", "Number of entries to return"),
            ],
        ),
        EndpointSpec::new(
            "get_leaderboard_rank",
            "Get user's rank on the leaderboard",
            Get,
            "/leaderboards/rank",
            vec![
                P::query_string("language", "Language for the leaderboard").required(),
                P::query_enum(
                    "mode",
                    "Mode for the leaderboard (time, words, quote, zen)",
                    MODES,
                )
                .required(),
                P::query_string("mode2", "Secondary mode parameter (e.g., 15, 60, etc.)")
                    .required(),
            ],
        ),
        EndpointSpec::new(
            "get_daily_leaderboard",
            "Get daily typing test leaderboard",
            Get,
            "/leaderboards/daily",
            vec![
                P::query_string("language", "Language for the leaderboard"),
                P::query_enum(
                    "mode",
                    "Mode for the leaderboard (time, words, quote, zen)",
                    MODES,
                ),
                P::query_string("mode2", "Secondary mode parameter (e.g., 15, 60, etc.)"),
                P::query_number("skip", "Number of entries to skip"),
                P::query_number("limit", "Number of entries to return"),
            ],
        ),
        EndpointSpec::new(
            "get_weekly_xp_leaderboard",
            "Get weekly XP leaderboard",
            Get,
            "/leaderboards/weeklyXp",
            vec![
                P::query_number("skip", "Number of entries to skip"),
                P::query_number("limit", "Number of entries to return"),
            ],
        ),
        // PSA endpoints
        EndpointSpec::new(
            "get_psas",
            "Get public service announcements",
            Get,
            "/psas",
            vec![],
        ),
        // Quote endpoints
        EndpointSpec::new(
            "is_submission_enabled",
            "Check if quote submission is enabled",
            Get,
            "/quotes/submission-enabled",
            vec![],
        ),
        // Server configuration endpoints
        EndpointSpec::new(
            "get_configuration",
            "Get server configuration",
            Get,
            "/configuration",
            vec![],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Registry {
        Registry::new(RegistryOptions::default()).unwrap()
    }

    #[test]
    fn test_registry_has_all_endpoints() {
        let registry = registry();
        assert_eq!(registry.list_all().len(), 20);
    }

    #[test]
    fn test_lookup_after_list_round_trips() {
        let registry = registry();
        for spec in registry.list_all() {
            let found = registry.lookup(spec.name).expect("listed name must resolve");
            assert_eq!(found.name, spec.name);
            assert_eq!(found.template, spec.template);
            assert_eq!(found.method, spec.method);
            assert_eq!(found.params.len(), spec.params.len());
        }
    }

    #[test]
    fn test_lookup_unknown() {
        assert!(registry().lookup("get_wpm_forecast").is_none());
    }

    #[test]
    fn test_definition_order_is_stable() {
        let registry = registry();
        let names: Vec<_> = registry.list_all().iter().map(|e| e.name).collect();
        assert_eq!(names[0], "check_username");
        assert_eq!(names[1], "get_personal_bests");
        assert_eq!(*names.last().unwrap(), "get_configuration");
    }

    #[test]
    fn test_placeholders_extracted() {
        let registry = registry();
        let spec = registry.lookup("get_result_by_id").unwrap();
        assert_eq!(spec.placeholders(), vec!["resultId"]);

        let spec = registry.lookup("get_psas").unwrap();
        assert!(spec.placeholders().is_empty());
    }

    #[test]
    fn test_personal_bests_defaults() {
        let registry = Registry::new(RegistryOptions {
            path_prefix: "/api/v1".to_string(),
            default_mode2: "15".to_string(),
        })
        .unwrap();
        let spec = registry.lookup("get_personal_bests").unwrap();
        let mode = spec.params.iter().find(|p| p.name == "mode").unwrap();
        let mode2 = spec.params.iter().find(|p| p.name == "mode2").unwrap();
        assert_eq!(mode.default.as_deref(), Some("time"));
        assert_eq!(mode2.default.as_deref(), Some("15"));
        assert_eq!(mode.kind, ParamKind::Enum(MODES));
    }

    #[test]
    fn test_duplicate_name_rejected_at_construction() {
        let entries = vec![
            EndpointSpec::new("get_psas", "PSAs", HttpMethod::Get, "/psas", vec![]),
            EndpointSpec::new("get_psas", "PSAs again", HttpMethod::Get, "/psas2", vec![]),
        ];
        assert!(matches!(
            Registry::from_entries(entries, "/api/v1".to_string()),
            Err(RegistryError::DuplicateName(name)) if name == "get_psas"
        ));
    }

    #[test]
    fn test_path_param_without_placeholder_rejected() {
        let entries = vec![EndpointSpec::new(
            "get_thing",
            "A path parameter the template never mentions",
            HttpMethod::Get,
            "/things",
            vec![ParameterSpec::path("id", "Thing ID")],
        )];
        assert!(matches!(
            Registry::from_entries(entries, "/api/v1".to_string()),
            Err(RegistryError::MissingPlaceholder { param, .. }) if param == "id"
        ));
    }

    #[test]
    fn test_unbound_placeholder_rejected() {
        let entries = vec![EndpointSpec::new(
            "get_thing",
            "A placeholder no parameter binds",
            HttpMethod::Get,
            "/things/{id}",
            vec![],
        )];
        assert!(matches!(
            Registry::from_entries(entries, "/api/v1".to_string()),
            Err(RegistryError::UnboundPlaceholder { placeholder, .. }) if placeholder == "id"
        ));
    }

    #[test]
    fn test_body_param_on_get_rejected() {
        let entries = vec![EndpointSpec::new(
            "get_thing",
            "A body parameter that could never be sent",
            HttpMethod::Get,
            "/things",
            vec![ParameterSpec::body_string("email", "Email address")],
        )];
        assert!(matches!(
            Registry::from_entries(entries, "/api/v1".to_string()),
            Err(RegistryError::BodyParamOnGet { param, .. }) if param == "email"
        ));
    }

    #[test]
    fn test_valid_entries_accepted_via_from_entries() {
        let entries = vec![EndpointSpec::new(
            "get_thing",
            "A well-formed entry",
            HttpMethod::Get,
            "/things/{id}",
            vec![ParameterSpec::path("id", "Thing ID")],
        )];
        let registry = Registry::from_entries(entries, "/v2".to_string()).unwrap();
        assert_eq!(registry.path_prefix(), "/v2");
        assert!(registry.lookup("get_thing").is_some());
    }

    #[test]
    fn test_path_params_match_placeholders() {
        for spec in registry().list_all() {
            let placeholders = spec.placeholders();
            for param in &spec.params {
                if param.placement == Placement::Path {
                    assert!(
                        placeholders.contains(&param.name),
                        "{}: no placeholder for {}",
                        spec.name,
                        param.name
                    );
                }
            }
        }
    }
}

use crate::types::neuron::ApiEndpoint;

/// Defaults applied to neurons of a given niche.
#[derive(Debug, PartialEq, Eq)]
pub struct NicheTemplate {
    pub niche: &'static str,
    pub features: &'static [&'static str],
    /// Endpoints served on top of `/health` and `/status`.
    pub extra_endpoints: &'static [(&'static str, &'static str, &'static str)],
}

impl NicheTemplate {
    pub fn endpoints(&self) -> Vec<ApiEndpoint> {
        let mut endpoints = vec![
            ApiEndpoint::new("GET", "/health", "Health check endpoint"),
            ApiEndpoint::new("GET", "/status", "Get neuron status"),
        ];
        endpoints.extend(
            self.extra_endpoints
                .iter()
                .map(|(method, path, description)| ApiEndpoint::new(method, path, description)),
        );
        endpoints
    }
}

/// Used for any niche without an entry in [`TEMPLATES`].
pub static FALLBACK: NicheTemplate = NicheTemplate {
    niche: "general",
    features: &["content", "analytics"],
    extra_endpoints: &[],
};

pub static TEMPLATES: &[NicheTemplate] = &[
    NicheTemplate {
        niche: "finance",
        features: &["calculator", "quiz", "recommendations"],
        extra_endpoints: &[("POST", "/calculate", "Run a financial calculation")],
    },
    NicheTemplate {
        niche: "health",
        features: &["assessment", "tracker", "recommendations"],
        extra_endpoints: &[("POST", "/assessment", "Score a health assessment")],
    },
    NicheTemplate {
        niche: "saas",
        features: &["comparison", "reviews", "pricing"],
        extra_endpoints: &[("GET", "/tools", "List tracked tools")],
    },
    NicheTemplate {
        niche: "education",
        features: &["courses", "quiz", "progress"],
        extra_endpoints: &[("GET", "/courses", "List courses")],
    },
    NicheTemplate {
        niche: "travel",
        features: &["planner", "deals", "guides"],
        extra_endpoints: &[("POST", "/plan", "Build an itinerary")],
    },
    NicheTemplate {
        niche: "security",
        features: &["scanner", "alerts", "reports"],
        extra_endpoints: &[("POST", "/scan", "Start a scan")],
    },
    NicheTemplate {
        niche: "ai-tools",
        features: &["directory", "reviews", "comparison"],
        extra_endpoints: &[("GET", "/tools", "Search the tool directory")],
    },
];

/// Looks up the template for a niche, ignoring case and surrounding whitespace.
pub fn for_niche(niche: &str) -> &'static NicheTemplate {
    let niche = niche.trim();
    TEMPLATES
        .iter()
        .find(|t| t.niche.eq_ignore_ascii_case(niche))
        .unwrap_or(&FALLBACK)
}

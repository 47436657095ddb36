//! Site sections: the rule table used to categorize URLs, display names and priority scores.

use serde::Serialize;

/// The category a page is filed under in the generated llms.txt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Home,
    About,
    Contact,
    Services,
    Guides,
    Blog,
    Reviews,
    Insights,
    Legal,
    Resources,
    Other,
}

/// Keyword rules, checked in order. The first section with a matching keyword wins.
pub const SECTION_RULES: &[(Section, &[&str])] = &[
    (Section::Home, &["home", "homepage", "index", "welcome", "start"]),
    (
        Section::About,
        &[
            "about",
            "about-us",
            "who-we-are",
            "company",
            "our-story",
            "team",
            "mission",
            "vision",
            "values",
        ],
    ),
    (
        Section::Contact,
        &[
            "contact",
            "contact-us",
            "support",
            "help",
            "get-in-touch",
            "customer-service",
            "assistance",
            "faq",
        ],
    ),
    (
        Section::Services,
        &[
            "services",
            "products",
            "offer",
            "pricing",
            "plans",
            "solutions",
            "features",
            "what-we-do",
        ],
    ),
    (
        Section::Guides,
        &[
            "guide",
            "guides",
            "tutorial",
            "tutorials",
            "how-to",
            "manual",
            "documentation",
            "docs",
            "setup",
            "walkthrough",
        ],
    ),
    (
        Section::Blog,
        &["blog", "articles", "news", "updates", "press", "stories", "events"],
    ),
    (
        Section::Reviews,
        &[
            "reviews",
            "testimonials",
            "feedback",
            "opinions",
            "ratings",
            "experiences",
        ],
    ),
    (
        Section::Insights,
        &[
            "insights",
            "analysis",
            "research",
            "reports",
            "trends",
            "case-studies",
            "whitepapers",
        ],
    ),
    (
        Section::Legal,
        &[
            "privacy",
            "cookie",
            "terms",
            "legal",
            "gdpr",
            "privacy-policy",
            "tos",
            "terms-of-service",
            "terms-and-conditions",
            "disclaimer",
            "compliance",
            "security",
        ],
    ),
    (
        Section::Resources,
        &[
            "resources",
            "downloads",
            "download",
            "tools",
            "assets",
            "media",
            "templates",
            "forms",
            "brochures",
            "whitepaper",
        ],
    ),
];

/// Order in which sections are rendered in the output document.
pub const DISPLAY_ORDER: [Section; 11] = [
    Section::Home,
    Section::About,
    Section::Services,
    Section::Guides,
    Section::Blog,
    Section::Reviews,
    Section::Insights,
    Section::Resources,
    Section::Contact,
    Section::Legal,
    Section::Other,
];

impl Section {
    /// Lower-case tag, as used in event payloads and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::About => "about",
            Self::Contact => "contact",
            Self::Services => "services",
            Self::Guides => "guides",
            Self::Blog => "blog",
            Self::Reviews => "reviews",
            Self::Insights => "insights",
            Self::Legal => "legal",
            Self::Resources => "resources",
            Self::Other => "other",
        }
    }

    /// Human readable heading used for the `##` line of the section.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Home => "Main content",
            Self::About => "About",
            Self::Contact => "Contacts",
            Self::Services => "Products and Services",
            Self::Guides => "Guides and Tutorials",
            Self::Blog => "Blog and Articles",
            Self::Reviews => "Reviews and Feedback",
            Self::Insights => "Insights and Research",
            Self::Legal => "Policies and Legal",
            Self::Resources => "Resources and Downloads",
            Self::Other => "Other Content",
        }
    }

    /// Priority score in [0, 1] assigned to every page of this section.
    pub fn priority(&self) -> f64 {
        match self {
            Self::Home => 1.0,
            Self::About | Self::Contact | Self::Services => 0.8,
            Self::Guides | Self::Blog | Self::Reviews => 0.7,
            Self::Legal => 0.3,
            _ => 0.5,
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

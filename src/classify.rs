//! Question classifier: ordered rule table mapping questions to categories
//!
//! Each rule is a set of case-insensitive substring predicates over the
//! lowercased question; evaluation is top-to-bottom and the first rule with
//! any matching predicate wins. Rule order is part of the contract:
//! reordering changes outcomes for questions that match multiple rules.
//! Every question maps to exactly one category; unmatched questions fall back
//! to "Other Questions".

use serde::Serialize;

/// A classification outcome: display name plus icon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub icon: &'static str,
}

struct Rule {
    keywords: &'static [&'static str],
    category: Category,
}

/// Fallback when no rule matches
pub const OTHER: Category = Category {
    name: "Other Questions",
    icon: "❓",
};

const RULES: &[Rule] = &[
    Rule {
        keywords: &[
            "what do you do",
            "what does your company do",
            "your services",
            "what services",
            "what can you help",
            "what do you offer",
        ],
        category: Category {
            name: "Services / What We Do",
            icon: "💼",
        },
    },
    Rule {
        keywords: &[
            "recruit",
            "hiring process",
            "how do you find",
            "how do you hire",
            "sourcing",
            "placement process",
            "headhunt",
        ],
        category: Category {
            name: "Recruiting / Hiring Process",
            icon: "🤝",
        },
    },
    Rule {
        keywords: &["industr", "specializ", "sector", "niche", "verticals"],
        category: Category {
            name: "Industries / Specialization",
            icon: "🏭",
        },
    },
    Rule {
        keywords: &[
            "price", "pricing", "cost", "fee", "charge", "how much", "rates", "payment",
        ],
        category: Category {
            name: "Pricing / Fees",
            icon: "💰",
        },
    },
    Rule {
        keywords: &[
            "how long",
            "how fast",
            "how quickly",
            "timeline",
            "time frame",
            "turnaround",
            "duration",
        ],
        category: Category {
            name: "Timeline / Duration",
            icon: "⏱️",
        },
    },
    Rule {
        keywords: &[
            "contact",
            "get started",
            "reach you",
            "talk to someone",
            "schedule",
            "book a call",
            "phone",
            "email",
        ],
        category: Category {
            name: "Contact / Get Started",
            icon: "📞",
        },
    },
    Rule {
        keywords: &[
            "where are you",
            "location",
            "service area",
            "which cities",
            "remote",
            "nationwide",
            "local",
        ],
        category: Category {
            name: "Location / Service Area",
            icon: "📍",
        },
    },
    Rule {
        keywords: &[
            "about your company",
            "who are you",
            "tell me about",
            "how long have you been",
            "founded",
            "your team",
            "your experience",
        ],
        category: Category {
            name: "About / Company Info",
            icon: "🏢",
        },
    },
    Rule {
        keywords: &[
            "screen", "vet", "qualif", "background check", "quality", "interview process",
        ],
        category: Category {
            name: "Candidate Quality / Screening",
            icon: "✅",
        },
    },
    Rule {
        keywords: &[
            "job", "apply", "resume", "looking for work", "open position", "career", "candidate",
        ],
        category: Category {
            name: "Job Seekers / Candidates",
            icon: "🧑‍💼",
        },
    },
];

/// Classify a question into exactly one category
pub fn classify(question: &str) -> Category {
    let lowered = question.to_lowercase();
    for rule in RULES {
        if rule.keywords.iter().any(|kw| lowered.contains(kw)) {
            return rule.category;
        }
    }
    OTHER
}

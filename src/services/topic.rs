const CAREER_KEYWORDS: &[&str] = &[
    "career", "job", "role", "skill", "promot", "salary", "pay", "interview", "resume", "cv",
    "manager", "engineer", "developer", "work", "hire", "hiring", "transition", "switch",
    "certif", "portfolio", "mba", "degree", "industry", "company", "team", "position",
    "experience", "learn", "course", "negotiat", "offer", "profession", "intern", "lead",
    "growth", "mentor", "boss", "colleague", "employ", "freelanc", "startup", "study",
];

/// Keyword screen that rejects questions with nothing to do with work.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopicFilter {
    enabled: bool,
}

impl TopicFilter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    pub fn is_career_related(&self, question: &str) -> bool {
        if !self.enabled {
            return true;
        }
        let lowered = question.to_lowercase();
        CAREER_KEYWORDS.iter().any(|kw| lowered.contains(kw))
    }
}

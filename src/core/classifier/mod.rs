//! Query classification
//!
//! Maps a natural-language query onto one of three categories, each of which
//! carries its own provider preference order in the routing configuration.
//! Pure keyword/phrase matching: no I/O, deterministic, safe to call
//! concurrently and unboundedly.

use once_cell::sync::Lazy;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

/// Category a query is routed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Needs current data: dates, deadlines, registrations, recent events
    TimeSensitive,
    /// Asks about the user's own data: progress, scores, completed topics
    AppData,
    /// Everything else
    General,
}

impl QueryCategory {
    /// String tag used in cache keys and usage records
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryCategory::TimeSensitive => "time_sensitive",
            QueryCategory::AppData => "app_data",
            QueryCategory::General => "general",
        }
    }
}

/// Classification result with a confidence score in `[0.0, 1.0]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Winning category
    pub category: QueryCategory,
    /// Matching confidence; 0.0 means no signal either way
    pub confidence: f32,
}

// Phrases that indicate the answer depends on current, real-world data.
static TIME_SENSITIVE_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bwhen\s+(is|are|was|will|does|do)\b",
        r"\bdeadline\b",
        r"\bregistrations?\b",
        r"\bregister\b",
        r"\bapplication\s+(date|form|window)\b",
        r"\bexam\s+(date|schedule|time\s*table)\b",
        r"\bnotification\b",
        r"\bresults?\s+(date|declared|out)\b",
        r"\b(today|tomorrow|yesterday)\b",
        r"\bthis\s+(week|month|year)\b",
        r"\b(latest|current|upcoming|recent)\b",
        r"\bright\s+now\b",
        r"\b20\d{2}\b",
    ])
    .expect("time-sensitive patterns are valid regexes")
});

// First-person possessive / performance phrases pointing at the user's own
// stored data.
static APP_DATA_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"\bmy\s+(progress|score|scores|performance|streak|stats|statistics)\b",
        r"\bmy\s+(topics?|subjects?|chapters?|tests?|revisions?|notes?)\b",
        r"\bmy\s+(study\s+)?(plan|schedule|goals?)\b",
        r"\b(have|did|am)\s+i\b",
        r"\bhow\s+many\s+.{0,40}\b(i|i've|ive)\b",
        r"\bhow\s+am\s+i\s+doing\b",
        r"\bi\s+(completed?|finished|revised|studied|attempted)\b",
        r"\bshow\s+me\s+my\b",
        r"\bwhere\s+(do|did)\s+i\s+(stand|leave)\b",
    ])
    .expect("app-data patterns are valid regexes")
});

/// Classify a message. Ties and no-signal inputs default to
/// [`QueryCategory::General`].
pub fn classify(message: &str) -> Classification {
    let text = message.to_lowercase();

    let time_hits = TIME_SENSITIVE_PATTERNS.matches(&text).iter().count();
    let app_hits = APP_DATA_PATTERNS.matches(&text).iter().count();

    let (category, hits) = if app_hits > time_hits {
        (QueryCategory::AppData, app_hits)
    } else if time_hits > app_hits {
        (QueryCategory::TimeSensitive, time_hits)
    } else {
        (QueryCategory::General, 0)
    };

    // One phrase hit is a weak signal; confidence saturates at three.
    let confidence = match category {
        QueryCategory::General => 0.0,
        _ => (0.4 + 0.2 * hits as f32).min(1.0),
    };

    Classification {
        category,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_sensitive_phrases() {
        for message in [
            "When is the JEE registration deadline?",
            "what is the latest exam schedule for 2025",
            "is the application window open today",
        ] {
            let result = classify(message);
            assert_eq!(
                result.category,
                QueryCategory::TimeSensitive,
                "misclassified: {message}"
            );
            assert!(result.confidence > 0.0);
        }
    }

    #[test]
    fn test_app_data_phrases() {
        for message in [
            "How is my progress in physics?",
            "how many topics have I completed this month in my plan",
            "show me my chapters",
            "did I finish thermodynamics revision?",
        ] {
            let result = classify(message);
            assert_eq!(
                result.category,
                QueryCategory::AppData,
                "misclassified: {message}"
            );
        }
    }

    #[test]
    fn test_general_default() {
        let result = classify("Explain Newton's second law");
        assert_eq!(result.category, QueryCategory::General);
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(classify("").category, QueryCategory::General);
    }

    #[test]
    fn test_deterministic() {
        let message = "when is my next mock test scheduled";
        let first = classify(message);
        for _ in 0..10 {
            assert_eq!(classify(message), first);
        }
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(
            classify("WHEN IS THE DEADLINE?").category,
            classify("when is the deadline?").category
        );
    }

    #[test]
    fn test_confidence_scales_with_hits() {
        let weak = classify("anything recent?");
        let strong = classify("when is the latest registration deadline for the 2026 exam date");
        assert!(strong.confidence > weak.confidence);
        assert!(strong.confidence <= 1.0);
    }
}

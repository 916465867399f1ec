//! Built-in farming guidance used when the advice provider is unavailable
//!
//! Selection is a pure function of the prompt: topics are checked in table
//! order and the first keyword found wins. Keywords match case-insensitively
//! at the start of a word, so "rain" does not fire on "grain".

/// Note attached to canned answers when no advice credential is configured
pub const NOTE_NOT_CONFIGURED: &str =
    "Advice service is not configured; showing built-in farming guidance.";

/// Note attached to canned answers when the advice provider call failed
pub const NOTE_UPSTREAM_FAILED: &str =
    "Advice service is unavailable right now; showing built-in farming guidance.";

/// Note attached when the request carried no question at all
pub const NOTE_EMPTY_PROMPT: &str = "No question was asked; showing general guidance.";

/// Note attached when the request body could not be read as a question
pub const NOTE_UNREADABLE_REQUEST: &str =
    "The question could not be read; showing general guidance.";

/// Answer when no topic keyword matches
pub const GENERIC_GUIDANCE: &str = "Thanks for sharing with the community! \
    Keep notes on what you observe in the field, and neighbours with similar \
    conditions will be able to chime in with what has worked for them.";

/// A topic in the guidance table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topic {
    pub name: &'static str,
    keywords: &'static [&'static str],
    pub guidance: &'static str,
}

const TOPICS: &[Topic] = &[
    Topic {
        name: "soil",
        keywords: &["soil", "acidic", "alkaline", "compost"],
        guidance: "For soil health, start with a soil test: most crops do best at a soil pH \
            between 6.0 and 7.0. Add agricultural lime to raise pH on acidic soil or \
            elemental sulfur to lower it, and work in compost to improve structure and \
            water retention.",
    },
    Topic {
        name: "crop",
        keywords: &["crop", "plant", "rotation", "yield"],
        guidance: "For crop planning, rotate plant families each season, match varieties to \
            your local climate and soil, and keep records of planting dates and yields so \
            you can compare what works year to year.",
    },
    Topic {
        name: "pest",
        keywords: &["pest", "insect", "aphid", "bug", "worm"],
        guidance: "For pest problems, scout your fields weekly and identify the pest before \
            treating. Encourage natural predators, rotate crops to break pest cycles, and \
            use targeted treatments only when damage passes an economic threshold.",
    },
    Topic {
        name: "water",
        keywords: &["water", "irrigat", "drought", "rain"],
        guidance: "For watering, irrigate deeply and less often so roots grow down, ideally \
            early in the morning. Mulch to keep moisture in, and check soil moisture a few \
            centimetres below the surface before watering again.",
    },
    Topic {
        name: "weather",
        keywords: &["weather", "frost", "heat", "storm"],
        guidance: "For weather risks, keep an eye on local forecasts, protect sensitive \
            plants with row covers before frost, and provide shade and extra water during \
            heat waves.",
    },
    Topic {
        name: "fertilizer",
        keywords: &["fertiliz", "fertilis", "nitrogen", "manure", "nutrient"],
        guidance: "For fertilizing, base application rates on a soil test rather than \
            guesswork. Split nitrogen into several smaller doses, and well-rotted manure or \
            cover crops can supply nutrients while building organic matter.",
    },
    Topic {
        name: "harvest",
        keywords: &["harvest", "storage", "ripe"],
        guidance: "For harvesting, pick in the cool of the morning, handle produce gently to \
            avoid bruising, and cool it quickly to extend storage life.",
    },
    Topic {
        name: "seed",
        keywords: &["seed", "germinat", "sow"],
        guidance: "For seeds, sow at the depth recommended on the packet, keep the bed evenly \
            moist until germination, and save seed only from healthy, open-pollinated plants.",
    },
];

/// Find the first topic whose keyword appears in the prompt
pub fn match_topic(prompt: &str) -> Option<&'static Topic> {
    let prompt = prompt.to_lowercase();
    TOPICS
        .iter()
        .find(|topic| topic.keywords.iter().any(|k| starts_word(&prompt, k)))
}

/// `needle` occurs in `haystack` where a word begins
fn starts_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(i, _)| {
        haystack[..i]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}

/// Pick the canned answer for a prompt
pub fn canned_advice(prompt: &str) -> &'static str {
    match_topic(prompt)
        .map(|topic| topic.guidance)
        .unwrap_or(GENERIC_GUIDANCE)
}

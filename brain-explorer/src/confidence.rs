use brain_types::Confidence;

/// Extracts a confidence level from a free-text self-assessment reply (§4.2 step 5).
///
/// Case-insensitive substring match against the documented variants; unmatched text
/// defaults to [`Confidence::Unknown`].
pub fn parse_confidence(text: &str) -> Confidence {
    let lower = text.to_lowercase();
    for (needles, confidence) in [
        (
            ["high confidence", "confidence: high", "confidence is high"].as_slice(),
            Confidence::High,
        ),
        (
            ["medium confidence", "confidence: medium", "confidence is medium"].as_slice(),
            Confidence::Medium,
        ),
        (
            ["low confidence", "confidence: low", "confidence is low"].as_slice(),
            Confidence::Low,
        ),
    ] {
        if needles.iter().any(|n| lower.contains(n)) {
            return confidence;
        }
    }
    Confidence::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_all_documented_variants() {
        assert_eq!(parse_confidence("High confidence, but caveats apply"), Confidence::High);
        assert_eq!(parse_confidence("Confidence: High"), Confidence::High);
        assert_eq!(parse_confidence("My confidence is high here"), Confidence::High);
        assert_eq!(parse_confidence("confidence: medium"), Confidence::Medium);
        assert_eq!(parse_confidence("Low confidence."), Confidence::Low);
    }

    #[test]
    fn defaults_to_unknown() {
        assert_eq!(parse_confidence("I'm not sure what to say here."), Confidence::Unknown);
    }
}

use pinyin::ToPinyin;

const DOUBLE_INITIALS: [&str; 3] = ["zh", "ch", "sh"];
const SINGLE_INITIALS: &str = "bpmfdtnlgkhjqxrzcsyw";

/// A Hanzi reading split into initial, final and tone.
///
/// `final_` is normalised so that `ü` is always spelled `v`, including the
/// `u` written after `j`, `q`, `x` and `y`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllable {
    pub initial: String,
    pub final_: String,
    pub tone: u8,
}

/// Decompose every Hanzi of `source` into a syllable.
/// Characters without a reading (punctuation, latin, digits) are dropped.
pub fn hanzi_syllables(source: &str) -> Vec<(char, Syllable)> {
    let mut syllables = Vec::new();
    for ch in source.chars() {
        let Some(pinyin) = ch.to_pinyin() else {
            continue;
        };
        let Some(syllable) = split_syllable(pinyin.with_tone_num_end()) else {
            continue;
        };
        syllables.push((ch, syllable));
    }
    syllables
}

/// Split a tone-numbered reading such as `"xian4"` or `"lü4"`.
pub fn split_syllable(numbered: &str) -> Option<Syllable> {
    let normalized = numbered.trim().to_lowercase().replace('ü', "v");
    if normalized.is_empty() {
        return None;
    }

    let (body, tone) = match normalized.chars().next_back() {
        Some(last) if last.is_ascii_digit() => (
            &normalized[..normalized.len() - 1],
            last.to_digit(10).unwrap_or(0) as u8,
        ),
        _ => (normalized.as_str(), 0),
    };
    if body.is_empty() {
        return None;
    }

    let initial = DOUBLE_INITIALS
        .iter()
        .find(|candidate| body.starts_with(*candidate))
        .map(|candidate| candidate.to_string())
        .or_else(|| {
            body.chars()
                .next()
                .filter(|first| SINGLE_INITIALS.contains(*first))
                .map(String::from)
        })
        .unwrap_or_default();

    let mut final_ = body[initial.len()..].to_string();
    if matches!(initial.as_str(), "j" | "q" | "x" | "y") && final_.starts_with('u') {
        final_.replace_range(..1, "v");
    }

    Some(Syllable {
        initial,
        final_,
        tone,
    })
}

/// Smallest repeated-phrase length the cleaner looks for.
const MIN_PHRASE_LEN: usize = 2;
/// Largest repeated-phrase length. Longer phrases collapse first so a big
/// repeated block is removed whole before its sub-phrases are considered.
const MAX_PHRASE_LEN: usize = 4;

/// Clean a continuous speech-recognition transcript before it is used as
/// diagnostic input. Browser speech recognition restarts mid-sentence and
/// re-emits what it already heard, producing runs like
/// "שלט אלקטרה שלט אלקטרה שלט אלקטרה".
///
/// Returns `None` for missing, empty, or whitespace-only input; a non-empty
/// input always yields a non-empty output.
pub fn clean_voice_transcript(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    // Step 1: collapse consecutive duplicate words ("the the the pipe").
    let mut words: Vec<&str> = Vec::new();
    for word in raw.split_whitespace() {
        if words.last() != Some(&word) {
            words.push(word);
        }
    }

    // Step 2: remove immediately repeated phrases, longest first.
    for phrase_len in (MIN_PHRASE_LEN..=MAX_PHRASE_LEN).rev() {
        remove_repeated_phrases(&mut words, phrase_len);
    }

    Some(words.join(" "))
}

/// Drop the second copy of any back-to-back repeated phrase of exactly
/// `phrase_len` words, rescanning from the start after each removal until the
/// sequence is clean at this length.
fn remove_repeated_phrases(words: &mut Vec<&str>, phrase_len: usize) {
    loop {
        let mut removed = false;

        if words.len() >= phrase_len * 2 {
            for i in 0..=words.len() - phrase_len * 2 {
                if words[i..i + phrase_len] == words[i + phrase_len..i + phrase_len * 2] {
                    words.drain(i + phrase_len..i + phrase_len * 2);
                    removed = true;
                    break;
                }
            }
        }

        if !removed {
            break;
        }
    }
}

/// Word count used for the before/after log line in the diagnosis pipeline.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

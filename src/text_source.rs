use include_dir::{include_dir, Dir};
use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::Deserialize;

static WORDS_DIR: Dir = include_dir!("src/words");

/// Shown whenever a paragraph cannot be fetched.
pub const FALLBACK_TEXT: &str =
    "Typing improves speed and accuracy with regular practice.";

/// Word count requested per paragraph unless overridden.
pub const DEFAULT_WORD_COUNT: usize = 90;

#[cfg(feature = "network")]
const WORD_API_URL: &str = "https://random-word-api.herokuapp.com/word";

/// Supplies the paragraph for a session. Implementations are total: any
/// failure is absorbed into `FALLBACK_TEXT`, never surfaced to the caller.
pub trait TextSource {
    fn fetch_text(&self) -> String;
}

/// Fetches pseudo-random words from the word API and joins them with
/// single spaces. One attempt, 10 second timeout, no retries.
pub struct ApiTextSource {
    pub number_of_words: usize,
}

impl ApiTextSource {
    pub fn new(number_of_words: usize) -> Self {
        Self { number_of_words }
    }

    #[cfg(feature = "network")]
    fn try_fetch(&self) -> Option<String> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .ok()?;
        let url = format!("{}?number={}", WORD_API_URL, self.number_of_words);
        let response = client.get(&url).send().ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().ok()?;
        let words: Vec<String> = serde_json::from_str(&body).ok()?;
        if words.is_empty() {
            return None;
        }
        Some(words.iter().join(" "))
    }

    #[cfg(not(feature = "network"))]
    fn try_fetch(&self) -> Option<String> {
        None
    }
}

impl TextSource for ApiTextSource {
    fn fetch_text(&self) -> String {
        self.try_fetch()
            .unwrap_or_else(|| FALLBACK_TEXT.to_string())
    }
}

/// An embedded word list, same schema as the fetched API response plus
/// metadata.
#[derive(Deserialize, Clone, Debug)]
pub struct WordList {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl WordList {
    pub fn load(name: &str) -> Option<Self> {
        let file = WORDS_DIR.get_file(format!("{name}.json"))?;
        let contents = file.contents_utf8()?;
        serde_json::from_str(contents).ok()
    }
}

/// Picks random words from the embedded list; the offline counterpart of
/// `ApiTextSource`.
pub struct BuiltinTextSource {
    pub number_of_words: usize,
}

impl BuiltinTextSource {
    pub fn new(number_of_words: usize) -> Self {
        Self { number_of_words }
    }
}

impl TextSource for BuiltinTextSource {
    fn fetch_text(&self) -> String {
        let Some(list) = WordList::load("english") else {
            return FALLBACK_TEXT.to_string();
        };
        let mut rng = rand::thread_rng();
        let text = (0..self.number_of_words)
            .filter_map(|_| list.words.choose(&mut rng))
            .join(" ");
        if text.is_empty() {
            FALLBACK_TEXT.to_string()
        } else {
            text
        }
    }
}

use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Words served when no server is configured
const BUILTIN_WORDS: [&str; 50] = [
    "apple", "banana", "cat", "dog", "elephant", "fish", "grape", "hat", "ice", "jungle",
    "kite", "lemon", "monkey", "notebook", "orange", "piano", "queen", "rabbit", "sun", "tree",
    "umbrella", "violin", "wolf", "xylophone", "yarn", "zebra", "computer", "keyboard", "mouse",
    "screen", "internet", "website", "programming", "algorithm", "database", "network",
    "security", "encryption", "protocol", "server", "client", "framework", "library", "function",
    "variable", "constant", "parameter", "argument", "statement", "expression",
];

#[derive(Debug, Error)]
pub enum WordSourceError {
    #[error("Failed to reach word source: {0}")]
    Request(#[from] minreq::Error),

    #[error("Word source answered with status {status}: {reason}")]
    Status { status: i32, reason: String },

    #[error("Failed to parse words: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("No words returned from source")]
    EmptyOutput,
}

/// Supplies the words of a passage
pub trait WordSource {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError>;

    /// Short description for logs and the UI
    fn name(&self) -> &str;
}

/// Random words from a fixed list, without repeats
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinWordSource;

impl WordSource for BuiltinWordSource {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        let words: Vec<String> = BUILTIN_WORDS
            .choose_multiple(&mut rand::thread_rng(), count.min(BUILTIN_WORDS.len()))
            .map(|word| (*word).to_string())
            .collect();

        non_empty(words)
    }

    fn name(&self) -> &str {
        "builtin"
    }
}

#[derive(Deserialize)]
struct WordsResponse {
    words: Vec<String>,
}

/// `GET {url}/words?count=N` answering `{"words": [...]}`
#[derive(Debug, Clone)]
pub struct HttpWordSource {
    url: String,
    timeout_seconds: u64,
}

impl HttpWordSource {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        Self {
            url: format!("{}/words", base_url.trim_end_matches('/')),
            timeout_seconds,
        }
    }
}

impl WordSource for HttpWordSource {
    fn fetch(&self, count: usize) -> Result<Vec<String>, WordSourceError> {
        debug!(url = %self.url, count, "fetching words");

        let response = minreq::get(&self.url)
            .with_param("count", count.to_string())
            .with_timeout(self.timeout_seconds)
            .send()?;

        parse_words(response.status_code, &response.reason_phrase, response.as_str()?)
    }

    fn name(&self) -> &str {
        &self.url
    }
}

fn parse_words(status: i32, reason: &str, body: &str) -> Result<Vec<String>, WordSourceError> {
    if !(200..300).contains(&status) {
        return Err(WordSourceError::Status {
            status,
            reason: reason.to_string(),
        });
    }

    let WordsResponse { words } = serde_json::from_str(body)?;
    non_empty(words.into_iter().filter(|word| !word.trim().is_empty()).collect())
}

fn non_empty(words: Vec<String>) -> Result<Vec<String>, WordSourceError> {
    if words.is_empty() {
        Err(WordSourceError::EmptyOutput)
    } else {
        Ok(words)
    }
}

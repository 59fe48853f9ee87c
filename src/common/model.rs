use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A named category grouping articles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Channel {
    pub id: i64,
    pub name: String,
}

/// A fetched web page, with the number of words it had when it was fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub url: String,
    pub channel_id: i64,
    pub word_count: i64,
}

/// Inclusive bounds on the word count of the listed articles
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct WordCountFilter {
    pub min_words: Option<i64>,
    pub max_words: Option<i64>,
}

impl WordCountFilter {
    pub fn new(min_words: Option<i64>, max_words: Option<i64>) -> Self {
        WordCountFilter {
            min_words,
            max_words,
        }
    }
}

/// Article waiting to be fetched and inserted
#[derive(Debug, Clone, Deserialize)]
pub struct NewArticle {
    pub url: String,
    pub channel_id: i64,
}

use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::common::articles;
use crate::common::errors::StoreError;
use crate::common::model::{Article, NewArticle};
use crate::common::word_count::WordCounter;
use crate::common::Pool;

/// Runs article creations outside of the request asking for them.
///
/// The outcome of a job is only logged, callers find out about a failure when the
/// article they are waiting for never shows up.
#[derive(Clone)]
pub struct ArticleJobs {
    db: Pool,
    word_counter: WordCounter,
}

impl ArticleJobs {
    pub fn new(db: Pool, word_counter: WordCounter) -> Self {
        ArticleJobs { db, word_counter }
    }

    /// Spawn the fetch and insertion of an article and return right away.
    pub fn submit(&self, new_article: NewArticle) -> JoinHandle<Result<Article, StoreError>> {
        let job_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "article_job",
            %job_id,
            url = %new_article.url,
            channel_id = new_article.channel_id
        );
        let jobs = self.clone();

        let job = async move {
            let result = articles::create_article(
                &jobs.db,
                &jobs.word_counter,
                &new_article.url,
                new_article.channel_id,
            )
            .await;

            match &result {
                Ok(article) => tracing::info!(
                    "Article {} created with {} words",
                    article.id,
                    article.word_count
                ),
                Err(error) => tracing::warn!("Article creation failed: {}", error),
            }

            result
        };

        tokio::spawn(job.instrument(span))
    }
}

use crate::db::{QueryError, QueryExecutor, ResultSet};
use crate::llm::{LlmError, Translator};
use tracing::info;

/// The outcome of one question: the SQL the model produced and what
/// running it gave.
#[derive(Debug)]
pub struct Answer {
    pub question: String,
    pub sql: String,
    pub outcome: Result<ResultSet, QueryError>,
}

/// Question in, rows out: translate, then execute against the database.
pub struct Text2Sql {
    translator: Translator,
    executor: QueryExecutor,
}

impl Text2Sql {
    pub fn new(translator: Translator, executor: QueryExecutor) -> Self {
        Self {
            translator,
            executor,
        }
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.executor
    }

    /// Fails only when translation fails; execution failures are carried
    /// in [`Answer::outcome`].
    pub async fn ask(&self, question: &str) -> Result<Answer, LlmError> {
        let sql = self.translator.translate(question).await?;
        info!("Generated SQL Query: {}", sql);

        let outcome = self.executor.execute_blocking(sql.clone()).await;

        Ok(Answer {
            question: question.to_string(),
            sql,
            outcome,
        })
    }
}

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use examprep_server::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{Attempt, Exam, UserStats},
    repositories::{AttemptRepository, ExamRepository, UserStatsRepository, WriteOutcome},
};

pub struct InMemoryAttemptRepository {
    attempts: Arc<RwLock<Vec<Attempt>>>,
}

impl InMemoryAttemptRepository {
    pub fn new() -> Self {
        Self {
            attempts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn count(&self) -> usize {
        self.attempts.read().await.len()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        let mut attempts = self.attempts.write().await;
        if attempts.iter().any(|a| a.id == attempt.id) {
            return Err(AppError::AlreadyExists(format!(
                "Attempt with id '{}' already exists",
                attempt.id
            )));
        }
        attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempts = self.attempts.read().await;
        Ok(attempts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_recent_by_user(&self, user_id: &str, limit: i64) -> AppResult<Vec<Attempt>> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        items.truncate(limit.max(0) as usize);
        Ok(items)
    }

    async fn find_all_by_user(&self, user_id: &str) -> AppResult<Vec<Attempt>> {
        let attempts = self.attempts.read().await;
        let mut items: Vec<_> = attempts
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.finished_at.cmp(&b.finished_at));
        Ok(items)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Stats store with the same conditional-write contract as the Mongo one.
/// `fail_next_writes` makes the next N writes fail as if the store were down.
pub struct InMemoryUserStatsRepository {
    stats: Arc<RwLock<HashMap<String, UserStats>>>,
    failing_writes: AtomicUsize,
    conflicts: AtomicUsize,
}

impl InMemoryUserStatsRepository {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(HashMap::new())),
            failing_writes: AtomicUsize::new(0),
            conflicts: AtomicUsize::new(0),
        }
    }

    pub fn fail_next_writes(&self, n: usize) {
        self.failing_writes.store(n, Ordering::SeqCst);
    }

    pub fn conflicts(&self) -> usize {
        self.conflicts.load(Ordering::SeqCst)
    }

    pub async fn stored(&self, user_id: &str) -> Option<UserStats> {
        self.stats.read().await.get(user_id).cloned()
    }

    fn take_failure(&self) -> AppResult<()> {
        let pending = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match pending {
            Ok(_) => Err(AppError::PersistenceError(
                "simulated store outage".to_string(),
            )),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait]
impl UserStatsRepository for InMemoryUserStatsRepository {
    async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<UserStats>> {
        Ok(self.stats.read().await.get(user_id).cloned())
    }

    async fn insert_new(&self, stats: &UserStats) -> AppResult<WriteOutcome> {
        self.take_failure()?;
        let mut all = self.stats.write().await;
        if all.contains_key(&stats.user_id) {
            self.conflicts.fetch_add(1, Ordering::SeqCst);
            return Ok(WriteOutcome::Conflict);
        }
        all.insert(stats.user_id.clone(), stats.clone());
        Ok(WriteOutcome::Committed)
    }

    async fn replace_if_version(
        &self,
        stats: &UserStats,
        expected_version: i64,
    ) -> AppResult<WriteOutcome> {
        self.take_failure()?;
        let mut all = self.stats.write().await;
        match all.get(&stats.user_id) {
            Some(current) if current.version == expected_version => {
                all.insert(stats.user_id.clone(), stats.clone());
                Ok(WriteOutcome::Committed)
            }
            _ => {
                self.conflicts.fetch_add(1, Ordering::SeqCst);
                Ok(WriteOutcome::Conflict)
            }
        }
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryExamRepository {
    exams: Vec<Exam>,
}

impl InMemoryExamRepository {
    pub fn new(exams: Vec<Exam>) -> Self {
        Self { exams }
    }
}

#[async_trait]
impl ExamRepository for InMemoryExamRepository {
    async fn find_by_slugs(&self, slugs: &[String]) -> AppResult<Vec<Exam>> {
        Ok(self
            .exams
            .iter()
            .filter(|e| slugs.contains(&e.exam_id))
            .cloned()
            .collect())
    }
}

pub fn make_exam(slug: &str, title: &str) -> Exam {
    Exam {
        id: format!("exam-doc-{}", slug),
        exam_id: slug.to_string(),
        exam_type_id: "certification".to_string(),
        title: title.to_string(),
        question_count: 10,
        time_limit_sec: 900,
    }
}

pub fn test_config() -> Config {
    let mut config = Config::from_env();
    config.stats_max_cas_retries = 32;
    config.stats_retry_attempts = 2;
    config.stats_retry_backoff_ms = 0;
    config
}

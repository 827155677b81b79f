//! Saved relaxation-session plans, one JSON blob under the `sessions`
//! key. An empty store is seeded with the default plans the first time
//! it is read.

use std::sync::Arc;

use log::warn;

use crate::models::session_plan::{default_plans, SessionPlan};
use crate::storage::{KeyValue, PersistenceError};

const SESSIONS_KEY: &str = "sessions";

#[derive(Clone)]
pub struct SessionPlans {
    kv: Arc<dyn KeyValue>,
}

impl SessionPlans {
    pub fn new(kv: Arc<dyn KeyValue>) -> Self {
        Self { kv }
    }

    /// All plans. Seeds and persists the defaults when nothing usable is
    /// stored yet.
    pub async fn list(&self) -> Result<Vec<SessionPlan>, PersistenceError> {
        if let Some(raw) = self.kv.get(SESSIONS_KEY).await? {
            match serde_json::from_str(&raw) {
                Ok(plans) => return Ok(plans),
                Err(err) => {
                    warn!("Discarding unreadable session plans blob: {err}");
                }
            }
        }
        let seeded = default_plans();
        self.write_all(&seeded).await?;
        Ok(seeded)
    }

    pub async fn get(&self, id: &str) -> Result<Option<SessionPlan>, PersistenceError> {
        Ok(self.list().await?.into_iter().find(|plan| plan.id == id))
    }

    pub async fn create(&self, plan: SessionPlan) -> Result<(), PersistenceError> {
        let mut plans = self.list().await?;
        plans.push(plan);
        self.write_all(&plans).await
    }

    pub async fn remove(&self, id: &str) -> Result<bool, PersistenceError> {
        let mut plans = self.list().await?;
        let before = plans.len();
        plans.retain(|plan| plan.id != id);
        if plans.len() == before {
            return Ok(false);
        }
        self.write_all(&plans).await?;
        Ok(true)
    }

    /// Bump the completion counter after a finished session.
    pub async fn record_completion(&self, id: &str) -> Result<(), PersistenceError> {
        let mut plans = self.list().await?;
        if let Some(plan) = plans.iter_mut().find(|plan| plan.id == id) {
            plan.completed = plan.completed.saturating_add(1);
            self.write_all(&plans).await?;
        }
        Ok(())
    }

    async fn write_all(&self, plans: &[SessionPlan]) -> Result<(), PersistenceError> {
        let blob = serde_json::to_string(plans)
            .map_err(|err| PersistenceError::Write(err.to_string()))?;
        self.kv.set(SESSIONS_KEY, blob).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemoryKv;

    fn store() -> SessionPlans {
        SessionPlans::new(Arc::new(MemoryKv::default()))
    }

    #[tokio::test]
    async fn empty_store_seeds_the_default_plans() {
        let plans = store();
        let listed = plans.list().await.unwrap();
        let titles: Vec<&str> = listed.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Morning Meditation", "Stress Relief", "Deep Sleep"]
        );
        // Seeding persists, so ids stay stable across reads.
        assert_eq!(plans.list().await.unwrap(), listed);
    }

    #[tokio::test]
    async fn create_and_remove_round_trip() {
        let plans = store();
        let custom = SessionPlan::new("Evening Wind-down".into(), 5, "Weekdays".into());
        plans.create(custom.clone()).await.unwrap();

        let listed = plans.list().await.unwrap();
        assert_eq!(listed.last(), Some(&custom));

        assert!(plans.remove(&custom.id).await.unwrap());
        assert!(!plans.remove(&custom.id).await.unwrap());
        assert_eq!(plans.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn completions_accumulate() {
        let plans = store();
        let id = plans.list().await.unwrap()[0].id.clone();
        plans.record_completion(&id).await.unwrap();
        plans.record_completion(&id).await.unwrap();
        assert_eq!(plans.get(&id).await.unwrap().unwrap().completed, 2);
        // Unknown ids are ignored.
        plans.record_completion("nope").await.unwrap();
    }
}

use std::future::Future;

use uuid::Uuid;

/// The authenticated principal a mutation is attributed to.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: Uuid,
    pub email: String,
}

tokio::task_local! {
    static CURRENT_ACTOR: Option<Actor>;
}

/// Run `fut` with `actor` as the current actor. The value is stored in
/// task-local storage, so concurrent requests on other tasks never observe
/// it, and it vanishes when the scope (one request) ends.
pub async fn scope<F>(actor: Option<Actor>, fut: F) -> F::Output
where
    F: Future,
{
    CURRENT_ACTOR.scope(actor, fut).await
}

/// Current actor, if any. Outside a scope (system/background work) this is
/// None, which is a valid state, not an error.
pub fn current() -> Option<Actor> {
    CURRENT_ACTOR.try_with(|actor| actor.clone()).ok().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(email: &str) -> Actor {
        Actor { user_id: Uuid::new_v4(), email: email.to_string() }
    }

    #[tokio::test]
    async fn absent_outside_scope() {
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn visible_inside_scope_and_cleared_after() {
        let alice = actor("alice@acme.test");
        scope(Some(alice), async {
            assert_eq!(current().unwrap().email, "alice@acme.test");
        })
        .await;
        assert!(current().is_none());
    }

    #[tokio::test]
    async fn concurrent_tasks_never_observe_each_others_actor() {
        // Both tasks repeatedly yield so their polls interleave; each must
        // still read its own actor on every wakeup.
        async fn assert_actor_sticks(email: &str) {
            for _ in 0..50 {
                tokio::task::yield_now().await;
                assert_eq!(current().unwrap().email, email);
            }
        }

        let a = tokio::spawn(scope(Some(actor("a@acme.test")), assert_actor_sticks("a@acme.test")));
        let b = tokio::spawn(scope(Some(actor("b@umbrella.test")), assert_actor_sticks("b@umbrella.test")));

        let (ra, rb) = futures::future::join(a, b).await;
        ra.unwrap();
        rb.unwrap();
    }
}

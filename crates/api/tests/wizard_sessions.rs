//! Tests for the wizard session registry.

use std::sync::Arc;
use std::time::Duration;

use onboard_api::sessions::{start_session_sweeper, WizardSessions, FINISHED_SESSION_GRACE};
use onboard_core::gateway::memory::InMemoryGateway;
use onboard_core::types::FieldId;
use onboard_core::wizard::Wizard;

#[tokio::test]
async fn open_get_close_lifecycle() {
    let sessions = WizardSessions::new();
    let id = sessions.open(Wizard::new(Vec::new()).unwrap()).await;
    assert_eq!(sessions.count().await, 1);

    let handle = sessions.get(id).await.expect("session should be open");
    assert_eq!(handle.lock().await.active_step(), 0);

    assert!(sessions.close(id).await);
    assert!(sessions.get(id).await.is_none());
    assert!(!sessions.close(id).await);
    assert_eq!(sessions.count().await, 0);
}

#[tokio::test]
async fn sessions_are_independent() {
    let sessions = WizardSessions::new();
    let a = sessions.open(Wizard::new(Vec::new()).unwrap()).await;
    let b = sessions.open(Wizard::new(Vec::new()).unwrap()).await;
    assert_ne!(a, b);

    sessions
        .get(a)
        .await
        .unwrap()
        .lock()
        .await
        .set_answer(&FieldId::from("email"), "ada@example.com")
        .unwrap();

    let other = sessions.get(b).await.unwrap();
    assert_eq!(other.lock().await.view().email, "");
    assert_eq!(sessions.count().await, 2);
}

// ---------------------------------------------------------------------------
// Idle pruning
// ---------------------------------------------------------------------------

const IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

#[tokio::test(start_paused = true)]
async fn idle_sessions_are_pruned_and_touched_ones_kept() {
    let sessions = WizardSessions::new();
    let touched = sessions.open(Wizard::new(Vec::new()).unwrap()).await;
    let idle = sessions.open(Wizard::new(Vec::new()).unwrap()).await;

    tokio::time::advance(Duration::from_secs(20 * 60)).await;
    assert!(sessions.get(touched).await.is_some());
    tokio::time::advance(Duration::from_secs(15 * 60)).await;

    assert_eq!(sessions.prune_idle(IDLE_TIMEOUT).await, 1);
    assert!(sessions.get(touched).await.is_some());
    assert!(sessions.get(idle).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn session_in_use_is_not_pruned() {
    let sessions = WizardSessions::new();
    let id = sessions.open(Wizard::new(Vec::new()).unwrap()).await;
    let handle = sessions.get(id).await.unwrap();
    let guard = handle.lock().await;

    tokio::time::advance(IDLE_TIMEOUT).await;
    assert_eq!(sessions.prune_idle(IDLE_TIMEOUT).await, 0);

    drop(guard);
    assert_eq!(sessions.prune_idle(IDLE_TIMEOUT).await, 1);
    assert_eq!(sessions.count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn finished_sessions_are_pruned_after_grace() {
    let store = InMemoryGateway::new();
    let mut finished = Wizard::new(Vec::new()).unwrap();
    finished.set_credentials("ada@example.com", "secret").unwrap();
    finished.submit(&store).await.unwrap();
    assert!(finished.is_terminal());

    let sessions = WizardSessions::new();
    let done = sessions.open(finished).await;
    let active = sessions.open(Wizard::new(Vec::new()).unwrap()).await;

    tokio::time::advance(FINISHED_SESSION_GRACE).await;
    assert_eq!(sessions.prune_idle(IDLE_TIMEOUT).await, 1);
    assert!(sessions.get(done).await.is_none());
    assert!(sessions.get(active).await.is_some());
}

#[tokio::test(start_paused = true)]
async fn sweeper_prunes_in_the_background() {
    let sessions = Arc::new(WizardSessions::new());
    sessions.open(Wizard::new(Vec::new()).unwrap()).await;

    let handle = start_session_sweeper(
        Arc::clone(&sessions),
        Duration::from_secs(5),
        Duration::from_secs(1),
    );
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(sessions.count().await, 0);

    handle.abort();
}

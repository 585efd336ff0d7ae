use super::*;
use laminar_core::JobName;

fn id() -> RunId {
    RunId::new(JobName::new("hello"), 1)
}

#[tokio::test]
async fn a_single_waiter_is_notified_with_the_final_result() {
    let mut waiters = Waiters::new();
    let rx = waiters.register(id());
    waiters.notify(&id(), RunState::Success);
    assert_eq!(rx.await.unwrap(), RunState::Success);
}

#[tokio::test]
async fn multiple_waiters_on_the_same_run_all_see_the_result() {
    let mut waiters = Waiters::new();
    let a = waiters.register(id());
    let b = waiters.register(id());
    waiters.notify(&id(), RunState::Failed);
    assert_eq!(a.await.unwrap(), RunState::Failed);
    assert_eq!(b.await.unwrap(), RunState::Failed);
}

#[test]
fn notifying_an_unregistered_run_is_a_no_op() {
    let mut waiters = Waiters::new();
    waiters.notify(&id(), RunState::Success);
}

#[tokio::test]
async fn a_dropped_receiver_does_not_panic_on_notify() {
    let mut waiters = Waiters::new();
    let rx = waiters.register(id());
    drop(rx);
    waiters.notify(&id(), RunState::Success);
}

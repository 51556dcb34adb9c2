// tests/group_fail_fast.rs

//! Group semantics exercised against a fake launcher, so no real processes
//! are involved and paused time keeps the timing deterministic.

use std::error::Error;
use std::time::Duration;

use procgroup::{CommandSpec, ProcessGroup, Scope, ScopeEnd};
use procgroup_test_utils::fake_launcher::{Behaviour, FakeLauncher, Observed};
use procgroup_test_utils::init_tracing;

type TestResult = Result<(), Box<dyn Error>>;

fn cmd(name: &str) -> CommandSpec {
    CommandSpec::new(name, Duration::ZERO, Vec::<String>::new())
}

fn cmd_with_timeout(name: &str, timeout: Duration) -> CommandSpec {
    CommandSpec::new(name, timeout, Vec::<String>::new())
}

#[tokio::test(start_paused = true)]
async fn all_commands_succeed() -> TestResult {
    init_tracing();

    let launcher = FakeLauncher::new()
        .with("a", Behaviour::Succeed(Duration::from_millis(10)))
        .with("b", Behaviour::Succeed(Duration::from_millis(30)))
        .with("c", Behaviour::Succeed(Duration::ZERO));
    let journal = launcher.journal();
    let group = ProcessGroup::new(launcher);

    group
        .run(&Scope::new(), vec![cmd("a"), cmd("b"), cmd("c")])
        .await?;

    let mut entries = journal.entries();
    entries.sort_by(|x, y| x.0.cmp(&y.0));
    assert_eq!(
        entries,
        vec![
            ("a".to_string(), Observed::Succeeded),
            ("b".to_string(), Observed::Succeeded),
            ("c".to_string(), Observed::Succeeded),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn empty_group_is_ok() -> TestResult {
    init_tracing();

    let launcher = FakeLauncher::new();
    let journal = launcher.journal();
    ProcessGroup::new(launcher).run(&Scope::new(), vec![]).await?;

    assert!(journal.entries().is_empty());
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn first_failure_kills_siblings() {
    init_tracing();

    let launcher = FakeLauncher::new()
        .with("fails", Behaviour::Exit { after: Duration::from_millis(10), code: 3 })
        .with("hang1", Behaviour::Hang)
        .with("hang2", Behaviour::Hang);
    let journal = launcher.journal();
    let group = ProcessGroup::new(launcher);

    let err = group
        .run(&Scope::new(), vec![cmd("hang1"), cmd("fails"), cmd("hang2")])
        .await
        .expect_err("group with a failing command must fail");

    match err {
        procgroup::ProcGroupError::Exited { ref command, code } => {
            assert_eq!(command, "fails");
            assert_eq!(code, 3);
        }
        other => panic!("expected Exited error, got {other:?}"),
    }

    assert_eq!(journal.outcome_of("fails"), Some(Observed::Exited(3)));
    assert_eq!(
        journal.outcome_of("hang1"),
        Some(Observed::Killed(ScopeEnd::Cancelled))
    );
    assert_eq!(
        journal.outcome_of("hang2"),
        Some(Observed::Killed(ScopeEnd::Cancelled))
    );
}

#[tokio::test(start_paused = true)]
async fn launch_failure_is_reported() {
    init_tracing();

    let launcher = FakeLauncher::new()
        .with("missing", Behaviour::LaunchError)
        .with("ok", Behaviour::Succeed(Duration::ZERO));
    let group = ProcessGroup::new(launcher);

    let err = group
        .run(&Scope::new(), vec![cmd("ok"), cmd("missing")])
        .await
        .expect_err("launch failure must surface");

    assert!(err.is_launch(), "expected launch error, got {err:?}");
    assert_eq!(err.command(), Some("missing"));
}

#[tokio::test(start_paused = true)]
async fn timeout_fails_group_and_kills_siblings() {
    init_tracing();

    let launcher = FakeLauncher::new()
        .with("timed", Behaviour::Hang)
        .with("plain", Behaviour::Hang);
    let journal = launcher.journal();
    let group = ProcessGroup::new(launcher);

    let start = tokio::time::Instant::now();
    let err = group
        .run(
            &Scope::new(),
            vec![cmd_with_timeout("timed", Duration::from_secs(1)), cmd("plain")],
        )
        .await
        .expect_err("timeout must fail the group");

    assert!(err.is_timeout(), "expected timeout error, got {err:?}");
    assert_eq!(err.command(), Some("timed"));
    assert!(start.elapsed() >= Duration::from_secs(1));
    assert!(start.elapsed() < Duration::from_secs(2));

    assert_eq!(
        journal.outcome_of("timed"),
        Some(Observed::Killed(ScopeEnd::DeadlineExceeded))
    );
    assert_eq!(
        journal.outcome_of("plain"),
        Some(Observed::Killed(ScopeEnd::Cancelled))
    );
}

#[tokio::test(start_paused = true)]
async fn caller_cancellation_stops_everything() {
    init_tracing();

    let launcher = FakeLauncher::new()
        .with("a", Behaviour::Hang)
        .with("b", Behaviour::Hang);
    let journal = launcher.journal();
    let group = ProcessGroup::new(launcher);

    let scope = Scope::new();
    {
        let scope = scope.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            scope.cancel();
        });
    }

    let err = group
        .run(&scope, vec![cmd("a"), cmd("b")])
        .await
        .expect_err("caller cancellation must surface");

    assert!(err.is_cancelled());
    assert!(!err.is_timeout());
    for name in ["a", "b"] {
        assert_eq!(
            journal.outcome_of(name),
            Some(Observed::Killed(ScopeEnd::Cancelled))
        );
    }
}

#[tokio::test]
async fn cancelled_scope_launches_nothing() {
    init_tracing();

    let launcher = FakeLauncher::new().with("a", Behaviour::Succeed(Duration::ZERO));
    let journal = launcher.journal();
    let group = ProcessGroup::new(launcher);

    let scope = Scope::new();
    scope.cancel();

    let err = group
        .run(&scope, vec![cmd("a")])
        .await
        .expect_err("cancelled scope must fail");

    assert!(err.is_cancelled());
    assert_eq!(
        journal.outcome_of("a"),
        Some(Observed::Killed(ScopeEnd::Cancelled))
    );
}

#[tokio::test(start_paused = true)]
async fn outer_deadline_bounds_commands_without_timeout() {
    init_tracing();

    let group = ProcessGroup::new(FakeLauncher::new().with("a", Behaviour::Hang));

    let scope = Scope::with_timeout(Duration::from_millis(100));
    let err = group
        .run(&scope, vec![cmd("a")])
        .await
        .expect_err("outer deadline must fail the group");

    assert!(err.is_timeout(), "expected timeout error, got {err:?}");
}

#[tokio::test(start_paused = true)]
async fn failure_does_not_cancel_caller_scope() {
    init_tracing();

    let group = ProcessGroup::new(
        FakeLauncher::new().with("bad", Behaviour::Exit { after: Duration::ZERO, code: 1 }),
    );

    let scope = Scope::new();
    let res = group.run(&scope, vec![cmd("bad")]).await;

    assert!(res.is_err());
    assert!(!scope.is_cancelled());
    assert_eq!(scope.end(), None);
}

#[tokio::test(start_paused = true)]
async fn earliest_failure_wins() {
    init_tracing();

    let launcher = FakeLauncher::new()
        .with("early", Behaviour::Exit { after: Duration::from_millis(10), code: 1 })
        .with("late", Behaviour::Exit { after: Duration::from_millis(500), code: 2 });
    let journal = launcher.journal();
    let group = ProcessGroup::new(launcher);

    let err = group
        .run(&Scope::new(), vec![cmd("late"), cmd("early")])
        .await
        .expect_err("group must fail");

    assert_eq!(err.command(), Some("early"));
    // The later command never got to exit on its own.
    assert_eq!(
        journal.outcome_of("late"),
        Some(Observed::Killed(ScopeEnd::Cancelled))
    );
}

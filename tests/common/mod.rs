//! Test utilities for navigation tests
//!
//! Provides the demo route table, counting and gated lazy loaders, and a
//! listener that records every event it sees.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use view_navigator::*;

/// Demo application routes: three eager pages, two lazy ones, an
/// instructor page and a parameterized course page.
pub fn demo_table() -> RouteTable {
    demo_table_with(
        lazy_view("StudentDashboard"),
        lazy_view("FeedbackForm"),
    )
}

/// Demo routes with custom loaders for the two lazy pages.
pub fn demo_table_with(dashboard: ViewLoader, feedback: ViewLoader) -> RouteTable {
    RouteTable::register(vec![
        RouteDefinition::new("/", "home", ViewLoader::eager("HomeView")),
        RouteDefinition::new("/signup", "signup", ViewLoader::eager("SignUp")),
        RouteDefinition::new("/signin", "signin", ViewLoader::eager("SignIn")),
        RouteDefinition::new("/dashboard", "dashboard", dashboard),
        RouteDefinition::new("/feedback", "feedback", feedback),
        RouteDefinition::new(
            "/instructor/insights",
            "insights",
            ViewLoader::eager("InstructorInsights"),
        ),
        RouteDefinition::new("/courses/:courseId", "course", ViewLoader::eager("Course")),
    ])
    .expect("demo table is valid")
}

/// Lazy loader that always succeeds.
pub fn lazy_view(name: &'static str) -> ViewLoader {
    ViewLoader::lazy(move || async move { Ok::<_, LoadError>(ViewRef::new(name)) })
}

/// Lazy loader counting its productions. The first `fail_first` fail.
pub fn counting_view(name: &'static str, calls: Arc<AtomicUsize>, fail_first: usize) -> ViewLoader {
    ViewLoader::lazy(move || {
        let n = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n < fail_first {
                Err::<ViewRef, LoadError>(format!("{name}: chunk fetch failed").into())
            } else {
                Ok(ViewRef::new(name))
            }
        }
    })
}

/// Handles controlling a [`Latch`].
pub struct Gate {
    /// Fires when the first caller reaches the latch
    pub started: oneshot::Receiver<()>,
    /// Lets that caller continue
    pub release: oneshot::Sender<()>,
}

/// Holds back the first caller of [`Latch::enter`] until its [`Gate`] is
/// released. Later callers pass straight through.
pub struct Latch {
    started: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<()>>>,
}

impl Latch {
    /// Future that waits for the gate on the first call only.
    pub fn enter(&self) -> impl Future<Output = ()> + Send + 'static {
        let started = self.started.lock().take();
        let release = self.release.lock().take();
        async move {
            if let Some(started) = started {
                let _ = started.send(());
            }
            if let Some(release) = release {
                let _ = release.await;
            }
        }
    }
}

/// Create a latch and the gate controlling it.
pub fn latch() -> (Arc<Latch>, Gate) {
    let (started_tx, started_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let latch = Latch {
        started: Mutex::new(Some(started_tx)),
        release: Mutex::new(Some(release_rx)),
    };
    (
        Arc::new(latch),
        Gate {
            started: started_rx,
            release: release_tx,
        },
    )
}

/// Lazy loader whose first production blocks until released.
pub fn gated_view(name: &'static str) -> (ViewLoader, Gate) {
    let (latch, gate) = latch();
    let loader = ViewLoader::lazy(move || {
        let wait = latch.enter();
        async move {
            wait.await;
            Ok::<_, LoadError>(ViewRef::new(name))
        }
    });
    (loader, gate)
}

/// Lazy loader whose first production blocks until released, then fails.
pub fn gated_failing_view(reason: &'static str) -> (ViewLoader, Gate) {
    let (latch, gate) = latch();
    let loader = ViewLoader::lazy(move || {
        let wait = latch.enter();
        async move {
            wait.await;
            Err::<ViewRef, LoadError>(reason.into())
        }
    });
    (loader, gate)
}

/// Listener keeping every commit and not-found notification.
#[derive(Clone, Default)]
pub struct Recorder {
    pub committed: Arc<Mutex<Vec<RouteChangeEvent>>>,
    pub not_found: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destination paths of all commits so far.
    pub fn committed_paths(&self) -> Vec<String> {
        self.committed.lock().iter().map(|e| e.to.clone()).collect()
    }
}

impl NavigationListener for Recorder {
    fn on_committed(&self, event: &RouteChangeEvent) {
        self.committed.lock().push(event.clone());
    }

    fn on_not_found(&self, path: &str) {
        self.not_found.lock().push(path.to_string());
    }

    fn name(&self) -> &'static str {
        "Recorder"
    }
}

/// Guard counting its invocations and returning a fixed result.
pub fn counted_guard(counter: Arc<AtomicUsize>, result: GuardResult) -> impl RouteGuard {
    guard_fn(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        result.clone()
    })
}

/// Assert that route parameters contain expected key-value pair
pub fn assert_param_equals(params: &RouteParams, key: &str, expected: &str) {
    let value = params.get(key);
    assert!(
        value.is_some(),
        "Parameter '{}' not found in RouteParams",
        key
    );
    assert_eq!(
        value.unwrap(),
        expected,
        "Parameter '{}' has wrong value",
        key
    );
}

/// Assert the committed path of a router.
pub fn assert_current_path(router: &Router, expected: &str) {
    assert_eq!(
        router.current_path().as_deref(),
        Some(expected),
        "router is not on '{}'",
        expected
    );
}

//! In-memory stand-ins for the browser seams, shared by unit tests.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use async_trait::async_trait;
use contracts::system::auth::Session;
use serde_json::Value;

use super::api_client::{ApiClient, HttpRequest, HttpResponse, HttpTransport, TransportFailure};
use super::charts::{ChartBackend, ChartData, ChartId};
use super::refresh_timer::TimerDriver;
use crate::system::auth::guard::Navigator;
use crate::system::auth::storage::SessionStore;

pub const BASE: &str = "http://siem.test";

/// Session for `admin:admin123`.
pub fn session() -> Session {
    Session {
        credential: "YWRtaW46YWRtaW4xMjM=".to_string(),
        username: "admin".to_string(),
    }
}

/// Completes after being polled `remaining + 1` times, waking itself in between.
struct YieldTimes(u32);

impl Future for YieldTimes {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.0 == 0 {
            return Poll::Ready(());
        }
        self.0 -= 1;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[derive(Debug, Clone)]
pub enum Reply {
    Respond { status: u16, body: Vec<u8>, delay: u32 },
    NetworkDown,
}

impl Reply {
    pub fn json(value: Value) -> Self {
        Reply::raw(200, &value.to_string())
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Reply::Respond {
            status,
            body: body.as_bytes().to_vec(),
            delay: 0,
        }
    }

    pub fn status(status: u16) -> Self {
        Reply::raw(status, "")
    }

    /// Resolve only after yielding `polls` times to the executor.
    pub fn delayed(self, polls: u32) -> Self {
        match self {
            Reply::Respond { status, body, .. } => Reply::Respond {
                status,
                body,
                delay: polls,
            },
            other => other,
        }
    }
}

/// Replies are queued per path; the last queued reply keeps answering.
/// Unscripted paths answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RefCell<HashMap<String, VecDeque<Reply>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn reply(&self, path: &str, reply: Reply) {
        self.replies
            .borrow_mut()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }

    fn next_reply(&self, path: &str) -> Reply {
        let mut replies = self.replies.borrow_mut();
        match replies.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Reply::status(404)),
            Some(queue) => queue.front().cloned().unwrap_or(Reply::status(404)),
            None => Reply::status(404),
        }
    }
}

fn path_of(url: &str) -> String {
    let without_base = url.strip_prefix(BASE).unwrap_or(url);
    without_base
        .split('?')
        .next()
        .unwrap_or(without_base)
        .to_string()
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let path = path_of(&request.url);
        self.requests.borrow_mut().push(request);
        match self.next_reply(&path) {
            Reply::Respond { status, body, delay } => {
                YieldTimes(delay).await;
                Ok(HttpResponse { status, body })
            }
            Reply::NetworkDown => Err(TransportFailure("connection refused".to_string())),
        }
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    session: RefCell<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn save(&self, session: &Session) {
        *self.session.borrow_mut() = Some(session.clone());
    }

    fn clear(&self) {
        *self.session.borrow_mut() = None;
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    visits: RefCell<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn go_to(&self, path: &str) {
        self.visits.borrow_mut().push(path.to_string());
    }
}

pub struct TestBed {
    pub api: ApiClient,
    pub transport: Rc<ScriptedTransport>,
    pub sessions: Rc<MemorySessionStore>,
    pub navigator: Rc<RecordingNavigator>,
}

impl TestBed {
    pub fn new() -> Self {
        Self::with_transport(Rc::new(ScriptedTransport::default()), Some(session()))
    }

    pub fn with_transport(transport: Rc<ScriptedTransport>, session: Option<Session>) -> Self {
        let sessions = Rc::new(MemorySessionStore::default());
        if let Some(session) = session {
            sessions.save(&session);
        }
        let navigator = Rc::new(RecordingNavigator::default());
        let api = ApiClient::new(BASE, transport.clone(), sessions.clone(), navigator.clone());
        Self {
            api,
            transport,
            sessions,
            navigator,
        }
    }
}

#[derive(Debug, Default)]
pub struct ChartLog {
    pub created: Vec<ChartId>,
    pub updated: Vec<ChartId>,
    pub destroyed: Vec<ChartId>,
    pub last_data: HashMap<ChartId, ChartData>,
    next_handle: u32,
}

/// Chart backend that records every create/update/destroy.
#[derive(Clone, Default)]
pub struct RecordingCharts {
    pub log: Rc<RefCell<ChartLog>>,
}

impl ChartBackend for RecordingCharts {
    type Handle = (ChartId, u32);

    fn create(&mut self, id: ChartId, data: &ChartData) -> Option<Self::Handle> {
        let mut log = self.log.borrow_mut();
        log.next_handle += 1;
        log.created.push(id);
        log.last_data.insert(id, data.clone());
        Some((id, log.next_handle))
    }

    fn update(&mut self, handle: &Self::Handle, data: &ChartData) {
        let mut log = self.log.borrow_mut();
        log.updated.push(handle.0);
        log.last_data.insert(handle.0, data.clone());
    }

    fn destroy(&mut self, handle: Self::Handle) {
        self.log.borrow_mut().destroyed.push(handle.0);
    }
}

struct ManualTimer {
    period_ms: u32,
    tick: Rc<RefCell<Box<dyn FnMut()>>>,
    alive: Rc<Cell<bool>>,
}

/// Timer driver whose intervals only fire when the test says so.
#[derive(Clone, Default)]
pub struct ManualTimers {
    timers: Rc<RefCell<Vec<ManualTimer>>>,
}

pub struct ManualTimerHandle {
    alive: Rc<Cell<bool>>,
}

impl Drop for ManualTimerHandle {
    fn drop(&mut self) {
        self.alive.set(false);
    }
}

impl ManualTimers {
    pub fn active(&self) -> usize {
        self.timers.borrow().iter().filter(|t| t.alive.get()).count()
    }

    pub fn started(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn periods(&self) -> Vec<u32> {
        self.timers.borrow().iter().map(|t| t.period_ms).collect()
    }

    /// Fire every live interval once.
    pub fn fire(&self) {
        let live: Vec<_> = self
            .timers
            .borrow()
            .iter()
            .filter(|t| t.alive.get())
            .map(|t| t.tick.clone())
            .collect();
        for tick in live {
            (tick.borrow_mut())();
        }
    }
}

impl TimerDriver for ManualTimers {
    type Handle = ManualTimerHandle;

    fn start(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Self::Handle {
        let alive = Rc::new(Cell::new(true));
        self.timers.borrow_mut().push(ManualTimer {
            period_ms,
            tick: Rc::new(RefCell::new(tick)),
            alive: alive.clone(),
        });
        ManualTimerHandle { alive }
    }
}

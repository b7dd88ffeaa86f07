use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::backend::SearchBackend;
use crate::data_models::{SearchError, SearchErrorKind, SearchOutcome, SearchResultItem};
use crate::resolver::{QueryResolver, ResolvedQuery};

pub const QUOTA_ADVISORY: &str =
    "오늘 사용할 수 있는 검색 횟수를 모두 사용했습니다. 내일 다시 시도해 주세요.";
pub const RATE_LIMITED_ADVISORY: &str =
    "요청이 너무 빠르게 반복되고 있습니다. 잠시 후 다시 시도해 주세요.";
pub const NETWORK_ADVISORY: &str =
    "네트워크 문제로 결과를 불러오지 못했습니다. 잠시 후 다시 시도해 주세요.";
pub const CONFIG_ADVISORY: &str = "검색 기능이 아직 설정되지 않았습니다.";
pub const VALIDATION_ADVISORY: &str = "문장이 너무 깁니다. 조금 더 짧게 적어 주세요.";

/// Where the visitor is in the two-page experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    #[default]
    Idle,
    Typing,
    /// Transition animation toward the results page.
    Entering,
    Inside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub kind: SearchErrorKind,
    pub message: String,
}

impl Advisory {
    /// Only these kinds are worth interrupting the visitor for.
    fn from_error(err: &SearchError) -> Option<Advisory> {
        let message = match err.kind {
            SearchErrorKind::Quota => QUOTA_ADVISORY,
            SearchErrorKind::RateLimited => RATE_LIMITED_ADVISORY,
            SearchErrorKind::Network => NETWORK_ADVISORY,
            SearchErrorKind::Config => CONFIG_ADVISORY,
            SearchErrorKind::Validation => VALIDATION_ADVISORY,
            SearchErrorKind::Upstream | SearchErrorKind::Internal => return None,
        };
        Some(Advisory {
            kind: err.kind,
            message: message.to_string(),
        })
    }
}

/// Folds a new advisory into the current one. A quota-class advisory is never
/// replaced within a round, so the first one seen wins.
pub fn fold_advisory(current: Option<Advisory>, incoming: Advisory) -> Option<Advisory> {
    match current {
        Some(current) if current.kind.is_quota_class() => Some(current),
        _ => Some(incoming),
    }
}

/// Presentation-ready view of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub stage: Stage,
    pub primary_keyword: String,
    pub contrast_keyword: String,
    pub keyword_chips: Vec<String>,
    pub close_results: Vec<SearchResultItem>,
    pub contrast_results: Vec<SearchResultItem>,
    pub loading_close: bool,
    pub loading_contrast: bool,
    pub advisory_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStart {
    /// Not on the results page, or nothing to search for.
    NotInside,
    /// Resolved query pair equals the current round; no calls issued.
    Deduplicated,
    Started { round: u64, calls: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Close,
    Contrast,
    /// Close and contrast queries are identical; one call feeds both.
    Both,
}

struct ActiveRound {
    id: u64,
    pair: (String, String),
    cancel: CancellationToken,
}

struct SessionState {
    text: String,
    stage: Stage,
    resolved: ResolvedQuery,
    round: Option<ActiveRound>,
    next_round_id: u64,
    close_results: Vec<SearchResultItem>,
    contrast_results: Vec<SearchResultItem>,
    loading_close: bool,
    loading_contrast: bool,
    advisory: Option<Advisory>,
}

impl SessionState {
    fn snapshot(&self) -> Snapshot {
        Snapshot {
            stage: self.stage,
            primary_keyword: self.resolved.primary_keyword.clone(),
            contrast_keyword: self.resolved.contrast_keyword.clone(),
            keyword_chips: self.resolved.keyword_chips.clone(),
            close_results: self.close_results.clone(),
            contrast_results: self.contrast_results.clone(),
            loading_close: self.loading_close,
            loading_contrast: self.loading_contrast,
            advisory_message: self.advisory.as_ref().map(|a| a.message.clone()),
        }
    }

    fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    fn cancel_round(&mut self) {
        if let Some(round) = self.round.take() {
            log::debug!("cancelling round {}", round.id);
            round.cancel.cancel();
        }
    }

    /// Drops results and round identity so the next entry searches afresh.
    fn clear_results(&mut self) {
        self.cancel_round();
        self.close_results.clear();
        self.contrast_results.clear();
        self.loading_close = false;
        self.loading_contrast = false;
    }

    fn is_current(&self, round_id: u64) -> bool {
        self.round
            .as_ref()
            .is_some_and(|r| r.id == round_id && !r.cancel.is_cancelled())
    }
}

struct Shared {
    state: Mutex<SessionState>,
    snapshots: watch::Sender<Snapshot>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, SessionState> {
        // no critical section panics midway, so a poisoned state is still coherent
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn publish(&self, state: &SessionState) {
        self.snapshots.send_replace(state.snapshot());
    }

    fn complete(&self, round_id: u64, slot: Slot, outcome: SearchOutcome) {
        let mut state = self.lock();
        if !state.is_current(round_id) {
            log::debug!("discarding completion from stale round {round_id}");
            return;
        }

        match slot {
            Slot::Close => state.loading_close = false,
            Slot::Contrast => state.loading_contrast = false,
            Slot::Both => {
                state.loading_close = false;
                state.loading_contrast = false;
            }
        }

        let items = match outcome {
            SearchOutcome::Ok(items) => Some(items),
            SearchOutcome::Empty => Some(Vec::new()),
            SearchOutcome::Error(err) => {
                log::warn!("round {round_id} {slot:?} search failed: {} ({})", err.message, err.kind);
                if let Some(advisory) = Advisory::from_error(&err) {
                    state.advisory = fold_advisory(state.advisory.take(), advisory);
                }
                // previous results stay visible until a successful call replaces them
                None
            }
        };

        if let Some(items) = items {
            match slot {
                Slot::Close => state.close_results = items,
                Slot::Contrast => state.contrast_results = items,
                Slot::Both => {
                    state.contrast_results = items.clone();
                    state.close_results = items;
                }
            }
        }

        self.publish(&state);
    }
}

/// Runs the close and contrast searches for one visitor session.
///
/// Methods that may start a round spawn onto the ambient tokio runtime. All state
/// changes, including call completions, go through one lock, and a completion is
/// only applied if its round is still the current one.
pub struct Orchestrator {
    backend: Arc<dyn SearchBackend>,
    resolver: QueryResolver<'static>,
    shared: Arc<Shared>,
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self::with_resolver(backend, QueryResolver::default())
    }

    pub fn with_resolver(backend: Arc<dyn SearchBackend>, resolver: QueryResolver<'static>) -> Self {
        let state = SessionState {
            text: String::new(),
            stage: Stage::Idle,
            resolved: resolver.resolve(""),
            round: None,
            next_round_id: 1,
            close_results: Vec::new(),
            contrast_results: Vec::new(),
            loading_close: false,
            loading_contrast: false,
            advisory: None,
        };
        let (snapshots, _) = watch::channel(state.snapshot());
        Self {
            backend,
            resolver,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                snapshots,
            }),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.snapshots.subscribe()
    }

    pub fn stage(&self) -> Stage {
        self.shared.lock().stage
    }

    /// Current round's query pair, if a round is recorded.
    pub fn current_round(&self) -> Option<(String, String)> {
        self.shared.lock().round.as_ref().map(|r| r.pair.clone())
    }

    pub fn set_text(&self, text: impl Into<String>) -> RoundStart {
        let mut state = self.shared.lock();
        state.text = text.into();
        state.resolved = self.resolver.resolve(&state.text);

        let has_text = state.has_text();
        match state.stage {
            Stage::Idle if has_text => state.stage = Stage::Typing,
            Stage::Typing if !has_text => state.stage = Stage::Idle,
            _ => {}
        }

        let start = if state.stage == Stage::Inside {
            self.start_round(&mut state)
        } else {
            RoundStart::NotInside
        };
        self.shared.publish(&state);
        start
    }

    /// Begins the transition toward the results page. Returns false when there
    /// is nothing to search for or the transition already happened.
    pub fn enter(&self) -> bool {
        let mut state = self.shared.lock();
        if !state.has_text() || matches!(state.stage, Stage::Entering | Stage::Inside) {
            return false;
        }
        state.stage = Stage::Entering;
        self.shared.publish(&state);
        true
    }

    /// Finishes the transition and starts the first round.
    pub fn arrive(&self) -> RoundStart {
        let mut state = self.shared.lock();
        if state.stage != Stage::Entering {
            return RoundStart::NotInside;
        }
        state.stage = Stage::Inside;
        let start = self.start_round(&mut state);
        self.shared.publish(&state);
        start
    }

    /// Returns to the first page, clearing results and the recorded round.
    pub fn leave(&self) {
        let mut state = self.shared.lock();
        if matches!(state.stage, Stage::Idle | Stage::Typing) {
            return;
        }
        state.clear_results();
        state.stage = if state.has_text() {
            Stage::Typing
        } else {
            Stage::Idle
        };
        self.shared.publish(&state);
    }

    pub fn dismiss_advisory(&self) {
        let mut state = self.shared.lock();
        if state.advisory.take().is_some() {
            self.shared.publish(&state);
        }
    }

    fn start_round(&self, state: &mut SessionState) -> RoundStart {
        if !state.has_text() {
            state.clear_results();
            return RoundStart::NotInside;
        }

        let pair = state.resolved.query_pair();
        if state.round.as_ref().is_some_and(|r| r.pair == pair) {
            return RoundStart::Deduplicated;
        }

        state.cancel_round();
        state.advisory = None;

        let id = state.next_round_id;
        state.next_round_id += 1;
        let cancel = CancellationToken::new();
        state.round = Some(ActiveRound {
            id,
            pair: pair.clone(),
            cancel: cancel.clone(),
        });

        let (close_query, contrast_query) = pair;
        log::info!("round {id}: close={close_query:?}, contrast={contrast_query:?}");

        state.loading_close = true;
        state.loading_contrast = true;
        if close_query == contrast_query {
            self.spawn_call(id, cancel, close_query, Slot::Both);
            RoundStart::Started { round: id, calls: 1 }
        } else {
            self.spawn_call(id, cancel.clone(), close_query, Slot::Close);
            self.spawn_call(id, cancel, contrast_query, Slot::Contrast);
            RoundStart::Started { round: id, calls: 2 }
        }
    }

    fn spawn_call(&self, round_id: u64, cancel: CancellationToken, query: String, slot: Slot) {
        let backend = self.backend.clone();
        let shared = self.shared.clone();
        tokio::spawn(async move {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::debug!("round {round_id} {slot:?} call cancelled");
                    return;
                }
                outcome = backend.search(&query) => outcome,
            };
            shared.complete(round_id, slot, outcome);
        });
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shared.lock().cancel_round();
    }
}

#[test]
fn test_fold_advisory_first_quota_wins() {
    let quota = Advisory {
        kind: SearchErrorKind::Quota,
        message: "quota".into(),
    };
    let local = Advisory {
        kind: SearchErrorKind::RateLimited,
        message: "local".into(),
    };
    let network = Advisory {
        kind: SearchErrorKind::Network,
        message: "network".into(),
    };

    assert_eq!(fold_advisory(None, network.clone()), Some(network.clone()));
    assert_eq!(fold_advisory(Some(network.clone()), quota.clone()), Some(quota.clone()));
    assert_eq!(fold_advisory(Some(quota.clone()), network.clone()), Some(quota.clone()));
    assert_eq!(fold_advisory(Some(quota.clone()), local), Some(quota));
}

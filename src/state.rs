use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::AbortHandle;

use crate::chart::{ChartHandle, ChartRegistry, ChartSpec};
use crate::models::CallAnalysis;
use crate::referral::ReferralAnalysis;
use crate::report::call::CallTab;
use crate::report::referral::ReferralTab;
use crate::users::{self, Roster};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    AnalyzeCall,
    AnalyzeReferral,
    DeleteAnalysis(i64),
    DeleteReferral(i64),
}

/// Set of actions currently in flight. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct ActionGuard {
    in_flight: Arc<Mutex<HashSet<Action>>>,
}

impl ActionGuard {
    fn lock(&self) -> MutexGuard<'_, HashSet<Action>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `action` as running; `None` when it already is.
    pub fn try_begin(&self, action: Action) -> Option<InFlight> {
        if !self.lock().insert(action.clone()) {
            log::warn!("refused duplicate action {action:?}");
            return None;
        }
        Some(InFlight {
            guard: self.clone(),
            action,
        })
    }

    #[cfg(test)]
    pub fn is_busy(&self, action: &Action) -> bool {
        self.lock().contains(action)
    }
}

/// Releases its action when dropped.
#[derive(Debug)]
pub struct InFlight {
    guard: ActionGuard,
    action: Action,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.action);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Generation counter for page navigation. Navigating aborts outstanding
/// requests, and results carrying an older ticket are discarded.
#[derive(Debug, Default)]
pub struct Navigation {
    generation: AtomicU64,
    pending: Mutex<Vec<AbortHandle>>,
}

impl Navigation {
    pub fn ticket(&self) -> Ticket {
        Ticket(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    pub fn navigate(&self) -> Ticket {
        let next = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for handle in pending.drain(..) {
            handle.abort();
        }
        Ticket(next)
    }

    /// Runs `request` on the runtime. Yields `None` when it was aborted or
    /// the page moved on before it finished.
    pub async fn run<F>(&self, request: F) -> Option<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let ticket = self.ticket();
        let task = tokio::spawn(request);
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(task.abort_handle());

        let output = match task.await {
            Ok(output) => output,
            Err(err) => {
                log::warn!("request dropped: {err}");
                return None;
            }
        };
        if !self.is_current(ticket) {
            log::warn!("dropping stale response from generation {}", ticket.0);
            return None;
        }
        Some(output)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentTab {
    Call(CallTab),
    Referral(ReferralTab),
    User,
}

/// Everything the pages render from. Passed explicitly to every view.
#[derive(Debug, Default)]
pub struct AppState {
    pub call: Option<CallAnalysis>,
    pub referral: Option<ReferralAnalysis>,
    pub roster: Option<Roster>,
    pub selected_user: Option<String>,
    pub tab: Option<CurrentTab>,
    pub charts: ChartRegistry,
    pub actions: ActionGuard,
    pub navigation: Navigation,
}

impl AppState {
    /// Loads a call analysis as a new page. Requests still in flight for the
    /// previous page are aborted.
    pub fn set_call(&mut self, analysis: CallAnalysis) {
        self.navigation.navigate();
        let roster = users::extract_roster(&analysis);
        self.selected_user = roster.ranked().first().map(|user| user.name.clone());
        self.roster = Some(roster);
        self.call = Some(analysis);
        self.tab = None;
        self.charts.dispose_all();
    }

    pub fn set_referral(&mut self, analysis: ReferralAnalysis) {
        self.navigation.navigate();
        self.referral = Some(analysis);
        self.tab = None;
        self.charts.dispose_all();
    }

    /// Switches to a call tab, replacing the live charts. `None` without a loaded analysis.
    pub fn show_call_tab(&mut self, tab: CallTab) -> Option<Vec<ChartHandle>> {
        let analysis = self.call.as_ref()?;
        let specs = tab.charts(analysis);
        self.tab = Some(CurrentTab::Call(tab));
        Some(self.charts.replace(specs))
    }

    pub fn show_referral_tab(&mut self, tab: ReferralTab) -> Option<Vec<ChartHandle>> {
        let analysis = self.referral.as_ref()?;
        let specs = tab.charts(analysis);
        self.tab = Some(CurrentTab::Referral(tab));
        Some(self.charts.replace(specs))
    }

    /// Selects a user from the roster and swaps in their charts.
    pub fn select_user(&mut self, name: &str) -> Option<Vec<ChartHandle>> {
        let roster = self.roster.as_ref()?;
        let analysis = self.call.as_ref()?;
        let overview = users::team_overview(analysis, roster);
        let performance = users::evaluate_user(roster, &overview, name)?;
        let specs: Vec<ChartSpec> = crate::report::users::user_charts(roster, &overview, &performance);
        self.selected_user = Some(performance.name);
        self.tab = Some(CurrentTab::User);
        Some(self.charts.replace(specs))
    }
}

//! View state for the ledger and profit-and-loss screens.
//!
//! A refresh is split in two: [`LedgerScreen::request`] hands out a ticket
//! and [`LedgerScreen::complete`] applies a result only if its ticket is the
//! most recent one. Slow responses to superseded requests are dropped.

use tracing::{info, warn};

use super::fetch::{SourceRows, fetch_sources};
use super::ledger::{LedgerEntry, LedgerOptions, build_ledger};
use super::pagination::{DEFAULT_PAGE_SIZE, Paginator};
use super::pnl::{ProfitAndLoss, profit_and_loss};
use super::records::Currency;
use super::{DateRange, LedgerError};
use crate::store::RecordStore;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Last refresh failed; earlier results are still shown.
    Failed(String),
}

/// Identifies one refresh request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshTicket {
    pub generation: u64,
    pub range: DateRange,
}

/// Hands out increasing generations and recognizes the latest one.
#[derive(Debug, Clone, Default)]
struct Generations {
    latest: u64,
}

impl Generations {
    fn issue(&mut self, range: DateRange) -> RefreshTicket {
        self.latest += 1;
        RefreshTicket {
            generation: self.latest,
            range,
        }
    }

    fn is_current(&self, ticket: &RefreshTicket) -> bool {
        ticket.generation == self.latest
    }
}

pub struct LedgerScreen {
    requested: DateRange,
    /// Range of the entries currently held, set on a successful refresh.
    loaded: Option<DateRange>,
    options: LedgerOptions,
    page_size: usize,
    state: LoadState,
    generations: Generations,
    paginator: Option<Paginator<LedgerEntry>>,
}

impl LedgerScreen {
    pub fn new(page_size: usize, options: LedgerOptions) -> Self {
        Self {
            requested: DateRange::unbounded(),
            loaded: None,
            options,
            page_size,
            state: LoadState::Idle,
            generations: Generations::default(),
            paginator: None,
        }
    }

    /// Range of the data on screen, or of the pending request before the
    /// first successful refresh.
    pub fn range(&self) -> &DateRange {
        self.loaded.as_ref().unwrap_or(&self.requested)
    }

    pub fn requested_range(&self) -> &DateRange {
        &self.requested
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Entries of the last successful refresh.
    pub fn paginator(&self) -> Option<&Paginator<LedgerEntry>> {
        self.paginator.as_ref()
    }

    pub fn paginator_mut(&mut self) -> Option<&mut Paginator<LedgerEntry>> {
        self.paginator.as_mut()
    }

    pub fn page_items(&self) -> &[LedgerEntry] {
        self.paginator.as_ref().map(|p| p.page_items()).unwrap_or(&[])
    }

    /// Starts a refresh for `range`. Any earlier ticket becomes stale.
    pub fn request(&mut self, range: DateRange) -> RefreshTicket {
        self.requested = range;
        self.state = LoadState::Loading;
        self.generations.issue(range)
    }

    /// Applies a fetch result. Returns `false` when the ticket was stale.
    pub fn complete(
        &mut self,
        ticket: RefreshTicket,
        result: Result<SourceRows, LedgerError>,
    ) -> bool {
        if !self.generations.is_current(&ticket) {
            warn!(
                generation = ticket.generation,
                latest = self.generations.latest,
                "Discarding stale ledger refresh"
            );
            return false;
        }
        match result {
            Ok(sources) => {
                let entries = build_ledger(&sources, &self.options);
                info!(entries = entries.len(), range = %ticket.range, "Ledger loaded");
                self.paginator = Some(Paginator::new(entries, self.page_size));
                self.loaded = Some(ticket.range);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(error = %e, "Ledger refresh failed");
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    /// Requests and completes a refresh in one go.
    pub fn refresh(&mut self, store: &dyn RecordStore, range: DateRange) -> &LoadState {
        let ticket = self.request(range);
        let result = fetch_sources(store, &ticket.range);
        self.complete(ticket, result);
        &self.state
    }
}

impl Default for LedgerScreen {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, LedgerOptions::default())
    }
}

pub struct ProfitAndLossScreen {
    requested: DateRange,
    loaded: Option<DateRange>,
    currency: Currency,
    state: LoadState,
    generations: Generations,
    sources: Option<SourceRows>,
    report: Option<ProfitAndLoss>,
}

impl ProfitAndLossScreen {
    pub fn new(currency: Currency) -> Self {
        Self {
            requested: DateRange::unbounded(),
            loaded: None,
            currency,
            state: LoadState::Idle,
            generations: Generations::default(),
            sources: None,
            report: None,
        }
    }

    /// Range of the data on screen, or of the pending request before the
    /// first successful refresh.
    pub fn range(&self) -> &DateRange {
        self.loaded.as_ref().unwrap_or(&self.requested)
    }

    pub fn requested_range(&self) -> &DateRange {
        &self.requested
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn report(&self) -> Option<&ProfitAndLoss> {
        self.report.as_ref()
    }

    /// Switches currency, recomputing from the rows already loaded.
    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
        if let (Some(sources), Some(range)) = (&self.sources, &self.loaded) {
            self.report = Some(profit_and_loss(sources, currency, range));
        }
    }

    pub fn request(&mut self, range: DateRange) -> RefreshTicket {
        self.requested = range;
        self.state = LoadState::Loading;
        self.generations.issue(range)
    }

    pub fn complete(
        &mut self,
        ticket: RefreshTicket,
        result: Result<SourceRows, LedgerError>,
    ) -> bool {
        if !self.generations.is_current(&ticket) {
            warn!(
                generation = ticket.generation,
                latest = self.generations.latest,
                "Discarding stale profit and loss refresh"
            );
            return false;
        }
        match result {
            Ok(sources) => {
                self.report = Some(profit_and_loss(&sources, self.currency, &ticket.range));
                self.sources = Some(sources);
                self.loaded = Some(ticket.range);
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                warn!(error = %e, "Profit and loss refresh failed");
                self.state = LoadState::Failed(e.to_string());
            }
        }
        true
    }

    pub fn refresh(&mut self, store: &dyn RecordStore, range: DateRange) -> &LoadState {
        let ticket = self.request(range);
        let result = fetch_sources(store, &ticket.range);
        self.complete(ticket, result);
        &self.state
    }
}

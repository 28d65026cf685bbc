//! Inbound trade operations for a host's command layer.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::trade::{
    config::TradeConfig,
    domain::{
        AssetDescriptor, CommitAbort, Confirmation, OfferLine, PartyId, PendingRequest, SessionId,
        StatusSnapshot, TradeDomainError, TradeEvent, TradeSession, pool::count_matching,
    },
    ports::{RegistryError, SessionRegistry, TradeNotifier, TradeWorld},
};

use super::{CommitExecutor, CommitReceipt, RequestRejection, TradeValidator};

/// Service-level errors for inbound trade operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TradeDeskError {
    /// The request failed a pre-session check.
    #[error(transparent)]
    Validation(#[from] RequestRejection),

    /// A party already belongs to a session.
    #[error("party {0} is already trading")]
    SessionConflict(PartyId),

    /// There is no request to accept.
    #[error("no pending trade request from {requester} to {target}")]
    NoPendingRequest {
        /// Party expected to have asked.
        requester: PartyId,
        /// Party trying to accept.
        target: PartyId,
    },

    /// The party is not trading.
    #[error("party {0} has no active trade session")]
    NoActiveSession(PartyId),

    /// The party selected more units than its pool holds.
    #[error("party {party} holds {held} unit(s) but selected {requested}")]
    InsufficientHoldings {
        /// Selecting party.
        party: PartyId,
        /// Units currently in the party's pool.
        held: u64,
        /// Units the offer would contain after the selection.
        requested: u64,
    },

    /// A domain rule rejected the operation.
    #[error(transparent)]
    Domain(#[from] TradeDomainError),
}

impl From<RegistryError> for TradeDeskError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NoPendingRequest { requester, target } => {
                Self::NoPendingRequest { requester, target }
            }
            RegistryError::PartyBusy(party) => Self::SessionConflict(party),
            RegistryError::Domain(domain) => Self::Domain(domain),
        }
    }
}

/// Result type for [`TradeDesk`] operations.
pub type TradeDeskResult<T> = Result<T, TradeDeskError>;

/// What a trade request led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request was recorded and awaits acceptance.
    Sent,
    /// The target had already asked the requester, so a session opened.
    Started(SessionId),
}

/// What a confirmation led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The counterpart has not confirmed the current terms yet.
    AwaitingCounterpart,
    /// Both offers were exchanged.
    Committed(CommitReceipt),
    /// The commit stopped without touching either pool.
    Aborted(CommitAbort),
}

/// Requests and sessions dropped by an expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpiryReport {
    /// Expired pending requests.
    pub requests: Vec<PendingRequest>,
    /// Expired sessions.
    pub sessions: Vec<SessionId>,
}

impl ExpiryReport {
    /// Returns `true` when nothing expired.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty() && self.sessions.is_empty()
    }
}

/// Facade the host's command layer talks to.
///
/// Owns the registry, the world view, and the notifier. Every operation runs
/// to completion on the caller's thread. After each state change both
/// participants receive a fresh [`StatusSnapshot`].
pub struct TradeDesk<R, W, N, C>
where
    R: SessionRegistry,
    W: TradeWorld,
    N: TradeNotifier,
    C: Clock + Send + Sync,
{
    registry: R,
    world: W,
    notifier: N,
    clock: Arc<C>,
    config: TradeConfig,
    validator: TradeValidator,
    deferred: Vec<(PartyId, TradeEvent)>,
}

impl<R, W, N, C> TradeDesk<R, W, N, C>
where
    R: SessionRegistry,
    W: TradeWorld,
    N: TradeNotifier,
    C: Clock + Send + Sync,
{
    /// Creates a desk over the given collaborators.
    #[must_use]
    pub const fn new(registry: R, world: W, notifier: N, clock: Arc<C>, config: TradeConfig) -> Self {
        let validator = TradeValidator::from_config(&config);
        Self {
            registry,
            world,
            notifier,
            clock,
            config,
            validator,
            deferred: Vec::new(),
        }
    }

    /// Returns the session registry.
    #[must_use]
    pub const fn registry(&self) -> &R {
        &self.registry
    }

    /// Returns the world view.
    #[must_use]
    pub const fn world(&self) -> &W {
        &self.world
    }

    /// Mutable access to the world, for hosts that own it through the desk.
    pub const fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Returns the notifier.
    #[must_use]
    pub const fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &TradeConfig {
        &self.config
    }

    /// Asks `target` to trade with `requester`.
    ///
    /// When `target` has already asked `requester`, the session opens
    /// immediately instead.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::Validation`] when a pre-session check fails
    /// and [`TradeDeskError::SessionConflict`] when either party is already
    /// trading. Nothing is recorded on error.
    pub fn request_trade(
        &mut self,
        requester: PartyId,
        target: PartyId,
    ) -> TradeDeskResult<RequestOutcome> {
        if let Err(rejection) = self
            .validator
            .validate_request(&self.world, requester, target)
        {
            warn!(%requester, %target, reason = %rejection, "trade request rejected");
            return Err(rejection.into());
        }
        self.ensure_idle(requester)?;
        self.ensure_idle(target)?;

        if self.registry.has_pending_request(requester, target) {
            return self
                .open_session(requester, target)
                .map(RequestOutcome::Started);
        }

        self.registry
            .request_trade(requester, target, self.clock.utc());
        info!(%requester, %target, "trade requested");
        self.notifier
            .notify(target, &TradeEvent::RequestReceived { from: requester });
        self.notifier
            .notify(requester, &TradeEvent::RequestSent { to: target });
        Ok(RequestOutcome::Sent)
    }

    /// Accepts `requester`'s pending request to `accepter`.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::SessionConflict`] when either party is
    /// already trading and [`TradeDeskError::NoPendingRequest`] when there is
    /// nothing to accept.
    pub fn accept_request(
        &mut self,
        accepter: PartyId,
        requester: PartyId,
    ) -> TradeDeskResult<SessionId> {
        self.ensure_idle(accepter)?;
        self.ensure_idle(requester)?;
        self.open_session(accepter, requester)
    }

    /// Adds `quantity` units of `descriptor` from `party`'s pool to its
    /// offer.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::NoActiveSession`] when the party is not
    /// trading, [`TradeDeskError::Domain`] for invalid lines, and
    /// [`TradeDeskError::InsufficientHoldings`] when the offer would exceed
    /// what the pool holds.
    pub fn add_line_from_selection(
        &mut self,
        party: PartyId,
        descriptor: AssetDescriptor,
        quantity: u32,
    ) -> TradeDeskResult<()> {
        OfferLine::new(descriptor.clone(), quantity)?;
        let session = self
            .registry
            .session_mut(party)
            .ok_or(TradeDeskError::NoActiveSession(party))?;
        let already_offered = session
            .offer(party)?
            .lines()
            .iter()
            .find(|line| *line.descriptor() == descriptor)
            .map_or(0, |line| u64::from(line.quantity()));
        let held = self
            .world
            .pool(party)
            .map_or(0, |pool| count_matching(pool, &descriptor));
        let requested = already_offered.saturating_add(u64::from(quantity));
        if requested > held {
            return Err(TradeDeskError::InsufficientHoldings {
                party,
                held,
                requested,
            });
        }

        debug!(%party, asset = %descriptor, quantity, "offer line added");
        session.add_line(party, descriptor, quantity)?;
        render_session(&self.world, &self.notifier, session);
        Ok(())
    }

    /// Removes the line at 1-based `position` from `party`'s offer.
    ///
    /// Out-of-range positions change nothing but still clear both
    /// confirmations.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::NoActiveSession`] when the party is not
    /// trading.
    pub fn remove_line(&mut self, party: PartyId, position: usize) -> TradeDeskResult<()> {
        let session = self
            .registry
            .session_mut(party)
            .ok_or(TradeDeskError::NoActiveSession(party))?;
        session.remove_line(party, position)?;
        debug!(%party, position, "offer line removed");
        render_session(&self.world, &self.notifier, session);
        Ok(())
    }

    /// Confirms `party`'s acceptance of the current terms, committing once
    /// both sides have confirmed.
    ///
    /// A commit that aborts is reported to both parties and returned as
    /// [`ConfirmOutcome::Aborted`], not as an error. Either way the session
    /// leaves the registry once a commit has run.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::NoActiveSession`] when the party is not
    /// trading.
    pub fn confirm(&mut self, party: PartyId) -> TradeDeskResult<ConfirmOutcome> {
        let session = self
            .registry
            .session_mut(party)
            .ok_or(TradeDeskError::NoActiveSession(party))?;
        let confirmation = session.confirm(party)?;
        let session_id = session.id();
        let (first, second) = session.parties();
        info!(session = %session_id, %party, "trade confirmed");
        for recipient in [first, second] {
            self.notifier.notify(
                recipient,
                &TradeEvent::Confirmed {
                    session: session_id,
                    by: party,
                },
            );
        }

        if confirmation == Confirmation::AwaitingCounterpart {
            render_session(&self.world, &self.notifier, session);
            return Ok(ConfirmOutcome::AwaitingCounterpart);
        }

        let committed = CommitExecutor::new(&self.validator).commit(session, &mut self.world);
        render_session(&self.world, &self.notifier, session);
        self.registry.cancel_session(party);

        let outcome = match committed {
            Ok(receipt) => {
                for recipient in [first, second] {
                    self.notifier.notify(
                        recipient,
                        &TradeEvent::Committed {
                            session: session_id,
                            overflow: receipt.overflow_for(recipient),
                        },
                    );
                }
                ConfirmOutcome::Committed(receipt)
            }
            Err(reason) => {
                for recipient in [first, second] {
                    self.notifier.notify(
                        recipient,
                        &TradeEvent::CommitFailed {
                            session: session_id,
                            reason: reason.clone(),
                        },
                    );
                }
                ConfirmOutcome::Aborted(reason)
            }
        };
        Ok(outcome)
    }

    /// Cancels `party`'s session. Pools are not touched.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::NoActiveSession`] when the party is not
    /// trading.
    pub fn cancel_session(&mut self, party: PartyId) -> TradeDeskResult<SessionId> {
        let session = self
            .registry
            .session_mut(party)
            .ok_or(TradeDeskError::NoActiveSession(party))?;
        session.cancel(party)?;
        let session_id = session.id();
        let (first, second) = session.parties();
        render_session(&self.world, &self.notifier, session);
        self.registry.cancel_session(party);

        info!(session = %session_id, %party, "trade cancelled");
        for recipient in [first, second] {
            self.notifier.notify(
                recipient,
                &TradeEvent::Cancelled {
                    session: session_id,
                    by: party,
                },
            );
        }
        Ok(session_id)
    }

    /// Builds `party`'s status snapshot and renders it to that party.
    ///
    /// # Errors
    ///
    /// Returns [`TradeDeskError::NoActiveSession`] when the party is not
    /// trading.
    pub fn query_status(&self, party: PartyId) -> TradeDeskResult<StatusSnapshot> {
        let session = self
            .registry
            .session(party)
            .ok_or(TradeDeskError::NoActiveSession(party))?;
        let snapshot = StatusSnapshot::capture(session, party, self.world.pool(party))?;
        self.notifier.render_status(party, &snapshot);
        Ok(snapshot)
    }

    /// Forgets everything `party` was involved in after it left the host.
    ///
    /// The counterpart of a cancelled session hears about it on the next
    /// [`Self::process_cycle`].
    pub fn disconnect(&mut self, party: PartyId) {
        let cleanup = self.registry.cleanup_party(party);
        if !cleanup.dropped_requests.is_empty() {
            debug!(%party, dropped = cleanup.dropped_requests.len(), "pending requests dropped");
        }
        let Some(mut session) = cleanup.cancelled_session else {
            return;
        };
        session.abort();
        info!(session = %session.id(), %party, "trade cancelled by disconnect");
        if let Ok(counterpart) = session.counterpart(party) {
            self.deferred.push((
                counterpart,
                TradeEvent::CounterpartLeft {
                    session: session.id(),
                    party,
                },
            ));
        }
    }

    /// Delivers queued notices, then expires stale requests and sessions
    /// against the injected clock.
    pub fn process_cycle(&mut self) -> ExpiryReport {
        for (party, event) in std::mem::take(&mut self.deferred) {
            self.notifier.notify(party, &event);
        }
        self.expire_stale(self.clock.utc())
    }

    /// Drops pending requests and cancels sessions older than their
    /// configured lifetimes at `now`. Disabled lifetimes expire nothing.
    pub fn expire_stale(&mut self, now: DateTime<Utc>) -> ExpiryReport {
        let mut report = ExpiryReport::default();

        if let Some(ttl) = self.config.pending_request_ttl() {
            let stale: Vec<PendingRequest> = self
                .registry
                .pending_requests()
                .into_iter()
                .filter(|request| now.signed_duration_since(request.requested_at) > ttl)
                .collect();
            for request in stale {
                self.registry.remove_pending_request(request.target);
                info!(requester = %request.requester, target = %request.target, "trade request expired");
                let event = TradeEvent::RequestExpired {
                    from: request.requester,
                    to: request.target,
                };
                self.notifier.notify(request.requester, &event);
                self.notifier.notify(request.target, &event);
                report.requests.push(request);
            }
        }

        if let Some(ttl) = self.config.session_ttl() {
            let stale: Vec<PartyId> = self
                .registry
                .sessions()
                .into_iter()
                .filter(|session| now.signed_duration_since(session.created_at()) > ttl)
                .map(|session| session.parties().0)
                .collect();
            for party in stale {
                let Some(mut session) = self.registry.cancel_session(party) else {
                    continue;
                };
                session.abort();
                info!(session = %session.id(), "trade session expired");
                render_session(&self.world, &self.notifier, &session);
                let (first, second) = session.parties();
                for recipient in [first, second] {
                    self.notifier.notify(
                        recipient,
                        &TradeEvent::SessionExpired {
                            session: session.id(),
                        },
                    );
                }
                report.sessions.push(session.id());
            }
        }

        report
    }

    fn ensure_idle(&self, party: PartyId) -> TradeDeskResult<()> {
        if self.registry.has_active_session(party) {
            warn!(%party, "trade refused, party already trading");
            return Err(TradeDeskError::SessionConflict(party));
        }
        Ok(())
    }

    fn open_session(&mut self, accepter: PartyId, requester: PartyId) -> TradeDeskResult<SessionId> {
        let session_id = self
            .registry
            .accept_request(accepter, requester, self.clock.utc())?;
        info!(session = %session_id, %requester, %accepter, "trade session opened");
        self.notifier.notify(
            requester,
            &TradeEvent::SessionStarted {
                session: session_id,
                counterpart: accepter,
            },
        );
        self.notifier.notify(
            accepter,
            &TradeEvent::SessionStarted {
                session: session_id,
                counterpart: requester,
            },
        );
        if let Some(session) = self.registry.session(accepter) {
            render_session(&self.world, &self.notifier, session);
        }
        Ok(session_id)
    }
}

fn render_session<W, N>(world: &W, notifier: &N, session: &TradeSession)
where
    W: TradeWorld + ?Sized,
    N: TradeNotifier + ?Sized,
{
    let (first, second) = session.parties();
    for party in [first, second] {
        if let Ok(snapshot) = StatusSnapshot::capture(session, party, world.pool(party)) {
            notifier.render_status(party, &snapshot);
        }
    }
}

//! Generate / confirm-clear / regenerate state machine.
//!
//! Only one galaxy exists at a time, so regenerating means clearing the old
//! one first. The flow makes the confirmation an explicit state: callers feed
//! it events and execute whatever [`Command`] comes back. While a generation
//! or clear is in flight, new generation requests are refused.
//!
//! | From | Event | To | Command |
//! |------|-------|----|---------|
//! | NoGalaxy | GenerateRequested | Generating | SubmitGeneration |
//! | Ready | GenerateRequested / ClearRequested | ConfirmClear | |
//! | ConfirmClear | ClearConfirmed | Clearing | SubmitClear |
//! | ConfirmClear | ClearCancelled | previous stable state | |
//! | Clearing | ClearSucceeded | Generating, or NoGalaxy if nothing pending | SubmitGeneration |
//! | Clearing | ClearFailed | previous stable state, error kept | |
//! | Generating | GenerationSucceeded | Ready | |
//! | Generating | GenerationFailed (conflict) | ConfirmClear | |
//! | Generating | GenerationFailed (other) | previous stable state, error kept | |
//!
//! ```
//! use sectorwars_logic::params::GalaxyConfig;
//! use sectorwars_logic::regeneration::{Command, RegenEvent, RegenFlow, RegenState};
//! use sectorwars_logic::validation::ValidatedConfig;
//!
//! let config = ValidatedConfig::new(GalaxyConfig::default()).unwrap();
//! let (flow, command) = RegenFlow::new()
//!     .transition(RegenEvent::GenerateRequested(config))
//!     .unwrap();
//! assert_eq!(flow.state(), RegenState::Generating);
//! assert!(matches!(command, Some(Command::SubmitGeneration(_))));
//! ```

use std::fmt;

use crate::protocol::{Failure, FailureKind, GalaxySummary, GenerateGalaxyRequest};
use crate::validation::ValidatedConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegenState {
    NoGalaxy,
    Generating,
    Ready,
    ConfirmClear,
    Clearing,
}

impl RegenState {
    /// A request is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Generating | Self::Clearing)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegenEvent {
    /// The operator submitted a validated configuration.
    GenerateRequested(ValidatedConfig),
    /// The operator asked to delete the galaxy without regenerating.
    ClearRequested,
    ClearConfirmed,
    ClearCancelled,
    ClearSucceeded,
    ClearFailed(Failure),
    GenerationSucceeded(GalaxySummary),
    GenerationFailed(Failure),
    /// A fresh read of `GET /galaxy`.
    GalaxyLoaded(Option<GalaxySummary>),
}

impl RegenEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::GenerateRequested(_) => "GenerateRequested",
            Self::ClearRequested => "ClearRequested",
            Self::ClearConfirmed => "ClearConfirmed",
            Self::ClearCancelled => "ClearCancelled",
            Self::ClearSucceeded => "ClearSucceeded",
            Self::ClearFailed(_) => "ClearFailed",
            Self::GenerationSucceeded(_) => "GenerationSucceeded",
            Self::GenerationFailed(_) => "GenerationFailed",
            Self::GalaxyLoaded(_) => "GalaxyLoaded",
        }
    }
}

/// Work the caller must perform after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SubmitGeneration(GenerateGalaxyRequest),
    SubmitClear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A generation or clear is already in flight.
    Busy(RegenState),
    /// The event makes no sense in the current state.
    Unexpected {
        state: RegenState,
        event: &'static str,
    },
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy(state) => write!(f, "busy ({:?}); wait for the current request", state),
            Self::Unexpected { state, event } => {
                write!(f, "{} is not valid while {:?}", event, state)
            }
        }
    }
}

impl std::error::Error for TransitionError {}

/// Regeneration flow snapshot. Transitions return a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenFlow {
    state: RegenState,
    galaxy: Option<GalaxySummary>,
    /// Generation to run once the old galaxy is cleared.
    pending: Option<GenerateGalaxyRequest>,
    /// Stable state to fall back to on cancel or failure.
    resume: RegenState,
    last_error: Option<Failure>,
}

impl Default for RegenFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl RegenFlow {
    pub fn new() -> Self {
        Self {
            state: RegenState::NoGalaxy,
            galaxy: None,
            pending: None,
            resume: RegenState::NoGalaxy,
            last_error: None,
        }
    }

    /// Start from what the server reported.
    pub fn from_galaxy(galaxy: Option<GalaxySummary>) -> Self {
        let state = if galaxy.is_some() {
            RegenState::Ready
        } else {
            RegenState::NoGalaxy
        };
        Self {
            state,
            galaxy,
            resume: state,
            ..Self::new()
        }
    }

    pub fn state(&self) -> RegenState {
        self.state
    }

    pub fn galaxy(&self) -> Option<&GalaxySummary> {
        self.galaxy.as_ref()
    }

    pub fn pending(&self) -> Option<&GenerateGalaxyRequest> {
        self.pending.as_ref()
    }

    pub fn last_error(&self) -> Option<&Failure> {
        self.last_error.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    fn unexpected(&self, event: &RegenEvent) -> TransitionError {
        TransitionError::Unexpected {
            state: self.state,
            event: event.name(),
        }
    }

    fn stable_for(galaxy: &Option<GalaxySummary>) -> RegenState {
        if galaxy.is_some() {
            RegenState::Ready
        } else {
            RegenState::NoGalaxy
        }
    }

    pub fn transition(
        &self,
        event: RegenEvent,
    ) -> Result<(RegenFlow, Option<Command>), TransitionError> {
        use RegenState::*;

        let mut next = self.clone();
        let command = match (self.state, event) {
            (Generating | Clearing, RegenEvent::GenerateRequested(_))
            | (Generating | Clearing, RegenEvent::ClearRequested) => {
                return Err(TransitionError::Busy(self.state));
            }

            (NoGalaxy, RegenEvent::GenerateRequested(config)) => {
                let request = GenerateGalaxyRequest::from_config(&config);
                next.state = Generating;
                next.resume = NoGalaxy;
                next.pending = Some(request.clone());
                next.last_error = None;
                Some(Command::SubmitGeneration(request))
            }
            (Ready | ConfirmClear, RegenEvent::GenerateRequested(config)) => {
                next.state = ConfirmClear;
                if self.state == Ready {
                    next.resume = Ready;
                }
                next.pending = Some(GenerateGalaxyRequest::from_config(&config));
                next.last_error = None;
                None
            }
            (Ready, RegenEvent::ClearRequested) => {
                next.state = ConfirmClear;
                next.resume = Ready;
                next.pending = None;
                next.last_error = None;
                None
            }

            (ConfirmClear, RegenEvent::ClearConfirmed) => {
                next.state = Clearing;
                Some(Command::SubmitClear)
            }
            (ConfirmClear, RegenEvent::ClearCancelled) => {
                next.state = self.resume;
                next.pending = None;
                None
            }

            (Clearing, RegenEvent::ClearSucceeded) => {
                next.galaxy = None;
                next.resume = NoGalaxy;
                match self.pending.clone() {
                    Some(request) => {
                        next.state = Generating;
                        Some(Command::SubmitGeneration(request))
                    }
                    None => {
                        next.state = NoGalaxy;
                        None
                    }
                }
            }
            (Clearing, RegenEvent::ClearFailed(failure)) => {
                next.state = self.resume;
                next.pending = None;
                next.last_error = Some(failure);
                None
            }

            (Generating, RegenEvent::GenerationSucceeded(summary)) => {
                next.state = Ready;
                next.resume = Ready;
                next.galaxy = Some(summary);
                next.pending = None;
                next.last_error = None;
                None
            }
            (Generating, RegenEvent::GenerationFailed(failure)) => {
                if failure.kind == FailureKind::ConflictExists {
                    // The server has a galaxy we did not know about. Until it
                    // is loaded, cancelling returns to where we were.
                    next.state = ConfirmClear;
                } else {
                    next.state = self.resume;
                    next.pending = None;
                }
                next.last_error = Some(failure);
                None
            }

            (Generating | Clearing, RegenEvent::GalaxyLoaded(_)) => None,
            (NoGalaxy | Ready, RegenEvent::GalaxyLoaded(galaxy)) => {
                next.state = Self::stable_for(&galaxy);
                next.resume = next.state;
                next.galaxy = galaxy;
                None
            }
            (ConfirmClear, RegenEvent::GalaxyLoaded(galaxy)) => {
                next.resume = Self::stable_for(&galaxy);
                next.galaxy = galaxy;
                None
            }

            (_, event) => return Err(self.unexpected(&event)),
        };

        Ok((next, command))
    }
}

//! The connection-session state machine.
//!
//! Transport callbacks are modeled as events driving a pure transition
//! function; the async driver in [`crate::connection`] applies the
//! returned effects. This keeps the lifecycle logic testable without a
//! live socket.
//!
//! ```text
//! Idle --Dial--> Connecting --TransportOpen--> Connected
//!                    |  \                          |  \
//!             ConnectTimeout \                TransportClosed
//!                    |    TransportError           |    TransportError
//!                    v        \                    v        \
//!                  Closed      Errored           Closed      Errored
//! ```
//!
//! `Closed` and `Errored` are terminal: there is no reconnect. A dropped
//! session must be restarted by the caller.

/// Lifecycle phase of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    /// Socket dialed, open signal pending, deadline timer armed.
    Connecting,
    Connected,
    /// Terminal: closed by the peer or by the connect timeout.
    Closed,
    /// Terminal: a transport error was surfaced.
    Errored,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionPhase::Closed | SessionPhase::Errored)
    }
}

/// Inputs to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Caller asks the session to connect.
    Dial,
    /// The transport signalled "open".
    TransportOpen,
    /// The transport signalled "close".
    TransportClosed,
    /// The transport signalled an error; the message already names the
    /// attempted address.
    TransportError(String),
    /// The connect deadline elapsed before the open signal.
    ConnectTimeout,
    /// One raw message payload arrived.
    Frame(String),
}

/// Side effects the driver must apply after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    OpenSocket,
    ArmTimer,
    CancelTimer,
    CloseSocket,
    ProcessFrame(String),
    ReportError(String),
}

/// Pure transition function: `(phase, event) -> (phase, effects)`.
///
/// The connect timer and the open signal race exactly once per attempt;
/// whichever arrives first wins, and the loser's effect is suppressed
/// here (a timer event in `Connected` or a close event in `Closed` does
/// nothing). Frames are processed only while `Connected`.
pub fn transition(phase: SessionPhase, event: SessionEvent) -> (SessionPhase, Vec<Effect>) {
    use self::{SessionEvent as E, SessionPhase as P};

    match (phase, event) {
        (P::Idle, E::Dial) => (P::Connecting, vec![Effect::OpenSocket, Effect::ArmTimer]),

        // The timer is cancelled exactly once, on this transition; it must
        // never fire after open.
        (P::Connecting, E::TransportOpen) => (P::Connected, vec![Effect::CancelTimer]),
        (P::Connecting, E::ConnectTimeout) => (P::Closed, vec![Effect::CloseSocket]),
        (P::Connecting, E::TransportClosed) => (P::Closed, vec![Effect::CancelTimer]),
        (P::Connecting, E::TransportError(reason)) => (
            P::Errored,
            vec![Effect::CancelTimer, Effect::ReportError(reason)],
        ),

        (P::Connected, E::Frame(payload)) => {
            (P::Connected, vec![Effect::ProcessFrame(payload)])
        }
        (P::Connected, E::TransportClosed) => (P::Closed, vec![]),
        (P::Connected, E::TransportError(reason)) => {
            (P::Errored, vec![Effect::ReportError(reason)])
        }
        // Stale timer after the open signal won the race.
        (P::Connected, E::ConnectTimeout) => (P::Connected, vec![]),

        // Terminal phases absorb everything; frames outside Connected are
        // dropped; anything else is a no-op in its phase.
        (phase, _) => (phase, vec![]),
    }
}

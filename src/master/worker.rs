//! Player isolation.
//!
//! Each player lives on its own thread and is only reachable through a
//! request channel. The master waits for an answer with a deadline; a player
//! that errors, panics, overruns the deadline or dies is reported as a
//! [`FailureCause`] and never takes the master down with it.
//!
//! Panics on player threads are logged at debug level instead of going
//! through the default hook, so stderr stays clean for the caller.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::Once;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::error::RegistrationError;
use crate::game::{BotId, FailureCause, Move, Universe};
use crate::player::{BotView, Player};

/// Name prefix of player threads, followed by the bot id.
const THREAD_PREFIX: &str = "player-";

/// A move request: sequence number, universe snapshot, bot to move.
#[derive(Debug)]
struct Request {
    seq: u64,
    universe: Arc<Universe>,
    bot: BotId,
}

/// Answer to the request with the same sequence number.
#[derive(Debug)]
struct Reply {
    seq: u64,
    result: Result<Move, FailureCause>,
}

/// Handle to a player running on its own thread.
///
/// Dropping the handle closes the request channel; the thread exits once the
/// player returns from its current call. It is never joined, so a player
/// stuck in an endless loop cannot block the game.
#[derive(Debug)]
pub(crate) struct PlayerWorker {
    bot: BotId,
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    seq: u64,
}

impl PlayerWorker {
    /// Move `player` onto a fresh thread named after `bot`.
    pub(crate) fn spawn(player: Box<dyn Player>, bot: BotId) -> Result<Self, RegistrationError> {
        quiet_player_panics();
        let (requests, inbox) = mpsc::channel::<Request>();
        let (outbox, replies) = mpsc::channel::<Reply>();

        thread::Builder::new()
            .name(format!("{THREAD_PREFIX}{bot}"))
            .spawn(move || serve(player, &inbox, &outbox))
            .map_err(|err| RegistrationError::WorkerSpawn {
                bot,
                reason: err.to_string(),
            })?;

        Ok(Self {
            bot,
            requests,
            replies,
            seq: 0,
        })
    }

    /// Ask the player for a move on `universe`, waiting at most `timeout`.
    ///
    /// `None` waits without limit.
    pub(crate) fn request_move(
        &mut self,
        universe: Arc<Universe>,
        timeout: Option<Duration>,
    ) -> Result<Move, FailureCause> {
        self.seq += 1;
        let seq = self.seq;
        let request = Request {
            seq,
            universe,
            bot: self.bot,
        };
        if self.requests.send(request).is_err() {
            return Err(FailureCause::Disconnected);
        }

        let deadline = timeout.map(|t| Instant::now() + t);
        loop {
            let reply = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    match self.replies.recv_timeout(remaining) {
                        Ok(reply) => reply,
                        Err(RecvTimeoutError::Timeout) => return Err(FailureCause::Timeout),
                        Err(RecvTimeoutError::Disconnected) => {
                            return Err(FailureCause::Disconnected);
                        }
                    }
                }
                None => self
                    .replies
                    .recv()
                    .map_err(|_| FailureCause::Disconnected)?,
            };
            if reply.seq == seq {
                return reply.result;
            }
            trace!(bot = self.bot, stale = reply.seq, "dropping late reply");
        }
    }
}

/// Worker loop: answer requests until the master hangs up.
fn serve(mut player: Box<dyn Player>, inbox: &Receiver<Request>, outbox: &Sender<Reply>) {
    while let Ok(Request { seq, universe, bot }) = inbox.recv() {
        let result = match BotView::new(&universe, bot) {
            Some(view) => {
                match panic::catch_unwind(AssertUnwindSafe(|| player.get_move(&view))) {
                    Ok(Ok(mv)) => Ok(mv),
                    Ok(Err(err)) => Err(FailureCause::Error(format!("{err:#}"))),
                    Err(payload) => Err(FailureCause::Panicked(panic_message(&*payload))),
                }
            }
            None => Err(FailureCause::Error(format!("bot {bot} is not in the universe"))),
        };
        if outbox.send(Reply { seq, result }).is_err() {
            break;
        }
    }
    debug!("player worker exiting");
}

/// Install, once per process, a panic hook that logs panics of player
/// threads and hands every other panic to the previous hook.
fn quiet_player_panics() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let current = thread::current();
            match current.name() {
                Some(name) if is_player_thread(name) => {
                    debug!(thread = name, %info, "player panicked");
                }
                _ => previous(info),
            }
        }));
    });
}

fn is_player_thread(name: &str) -> bool {
    name.strip_prefix(THREAD_PREFIX)
        .is_some_and(|bot| bot.parse::<BotId>().is_ok())
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::SMALL_LAYOUT;
    use crate::player::{ScriptedPlayer, StoppingPlayer};

    struct Sleepy(Duration);

    impl Player for Sleepy {
        fn get_move(&mut self, _view: &BotView<'_>) -> anyhow::Result<Move> {
            thread::sleep(self.0);
            Ok(Move::East)
        }

        fn is_implemented(&self) -> bool {
            true
        }
    }

    struct Panicky;

    impl Player for Panicky {
        fn get_move(&mut self, _view: &BotView<'_>) -> anyhow::Result<Move> {
            panic!("boom");
        }

        fn is_implemented(&self) -> bool {
            true
        }
    }

    fn snapshot() -> Arc<Universe> {
        Arc::new(Universe::create(SMALL_LAYOUT, 2).unwrap())
    }

    #[test]
    fn test_worker_answers() {
        let mut worker = PlayerWorker::spawn(Box::new(StoppingPlayer), 0).unwrap();
        let mv = worker.request_move(snapshot(), Some(Duration::from_secs(5)));
        assert_eq!(mv, Ok(Move::Stop));
    }

    #[test]
    fn test_worker_reports_errors() {
        let mut worker = PlayerWorker::spawn(Box::new(ScriptedPlayer::new(vec![])), 0).unwrap();
        let result = worker.request_move(snapshot(), None);
        assert_eq!(
            result,
            Err(FailureCause::Error("script exhausted".to_string()))
        );
    }

    #[test]
    fn test_worker_survives_panics() {
        let mut worker = PlayerWorker::spawn(Box::new(Panicky), 1).unwrap();
        let result = worker.request_move(snapshot(), Some(Duration::from_secs(5)));
        assert_eq!(result, Err(FailureCause::Panicked("boom".to_string())));
        // still alive
        let result = worker.request_move(snapshot(), Some(Duration::from_secs(5)));
        assert!(matches!(result, Err(FailureCause::Panicked(_))));
    }

    #[test]
    fn test_worker_timeout_then_late_reply_is_dropped() {
        let mut worker = PlayerWorker::spawn(Box::new(Sleepy(Duration::from_millis(200))), 0).unwrap();
        let result = worker.request_move(snapshot(), Some(Duration::from_millis(10)));
        assert_eq!(result, Err(FailureCause::Timeout));
        // the stale answer to the first request must not be taken for this one
        let result = worker.request_move(snapshot(), Some(Duration::from_secs(5)));
        assert_eq!(result, Ok(Move::East));
    }

    #[test]
    fn test_unknown_bot_is_an_error() {
        let mut worker = PlayerWorker::spawn(Box::new(StoppingPlayer), 7).unwrap();
        let result = worker.request_move(snapshot(), Some(Duration::from_secs(5)));
        assert!(matches!(result, Err(FailureCause::Error(_))));
    }

    #[test]
    fn test_player_thread_names() {
        assert!(is_player_thread("player-0"));
        assert!(is_player_thread("player-12"));
        assert!(!is_player_thread("player-"));
        assert!(!is_player_thread("main"));
        assert!(!is_player_thread("master::tests::test_phases"));
    }

    fn bystander() {
        panic!("not a player");
    }

    #[test]
    fn test_hook_leaves_other_threads_unwinding() {
        let mut worker = PlayerWorker::spawn(Box::new(Panicky), 0).unwrap();
        assert!(matches!(
            worker.request_move(snapshot(), Some(Duration::from_secs(5))),
            Err(FailureCause::Panicked(_))
        ));
        // the hook is installed now; a non-player thread still unwinds normally
        let outcome = thread::Builder::new()
            .name("bystander".to_string())
            .spawn(bystander)
            .unwrap()
            .join();
        let payload = outcome.unwrap_err();
        assert_eq!(panic_message(&*payload), "not a player");
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(&*payload), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(&*payload), "owned");
        let payload: Box<dyn Any + Send> = Box::new(3_u8);
        assert_eq!(panic_message(&*payload), "unknown panic payload");
    }
}

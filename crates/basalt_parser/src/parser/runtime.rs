//! The parser runtime: a single-threaded cooperative scheduler over
//! suspendable rule tasks. Rules fork into parallel alternatives, delegate to
//! other rules, or abort; the runtime explores all live alternatives
//! breadth-first by input position, merges duplicate subparses through frames
//! memoized on `(token index, rule identity)`, selects the best successful
//! alternative per frame, and prunes the losers.

use super::task::{ParseCursor, Rule, RuleTask, Step, Wake};
use basalt_syntax::{SyntaxArena, SyntaxId, TokenId};
use rustc_hash::FxHashMap;

/// How many times the runtime will swallow a top-level error and retry the
/// surviving fork before giving up. Every retry makes forward progress
/// through a `Missing`-token continuation, but the cap bounds pathological
/// inputs.
const MAX_ERROR_RETRIES: u32 = 4096;

/// Counters describing one runtime invocation. `forks_spawned` always equals
/// `forks_pruned + forks_live_at_end` once a parse returns, and no suspended
/// fork survives a completed parse; tests pin both properties down.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ParseMetrics {
    pub frames_created: u32,
    pub forks_spawned: u32,
    /// Forks dropped before the end of the parse: losing alternatives and
    /// discarded error candidates. Dropping a suspended task releases all of
    /// its resources through its destructor.
    pub forks_pruned: u32,
    /// Forks still stored when the parse finished, all of them resolved.
    pub forks_live_at_end: u32,
    /// Forks left suspended when the parse finished. Zero whenever the parse
    /// produced a tree.
    pub forks_suspended_at_end: u32,
    pub error_retries: u32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct FrameId(u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
struct ForkId(u32);

/// Resolution state of a frame. The memo key keeps the *start* index; the
/// index after a successful parse lives only in the `Ready` payload.
#[derive(Clone, Copy, Debug)]
enum FrameState {
    Pending,
    Error { witness: u32 },
    Ready { syntax: SyntaxId, end_index: u32 },
}

/// A memoization entry: every live alternative for one `(token index, rule
/// identity)` key, the forks blocked on its resolution, and the best outcome
/// candidates seen so far.
struct Frame<C> {
    start_index: u32,
    call: C,
    state: FrameState,
    /// Live alternatives under this frame, in creation order. The order is
    /// the tie-break: earlier forks win equal outcomes.
    forks: Vec<ForkId>,
    ready: Option<ForkId>,
    error: Option<ForkId>,
    /// Forks suspended on `parse` of this frame. Kept across an error
    /// resolution so a swallow-retry can re-notify them.
    dependants: Vec<ForkId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ForkState {
    Queue,
    Parse,
    Error,
    Ready,
}

/// One live alternative: a suspended rule task plus its saved position.
struct Fork<C> {
    frame: FrameId,
    token_index: u32,
    state: ForkState,
    task: Box<dyn RuleTask<C>>,
    /// The input for the next resumption.
    wake: Wake,
    /// Produced syntax, once `Ready`.
    syntax: Option<SyntaxId>,
    /// Error witness (the token index the failure was observed at), once
    /// `Error`.
    witness: u32,
    /// The frame this fork is suspended on while in `Parse` state; kept on an
    /// error received from that frame so swallowing can walk back down.
    blocked_on: Option<FrameId>,
}

enum RootOutcome {
    Ready(SyntaxId),
    Error { witness: u32 },
}

type Resolution = Option<RootOutcome>;

/// Run `call` against `tokens` from index 0, driving forks until the root
/// frame resolves. On terminal failure the error witness index is returned.
pub(crate) fn parse_core<C: Rule>(
    tokens: &[TokenId],
    arena: &mut SyntaxArena,
    call: C,
) -> (Result<SyntaxId, u32>, ParseMetrics) {
    Runtime::new(tokens, arena).run(call)
}

struct Runtime<'a, C: Rule> {
    tokens: &'a [TokenId],
    arena: &'a mut SyntaxArena,
    frames: Vec<Frame<C>>,
    forks: Vec<Option<Fork<C>>>,
    /// Memoization lookup, keyed by start index and rule identity. The root
    /// frame is not memoized.
    memo_index: FxHashMap<(u32, C), FrameId>,
    /// Memoized frames ordered by start index, for garbage pruning.
    memo_order: Vec<FrameId>,
    root: FrameId,
    metrics: ParseMetrics,
}

impl<'a, C: Rule> Runtime<'a, C> {
    fn new(tokens: &'a [TokenId], arena: &'a mut SyntaxArena) -> Self {
        Self {
            tokens,
            arena,
            frames: Vec::new(),
            forks: Vec::new(),
            memo_index: FxHashMap::default(),
            memo_order: Vec::new(),
            root: FrameId(0),
            metrics: ParseMetrics::default(),
        }
    }

    fn run(mut self, call: C) -> (Result<SyntaxId, u32>, ParseMetrics) {
        self.root = self.create_frame(0, call);

        let result = loop {
            let leaf = self.find_least_advanced_leaf();
            let leaf_index = self.fork(leaf).token_index;
            self.prune_memo(leaf_index);

            let step = self.resume(leaf);
            match self.apply(leaf, step) {
                None => {}
                Some(RootOutcome::Ready(syntax)) => break Ok(syntax),
                Some(RootOutcome::Error { witness }) => {
                    self.metrics.error_retries += 1;
                    if self.metrics.error_retries > MAX_ERROR_RETRIES {
                        break Err(witness);
                    }
                    self.swallow_errors(self.root);
                }
            }
        };

        for fork in self.forks.iter().flatten() {
            self.metrics.forks_live_at_end += 1;
            if matches!(fork.state, ForkState::Queue | ForkState::Parse) {
                self.metrics.forks_suspended_at_end += 1;
            }
        }

        (result, self.metrics)
    }

    //#region Fork and frame storage

    fn fork(&self, id: ForkId) -> &Fork<C> {
        self.forks[id.0 as usize].as_ref().expect("fork is live")
    }

    fn fork_mut(&mut self, id: ForkId) -> &mut Fork<C> {
        self.forks[id.0 as usize].as_mut().expect("fork is live")
    }

    fn frame(&self, id: FrameId) -> &Frame<C> {
        &self.frames[id.0 as usize]
    }

    fn frame_mut(&mut self, id: FrameId) -> &mut Frame<C> {
        &mut self.frames[id.0 as usize]
    }

    fn alloc_fork(&mut self, fork: Fork<C>) -> ForkId {
        let id = ForkId(self.forks.len() as u32);
        self.forks.push(Some(fork));
        self.metrics.forks_spawned += 1;
        id
    }

    /// Create a new frame with its initial fork. The caller decides whether
    /// to memoize it.
    fn create_frame(&mut self, token_index: u32, call: C) -> FrameId {
        let frame_id = FrameId(self.frames.len() as u32);
        let task = call.spawn();
        self.frames.push(Frame {
            start_index: token_index,
            call,
            state: FrameState::Pending,
            forks: Vec::new(),
            ready: None,
            error: None,
            dependants: Vec::new(),
        });
        let fork = self.alloc_fork(Fork {
            frame: frame_id,
            token_index,
            state: ForkState::Queue,
            task,
            wake: Wake::Start,
            syntax: None,
            witness: 0,
            blocked_on: None,
        });
        self.frame_mut(frame_id).forks.push(fork);
        self.metrics.frames_created += 1;
        self.trace(|| format!("frame {frame_id:?} created at {token_index}"));
        frame_id
    }

    /// Drop a fork: unregister it everywhere and release its task. Dropping
    /// a suspended task is the terminate mode of this runtime; the task's
    /// destructor unwinds whatever it held.
    fn discard_fork(&mut self, id: ForkId) {
        let frame = self.fork(id).frame;
        let blocked_on = self.fork(id).blocked_on;

        let forks = &mut self.frame_mut(frame).forks;
        if let Some(at) = forks.iter().position(|f| *f == id) {
            forks.remove(at);
        }
        if let Some(dependency) = blocked_on {
            let dependants = &mut self.frame_mut(dependency).dependants;
            if let Some(at) = dependants.iter().position(|f| *f == id) {
                dependants.remove(at);
            }
        }

        self.forks[id.0 as usize] = None;
        self.metrics.forks_pruned += 1;
        self.trace(|| format!("fork {id:?} pruned"));
    }
    //#endregion

    //#region Scheduling

    /// The runnable fork with the smallest saved token index among everything
    /// reachable from the root frame. Ties resolve to the first one found,
    /// which is creation order.
    fn find_least_advanced_leaf(&self) -> ForkId {
        self.find_leaf_in(self.root)
            .expect("scheduler has no runnable fork")
    }

    fn find_leaf_in(&self, frame: FrameId) -> Option<ForkId> {
        let mut best: Option<(u32, ForkId)> = None;

        for &fork_id in &self.frame(frame).forks {
            let fork = self.fork(fork_id);
            let candidate = match fork.state {
                ForkState::Queue => Some((fork.token_index, fork_id)),
                ForkState::Parse => {
                    let dependency = fork.blocked_on.expect("parse fork has a dependency");
                    self.find_leaf_in(dependency)
                        .map(|leaf| (self.fork(leaf).token_index, leaf))
                }
                _ => None,
            };
            if let Some((index, leaf)) = candidate {
                if best.is_none_or(|(best_index, _)| index < best_index) {
                    best = Some((index, leaf));
                }
            }
        }

        best.map(|(_, leaf)| leaf)
    }

    /// Resume the fork's task with its pending wake value, then save the
    /// advanced token position back onto the fork.
    fn resume(&mut self, id: ForkId) -> Step<C> {
        let fork = self.fork_mut(id);
        debug_assert_eq!(fork.state, ForkState::Queue);
        let wake = std::mem::replace(&mut fork.wake, Wake::Start);
        let index = fork.token_index as usize;
        fork.blocked_on = None;

        // The task is moved out for the duration of the resumption so the
        // cursor can borrow the arena without touching fork storage.
        let mut task = std::mem::replace(&mut self.fork_mut(id).task, noop_task());
        let mut cursor = ParseCursor::new(self.tokens, self.arena, index);
        let step = task.resume(&mut cursor, wake);
        let end = cursor.index() as u32;

        let fork = self.fork_mut(id);
        fork.task = task;
        fork.token_index = end;
        step
    }

    fn apply(&mut self, id: ForkId, step: Step<C>) -> Resolution {
        match step {
            Step::Fork(count) => {
                debug_assert!(count >= 2, "forking requires at least two alternatives");
                self.apply_fork(id, count);
                None
            }
            Step::Parse(call) => self.apply_parse(id, call),
            Step::Error => {
                let witness = self.fork(id).token_index;
                self.on_error(id, witness)
            }
            Step::Done(syntax) => self.on_ready(id, syntax),
        }
    }

    /// Clone the forking task into `count - 1` siblings inserted right after
    /// it, waking each alternative with its own index.
    fn apply_fork(&mut self, id: ForkId, count: u32) {
        let frame = self.fork(id).frame;
        let token_index = self.fork(id).token_index;

        self.fork_mut(id).wake = Wake::Fork(0);

        let mut slot = self
            .frame(frame)
            .forks
            .iter()
            .position(|f| *f == id)
            .expect("forking fork belongs to its frame")
            + 1;
        for alternative in 1..count {
            let task = self.fork(id).task.clone_task();
            let sibling = self.alloc_fork(Fork {
                frame,
                token_index,
                state: ForkState::Queue,
                task,
                wake: Wake::Fork(alternative),
                syntax: None,
                witness: 0,
                blocked_on: None,
            });
            self.frame_mut(frame).forks.insert(slot, sibling);
            slot += 1;
        }
        self.trace(|| format!("fork {id:?} split into {count} at {token_index}"));
    }

    /// The fork wants a subparse: find or create the frame for it and either
    /// join its resolution immediately or block on it.
    fn apply_parse(&mut self, id: ForkId, call: C) -> Resolution {
        let token_index = self.fork(id).token_index;

        let dependency = match self.memo_index.get(&(token_index, call.clone())) {
            Some(frame) => *frame,
            None => {
                let frame = self.create_frame(token_index, call.clone());
                self.memo_index.insert((token_index, call), frame);
                let at = self
                    .memo_order
                    .partition_point(|f| self.frame(*f).start_index <= token_index);
                self.memo_order.insert(at, frame);
                frame
            }
        };

        match self.frame(dependency).state {
            FrameState::Pending => {
                let fork = self.fork_mut(id);
                fork.state = ForkState::Parse;
                fork.blocked_on = Some(dependency);
                self.frame_mut(dependency).dependants.push(id);
                None
            }
            FrameState::Ready { syntax, end_index } => {
                let fork = self.fork_mut(id);
                fork.token_index = end_index;
                fork.wake = Wake::Parse(syntax);
                None
            }
            FrameState::Error { witness } => self.on_error(id, witness),
        }
    }

    /// Drop memoized frames that start before the least-advanced live leaf:
    /// no future `parse` can reach them any more.
    fn prune_memo(&mut self, leaf_index: u32) {
        let cut = self
            .memo_order
            .partition_point(|f| self.frame(*f).start_index < leaf_index);
        for at in 0..cut {
            let frame = self.memo_order[at];
            let key = (
                self.frame(frame).start_index,
                self.frame(frame).call.clone(),
            );
            self.memo_index.remove(&key);
        }
        self.memo_order.drain(..cut);
    }
    //#endregion

    //#region Fork resolution

    /// A fork produced a syntax node. Record it as the frame's ready
    /// candidate, displacing a worse previous candidate, and commit the frame
    /// if nothing else is still running.
    fn on_ready(&mut self, id: ForkId, syntax: SyntaxId) -> Resolution {
        let frame = self.fork(id).frame;
        {
            let fork = self.fork_mut(id);
            fork.state = ForkState::Ready;
            fork.syntax = Some(syntax);
        }
        self.trace(|| format!("fork {id:?} ready at {}", self.fork(id).token_index));

        if let Some(previous) = self.frame(frame).ready {
            let loser = if self.ready_is_better(id, previous) {
                self.frame_mut(frame).ready = Some(id);
                previous
            } else {
                id
            };
            self.discard_fork(loser);
        } else {
            if let Some(error) = self.frame(frame).error {
                self.frame_mut(frame).error = None;
                self.discard_fork(error);
            }
            self.frame_mut(frame).ready = Some(id);
        }

        self.try_commit(frame)
    }

    /// A fork failed, either by its own `Error` step or by an error
    /// propagated from the frame it was blocked on. Keep the better error
    /// witness per frame; discard the error entirely if a sibling already
    /// succeeded.
    fn on_error(&mut self, id: ForkId, witness: u32) -> Resolution {
        let frame = self.fork(id).frame;
        {
            let fork = self.fork_mut(id);
            fork.state = ForkState::Error;
            fork.witness = witness;
        }
        self.trace(|| format!("fork {id:?} error witnessed at {witness}"));

        if self.frame(frame).ready.is_some() {
            self.discard_fork(id);
            return self.try_commit(frame);
        }

        if let Some(previous) = self.frame(frame).error {
            let loser = if self.error_is_better(id, previous) {
                self.frame_mut(frame).error = Some(id);
                previous
            } else {
                id
            };
            self.discard_fork(loser);
        } else {
            self.frame_mut(frame).error = Some(id);
        }

        self.try_commit(frame)
    }

    /// A later success is better when it consumed more input; on equal ends
    /// the earlier-created alternative stays.
    fn ready_is_better(&self, new: ForkId, previous: ForkId) -> bool {
        let new_end = self.fork(new).token_index;
        let previous_end = self.fork(previous).token_index;
        if new_end != previous_end {
            return new_end > previous_end;
        }
        self.creation_slot(new) < self.creation_slot(previous)
    }

    /// The deeper error witness is better; on equal witnesses the
    /// earlier-created alternative stays.
    fn error_is_better(&self, new: ForkId, previous: ForkId) -> bool {
        let new_witness = self.fork(new).witness;
        let previous_witness = self.fork(previous).witness;
        if new_witness != previous_witness {
            return new_witness > previous_witness;
        }
        self.creation_slot(new) < self.creation_slot(previous)
    }

    fn creation_slot(&self, id: ForkId) -> usize {
        let frame = self.fork(id).frame;
        self.frame(frame)
            .forks
            .iter()
            .position(|f| *f == id)
            .expect("fork belongs to its frame")
    }

    /// Resolve the frame once its last non-terminal fork has finished: the
    /// recorded ready candidate wins over any error.
    fn try_commit(&mut self, frame: FrameId) -> Resolution {
        if !matches!(self.frame(frame).state, FrameState::Pending) {
            return None;
        }
        let any_running = self.frame(frame).forks.iter().any(|f| {
            matches!(
                self.fork(*f).state,
                ForkState::Queue | ForkState::Parse
            )
        });
        if any_running {
            return None;
        }

        if let Some(winner) = self.frame(frame).ready {
            let syntax = self.fork(winner).syntax.expect("ready fork has syntax");
            let end_index = self.fork(winner).token_index;
            self.frame_ready(frame, syntax, end_index)
        } else if let Some(winner) = self.frame(frame).error {
            let witness = self.fork(winner).witness;
            self.frame_error(frame, witness)
        } else {
            unreachable!("frame committed with no resolved fork")
        }
    }

    /// Publish a frame's success: cache the result and requeue every
    /// dependant just past it.
    fn frame_ready(&mut self, frame: FrameId, syntax: SyntaxId, end_index: u32) -> Resolution {
        self.frame_mut(frame).state = FrameState::Ready { syntax, end_index };
        self.trace(|| format!("frame {frame:?} ready through {end_index}"));

        if frame == self.root {
            return Some(RootOutcome::Ready(syntax));
        }

        let dependants = std::mem::take(&mut self.frame_mut(frame).dependants);
        for dependant in dependants {
            let home = self.fork(dependant).frame;
            // A dependant that had received this frame's earlier error may be
            // recorded as its own frame's error candidate; that record is
            // obsolete now.
            if self.frame(home).error == Some(dependant) {
                self.frame_mut(home).error = None;
            }
            let fork = self.fork_mut(dependant);
            fork.state = ForkState::Queue;
            fork.token_index = end_index;
            fork.wake = Wake::Parse(syntax);
            fork.blocked_on = None;
        }

        None
    }

    /// Publish a frame's failure to every dependant. The dependants list is
    /// retained: if the error is later swallowed and this frame resolves
    /// after a retry, they are notified again.
    fn frame_error(&mut self, frame: FrameId, witness: u32) -> Resolution {
        self.frame_mut(frame).state = FrameState::Error { witness };
        self.trace(|| format!("frame {frame:?} error witnessed at {witness}"));

        if frame == self.root {
            return Some(RootOutcome::Error { witness });
        }

        let dependants = self.frame(frame).dependants.clone();
        let mut resolution = None;
        for dependant in dependants {
            let Some(fork) = &self.forks[dependant.0 as usize] else {
                continue;
            };
            // A dependant that already carries this frame's error from an
            // earlier resolution round needs no re-delivery.
            if fork.state == ForkState::Error {
                continue;
            }
            let result = self.on_error(dependant, witness);
            resolution = resolution.or(result);
        }

        resolution
    }

    /// Walk the chain of single-fork error frames from the root back down to
    /// the fork that originally failed and make it runnable again in swallow
    /// mode. Frames along the chain return to pending so they can resolve a
    /// second time.
    fn swallow_errors(&mut self, frame: FrameId) {
        debug_assert!(matches!(self.frame(frame).state, FrameState::Error { .. }));
        self.frame_mut(frame).state = FrameState::Pending;
        self.frame_mut(frame).error = None;
        self.trace(|| format!("frame {frame:?} swallowed"));

        debug_assert_eq!(self.frame(frame).forks.len(), 1);
        let fork = self.frame(frame).forks[0];

        match self.fork(fork).blocked_on {
            Some(dependency) => {
                self.fork_mut(fork).state = ForkState::Parse;
                if matches!(self.frame(dependency).state, FrameState::Error { .. }) {
                    self.swallow_errors(dependency);
                }
            }
            None => {
                let fork = self.fork_mut(fork);
                fork.state = ForkState::Queue;
                fork.wake = Wake::Swallow;
            }
        }
    }
    //#endregion

    #[inline]
    fn trace<F: Fn() -> String>(&self, message: F) {
        #[cfg(feature = "debug-tracing")]
        eprintln!("[runtime] {}", message());
        #[cfg(not(feature = "debug-tracing"))]
        let _ = message;
    }
}

/// Placeholder standing in for a task while it is being resumed.
fn noop_task<C>() -> Box<dyn RuleTask<C>> {
    struct Noop;
    impl<C> RuleTask<C> for Noop {
        fn resume(&mut self, _: &mut ParseCursor<'_>, _: Wake) -> Step<C> {
            unreachable!("placeholder task resumed")
        }
        fn clone_task(&self) -> Box<dyn RuleTask<C>> {
            Box::new(Noop)
        }
    }
    Box::new(Noop)
}

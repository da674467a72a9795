//! In-process message-passing process group.
//!
//! Ranks `1..size` run on their own threads and share no memory with the root:
//! every input reaches them through a broadcast message and every partial sum
//! leaves through the reduce channel. The caller acts as rank 0, folds its own
//! partition, and blocks in the collective until exactly one partial per rank
//! has arrived for the current epoch.

use std::{
    num::NonZeroUsize,
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver, RecvTimeoutError, Sender},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use tracing::{debug, instrument, warn};

use super::{PartialSum, combine};
use crate::{
    Result,
    distance::{SumOfSquares, sum_squared_differences},
    error::ReduceError,
    partition::Partition,
    vectors::VectorPair,
};

/// Interval at which the root checks whether silent ranks are still alive.
const LIVENESS_POLL: Duration = Duration::from_millis(50);

/// How input vectors are distributed to the ranks of a [`ProcessGroup`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DataLayout {
    /// Every rank receives a full copy of both vectors.
    #[default]
    Replicated,
    /// Every rank receives only the slices of its own partition.
    Scattered,
}

enum Payload {
    Replicated {
        left: Arc<Vec<f64>>,
        right: Arc<Vec<f64>>,
    },
    Scattered { left: Vec<f64>, right: Vec<f64> },
}

struct Task {
    epoch: u64,
    partition: Partition,
    payload: Payload,
}

impl Task {
    fn fold(&self) -> PartialSum {
        match &self.payload {
            Payload::Replicated { left, right } => PartialSum::compute(self.partition, left, right),
            Payload::Scattered { left, right } => {
                PartialSum::from_parts(self.partition, sum_squared_differences(left, right))
            }
        }
    }
}

enum Message {
    Task(Task),
    Shutdown,
}

struct Contribution {
    epoch: u64,
    rank: usize,
    partial: PartialSum,
}

struct GroupState {
    epoch: u64,
    senders: Vec<Sender<Message>>,
    results: Receiver<Contribution>,
    handles: Vec<JoinHandle<()>>,
}

/// Fixed-size group of ranks that reduce partial sums to rank 0.
///
/// Ranks live for the lifetime of the group so repeated reductions reuse the
/// same workers. Reductions on one group are serialised. Dropping the group
/// shuts every rank down and joins it.
///
/// # Examples
/// ```
/// use std::num::NonZeroUsize;
/// use distred_core::{DataLayout, ProcessGroup, VectorPair};
///
/// let group = ProcessGroup::spawn(NonZeroUsize::new(3).expect("non-zero"))?;
/// let pair = VectorPair::new(vec![0.0; 4], vec![1.0; 4])?;
/// let total = group.reduce_sum(&pair, DataLayout::Scattered)?;
/// assert_eq!(total.value(), 4.0);
/// # Ok::<(), distred_core::ReduceError>(())
/// ```
pub struct ProcessGroup {
    size: NonZeroUsize,
    state: Mutex<GroupState>,
}

impl ProcessGroup {
    /// Starts a group of `size` ranks; the caller becomes rank 0.
    ///
    /// # Errors
    /// Returns [`ReduceError::WorkerSpawn`] when a rank thread cannot be
    /// started.
    #[instrument(name = "core.spawn_group", err, fields(size = size.get()))]
    pub fn spawn(size: NonZeroUsize) -> Result<Self> {
        let (outbox, results) = mpsc::channel();
        let peers = size.get() - 1;
        let mut senders = Vec::with_capacity(peers);
        let mut handles = Vec::with_capacity(peers);

        for rank in 1..size.get() {
            let (sender, inbox) = mpsc::channel();
            let rank_outbox = outbox.clone();
            let handle = thread::Builder::new()
                .name(format!("distred-rank-{rank}"))
                .spawn(move || rank_main(rank, &inbox, &rank_outbox))
                .map_err(|error| ReduceError::WorkerSpawn {
                    reason: Arc::from(error.to_string()),
                })?;
            senders.push(sender);
            handles.push(handle);
        }
        // Only ranks hold reduce senders, so a closed channel means every
        // rank has exited.
        drop(outbox);

        Ok(Self {
            size,
            state: Mutex::new(GroupState {
                epoch: 0,
                senders,
                results,
                handles,
            }),
        })
    }

    /// Number of ranks in the group, including the root.
    #[must_use]
    pub const fn size(&self) -> NonZeroUsize {
        self.size
    }

    /// Broadcasts `pair` according to `layout`, folds every partition, and
    /// reduces the partial sums to the root.
    ///
    /// # Errors
    /// - [`ReduceError::WorkerLost`] when a rank has exited.
    /// - [`ReduceError::IncompleteCombine`] when a rank contributes twice.
    /// - [`ReduceError::GroupPoisoned`] when an earlier reduction panicked.
    #[instrument(
        name = "core.reduce_to_root",
        err,
        skip_all,
        fields(len = pair.len(), ranks = self.size.get(), layout = ?layout),
    )]
    pub fn reduce_sum(&self, pair: &VectorPair, layout: DataLayout) -> Result<SumOfSquares> {
        let mut state = self.state.lock().map_err(|_| ReduceError::GroupPoisoned)?;
        state.epoch += 1;
        let epoch = state.epoch;
        let len = pair.len();

        for (offset, sender) in state.senders.iter().enumerate() {
            let rank = offset + 1;
            let partition = Partition::for_worker(len, self.size, rank);
            let task = Task {
                epoch,
                partition,
                payload: payload_for(pair, partition, layout),
            };
            sender
                .send(Message::Task(task))
                .map_err(|_| ReduceError::WorkerLost { rank })?;
        }

        let root = Partition::for_worker(len, self.size, 0);
        let mut partials = Vec::with_capacity(self.size.get());
        partials.push(PartialSum::compute(root, pair.left(), pair.right()));
        let mut contributed = vec![false; self.size.get()];
        if let Some(flag) = contributed.first_mut() {
            *flag = true;
        }

        while partials.len() < self.size.get() {
            let contribution = match state.results.recv_timeout(LIVENESS_POLL) {
                Ok(contribution) => contribution,
                Err(RecvTimeoutError::Timeout) => {
                    check_liveness(&state.handles, &contributed)?;
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ReduceError::WorkerLost {
                        rank: first_missing(&contributed),
                    });
                }
            };

            if contribution.epoch != epoch {
                debug!(
                    rank = contribution.rank,
                    stale_epoch = contribution.epoch,
                    epoch,
                    "discarding partial from an earlier reduction"
                );
                continue;
            }
            match contributed.get_mut(contribution.rank) {
                Some(flag) if !*flag => *flag = true,
                _ => {
                    return Err(ReduceError::IncompleteCombine {
                        expected: self.size.get(),
                        received: partials.len(),
                    });
                }
            }
            partials.push(contribution.partial);
        }

        combine(partials, self.size.get(), len)
    }
}

impl std::fmt::Debug for ProcessGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGroup")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        let state = match self.state.get_mut() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        for (offset, sender) in state.senders.iter().enumerate() {
            if sender.send(Message::Shutdown).is_err() {
                debug!(rank = offset + 1, "rank exited before shutdown");
            }
        }
        for (offset, handle) in state.handles.drain(..).enumerate() {
            if handle.join().is_err() {
                warn!(rank = offset + 1, "rank panicked before shutdown");
            }
        }
    }
}

fn rank_main(rank: usize, inbox: &Receiver<Message>, outbox: &Sender<Contribution>) {
    while let Ok(Message::Task(task)) = inbox.recv() {
        let contribution = Contribution {
            epoch: task.epoch,
            rank,
            partial: task.fold(),
        };
        if outbox.send(contribution).is_err() {
            break;
        }
    }
}

fn payload_for(pair: &VectorPair, partition: Partition, layout: DataLayout) -> Payload {
    match layout {
        DataLayout::Replicated => Payload::Replicated {
            left: pair.shared_left(),
            right: pair.shared_right(),
        },
        DataLayout::Scattered => Payload::Scattered {
            left: partition.slice(pair.left()).to_vec(),
            right: partition.slice(pair.right()).to_vec(),
        },
    }
}

fn check_liveness(handles: &[JoinHandle<()>], contributed: &[bool]) -> Result<()> {
    for (offset, handle) in handles.iter().enumerate() {
        let rank = offset + 1;
        let pending = !contributed.get(rank).copied().unwrap_or(true);
        if pending && handle.is_finished() {
            return Err(ReduceError::WorkerLost { rank });
        }
    }
    Ok(())
}

fn first_missing(contributed: &[bool]) -> usize {
    contributed
        .iter()
        .position(|flag| !flag)
        .unwrap_or(contributed.len())
}

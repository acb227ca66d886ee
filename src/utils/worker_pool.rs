//! Generic preprocess / parallel-worker / ordered-postprocess pipeline,
//! mirrored from `calling::variants::preprocessing::ObservationProcessor`'s
//! usage pattern in the crate this one is descended from: one
//! preprocessor thread feeds work items onto a bounded channel, a pool
//! of worker threads drain it and each emit a `Box<Out>`, and the
//! calling thread runs the postprocessor strictly in submission order
//! even though workers finish out of order (`spec.md` §5).

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use crossbeam::channel::{bounded, Receiver, Sender};

/// Implemented by a worker's output type so results can be buffered and
/// released to the postprocessor in the order they were submitted.
pub trait Orderable {
    fn index(&self) -> usize;
}

pub fn worker_pool<Item, Out, P, W, Post>(
    preprocessor: P,
    workers: impl IntoIterator<Item = W>,
    mut postprocessor: Post,
    item_capacity: usize,
    out_capacity: usize,
) -> Result<()>
where
    Item: Send + 'static,
    Out: Orderable + Send + 'static,
    P: FnOnce(Sender<Item>) -> Result<()> + Send,
    W: FnOnce(Receiver<Item>, Sender<Box<Out>>) -> Result<()> + Send,
    Post: FnMut(Box<Out>) -> Result<()>,
{
    let (item_tx, item_rx) = bounded::<Item>(item_capacity.max(1));
    let (out_tx, out_rx) = bounded::<Box<Out>>(out_capacity.max(1));

    let scope_result = crossbeam::scope(|scope| -> Result<()> {
        let pre_handle = scope.spawn(move |_| preprocessor(item_tx));

        let worker_handles: Vec<_> = workers
            .into_iter()
            .map(|worker| {
                let rx = item_rx.clone();
                let tx = out_tx.clone();
                scope.spawn(move |_| worker(rx, tx))
            })
            .collect();
        drop(item_rx);
        drop(out_tx);

        let mut pending: HashMap<usize, Box<Out>> = HashMap::new();
        let mut next_index = 0usize;
        for out in out_rx {
            pending.insert(out.index(), out);
            while let Some(next) = pending.remove(&next_index) {
                postprocessor(next)?;
                next_index += 1;
            }
        }

        pre_handle.join().map_err(|_| anyhow!("preprocessor thread panicked"))??;
        for handle in worker_handles {
            handle.join().map_err(|_| anyhow!("worker thread panicked"))??;
        }

        Ok(())
    });

    scope_result.map_err(|_| anyhow!("worker pool scope panicked"))?
}

use std::{ptr::NonNull, sync::Arc, thread};

use blockpool::{BlockPool, GrowthPolicy};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

const THREADS: usize = 4;
const ROUNDS: usize = 1_000;
const BURST: usize = 64;

#[derive(Debug)]
#[allow(dead_code)]
struct Message {
    id: u64,
    kind: u32,
    payload: [u8; 48],
}

fn churn(pool: &BlockPool<Message>, worker: usize) -> u64 {
    let mut held: Vec<NonNull<Message>> = Vec::with_capacity(BURST);
    let mut checksum = 0;

    for round in 0..ROUNDS {
        for i in 0..BURST {
            let slot = pool.acquire();
            let id = (worker * ROUNDS * BURST + round * BURST + i) as u64;

            unsafe {
                slot.as_ptr().write(Message {
                    id,
                    kind: (i % 4) as u32,
                    payload: [worker as u8; 48],
                });
            }
            held.push(slot);
        }

        // keep half of the burst live into the next round
        for slot in held.drain(BURST / 2..) {
            unsafe {
                checksum ^= slot.as_ref().id;
                slot.as_ptr().drop_in_place();
                pool.release(slot);
            }
        }
    }

    for slot in held {
        unsafe {
            checksum ^= slot.as_ref().id;
            slot.as_ptr().drop_in_place();
            pool.release(slot);
        }
    }

    checksum
}

fn main() {
    let console_log = tracing_subscriber::fmt::Layer::new()
        .with_ansi(true)
        .with_writer(std::io::stdout);
    let subscriber = tracing_subscriber::registry().with(console_log);
    let _ = tracing::subscriber::set_global_default(subscriber);

    for growth in [GrowthPolicy::Linear, GrowthPolicy::Fixed, GrowthPolicy::Doubling] {
        let pool = Arc::new(BlockPool::<Message>::with_growth(growth));

        let workers: Vec<_> = (0..THREADS)
            .map(|worker| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || churn(&pool, worker))
            })
            .collect();

        let checksum = workers
            .into_iter()
            .map(|w| w.join().expect("worker panicked"))
            .fold(0, |acc, c| acc ^ c);

        let stats = pool.stats();
        info!(
            ?growth,
            chunks = stats.chunks,
            capacity = stats.capacity,
            issued = stats.issued,
            live = stats.live(),
            checksum,
            "churn finished"
        );
    }
}

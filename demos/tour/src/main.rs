//! Walks through the `allocvec` containers and reports what the allocator saw.
//!
//! ```bash
//! allocvec-tour all
//! allocvec-tour dict --capacity 1 --log-level trace
//! allocvec-tour list --fail-after 2      # growth fails, errors are reported
//! ```

mod stack_alloc;

use std::alloc::Layout;
use std::cell::Cell;
use std::ptr::NonNull;

use allocvec::{
    cat, AllocStats, Allocator, Array, AssocArray, DefaultAllocator, GrowthPolicy, StringBuilder,
    TrackingAllocator, DEFAULT_INITIAL_CAPACITY,
};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use stack_alloc::StackAllocator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Walkthrough {
    /// Concatenate, format, trim and slice a string
    String,
    /// Push, insert, remove and sort an integer list
    List,
    /// Put, update, look up and remove dictionary entries
    Dict,
    /// Build a string inside a fixed stack region
    Stack,
    /// Run every walkthrough in turn
    All,
}

#[derive(Parser, Debug)]
#[command(name = "allocvec-tour")]
#[command(about = "Exercise the allocvec containers on a tracking allocator", long_about = None)]
struct Args {
    /// Walkthrough to run
    #[arg(value_enum, default_value_t = Walkthrough::All)]
    walkthrough: Walkthrough,

    /// Initial capacity given to every container
    #[arg(short, long, default_value_t = 2)]
    capacity: usize,

    /// Log filter, e.g. "info" or "allocvec=trace"
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Refuse every allocation request after this many have succeeded
    #[arg(short, long)]
    fail_after: Option<usize>,
}

/// Passes requests through until its budget runs out.
struct Budgeted {
    remaining: Option<Cell<usize>>,
}

impl Budgeted {
    fn new(budget: Option<usize>) -> Self {
        Self {
            remaining: budget.map(Cell::new),
        }
    }

    fn admit(&self) -> bool {
        match &self.remaining {
            None => true,
            Some(left) if left.get() == 0 => false,
            Some(left) => {
                left.set(left.get() - 1);
                true
            }
        }
    }
}

unsafe impl Allocator for Budgeted {
    fn alloc(&self, layout: Layout) -> Option<NonNull<u8>> {
        if self.admit() {
            DefaultAllocator.alloc(layout)
        } else {
            None
        }
    }

    unsafe fn realloc(
        &self,
        ptr: NonNull<u8>,
        layout: Layout,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        if self.admit() {
            // SAFETY: forwarded contract
            unsafe { DefaultAllocator.realloc(ptr, layout, new_size) }
        } else {
            None
        }
    }

    unsafe fn free(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: forwarded contract
        unsafe { DefaultAllocator.free(ptr, layout) }
    }
}

type Tracker = TrackingAllocator<Budgeted>;

fn string_walkthrough(alloc: &Tracker, capacity: usize) -> allocvec::Result<()> {
    tracing::info!("--- string ---");
    let mut s = StringBuilder::new_in(capacity, alloc)?;
    s.cat("Hello, ")?;
    s.cat("world!")?;
    tracing::info!(text = %s, len = s.len(), "concatenated");

    cat!(s, " ratio={:.2} answer={}", 12.3456_f64, 42)?;
    s.cat(' ')?;
    s.cat(0.5f64)?;
    tracing::info!(text = %s, "formatted");

    let world = s.substring(7, 5)?;
    tracing::info!(substring = %world, at = ?s.find("world"), "sliced");

    let mut padded = StringBuilder::from_str_in("  \t trimmed \n", alloc)?;
    padded.trim();
    tracing::info!(text = %padded, "trimmed");

    s.set_capacity(0)?;
    tracing::info!(len = s.len(), "string cleared");
    Ok(())
}

fn list_walkthrough(alloc: &Tracker, capacity: usize) -> allocvec::Result<()> {
    tracing::info!("--- list ---");
    let mut list: Array<i32, _> = Array::new_in(capacity, Some(i32::cmp), alloc)?;
    for item in [1, 2, 3, 4, 5] {
        if let Err(err) = list.push(item) {
            tracing::error!(item, %err, "push failed");
            return Err(err);
        }
    }
    for (index, item) in list.iter().enumerate() {
        tracing::info!(index, item, "list item");
    }

    list.insert(0, 42)?;
    list.insert_empty_run(3, 2)?;
    tracing::info!(items = ?list.as_slice(), "after inserts");

    let removed = list.remove_swap(0)?;
    tracing::info!(removed, items = ?list.as_slice(), "swap removal");
    let removed = list.remove_ordered(1)?;
    tracing::info!(removed, items = ?list.as_slice(), "ordered removal");

    list.sort()?;
    tracing::info!(items = ?list.as_slice(), found = ?list.find(&4)?, "sorted");

    while let Some(top) = list.pop() {
        tracing::debug!(top, "popped");
    }
    Ok(())
}

fn dict_walkthrough(alloc: &Tracker, capacity: usize) -> allocvec::Result<()> {
    tracing::info!("--- dict ---");
    let mut dict: AssocArray<i32, &str, _> = AssocArray::new_in(capacity, i32::cmp, alloc)?;
    for (key, value) in [(1, "one"), (2, "two"), (3, "three")] {
        if let Err(err) = dict.put(key, value) {
            tracing::error!(key, %err, "put failed");
            return Err(err);
        }
    }
    for key in [1, 2, 3, 4] {
        match dict.try_get(&key) {
            Ok(value) => tracing::info!(key, value, "dict value"),
            Err(err) => tracing::warn!(key, %err, code = err.kind().code(), "lookup failed"),
        }
    }

    dict.put(1, "uno")?;
    dict.remove(&2);
    tracing::info!(entries = ?dict, "after update and removal");
    Ok(())
}

fn stack_walkthrough(capacity: usize) -> allocvec::Result<()> {
    tracing::info!("--- stack allocator ---");
    let stack = StackAllocator::new(128);
    {
        let mut s = StringBuilder::new_in(capacity, &stack)?;
        s.cat("Hello, ")?;
        s.cat("world!")?;
        tracing::info!(text = %s, used = stack.used(), "built in stack region");

        let too_big = "x".repeat(256);
        match s.cat(too_big.as_str()) {
            Ok(()) => tracing::warn!("stack region unexpectedly large enough"),
            Err(err) => tracing::info!(%err, text = %s, "overflowing the region is an ordinary error"),
        }
    }
    tracing::info!(used = stack.used(), "region released");
    Ok(())
}

fn report(stats: AllocStats) {
    println!(
        "allocations={} reallocations={} frees={} failures={} live_bytes={} peak_bytes={}",
        stats.allocations,
        stats.reallocations,
        stats.frees,
        stats.failures,
        stats.live_bytes,
        stats.peak_bytes
    );
}

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log_level))
        .with_target(false)
        .init();

    let policy = GrowthPolicy::STANDARD;
    tracing::info!(
        reserve = policy.reserve,
        default_capacity = DEFAULT_INITIAL_CAPACITY,
        fail_after = ?args.fail_after,
        "containers grow to capacity * 2 + reserve"
    );

    let tracker = TrackingAllocator::wrap(Budgeted::new(args.fail_after));
    let run = |walkthrough: Walkthrough| -> allocvec::Result<()> {
        match walkthrough {
            Walkthrough::String => string_walkthrough(&tracker, args.capacity),
            Walkthrough::List => list_walkthrough(&tracker, args.capacity),
            Walkthrough::Dict => dict_walkthrough(&tracker, args.capacity),
            Walkthrough::Stack => stack_walkthrough(args.capacity),
            Walkthrough::All => Ok(()),
        }
    };

    let selected: &[Walkthrough] = match args.walkthrough {
        Walkthrough::All => &[
            Walkthrough::String,
            Walkthrough::List,
            Walkthrough::Dict,
            Walkthrough::Stack,
        ],
        ref one => std::slice::from_ref(one),
    };

    let mut failed = 0;
    for walkthrough in selected {
        if let Err(err) = run(*walkthrough) {
            failed += 1;
            tracing::error!(?walkthrough, %err, kind = ?err.kind(), "walkthrough stopped");
        }
    }

    report(tracker.stats());
    if failed > 0 {
        std::process::exit(1);
    }
}

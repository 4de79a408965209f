// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::cell::Cell;
use std::rc::Rc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use kurbo::Point;
use understory_dnd::scheduler::LocalScheduler;
use understory_dnd::store::Subscription;
use understory_dnd::test_backend::TestBackend;
use understory_dnd::{
    BeginDragOptions, DragDropManager, DragDropMonitor, DragSource, DropTarget, HandlerId, Item,
    register_source, register_target,
};

struct Piece;

impl DragSource for Piece {
    fn begin_drag(&self, _: &DragDropMonitor, _: HandlerId) -> Option<Item> {
        Some(Item::new(()))
    }
}

struct Square;

impl DropTarget for Square {}

/// A manager with `n` targets, one source mid-drag, and one state listener
/// per target that only cares about its own id.
struct Fixture {
    manager: DragDropManager<TestBackend>,
    targets: Vec<HandlerId>,
    notified: Rc<Cell<u64>>,
    _subscriptions: Vec<Subscription>,
}

fn fixture(n: usize) -> Fixture {
    let manager = DragDropManager::new(Rc::new(LocalScheduler::new()), TestBackend::new);
    let (source, _) = register_source("piece", Rc::new(Piece), &manager).unwrap();
    let targets: Vec<HandlerId> = (0..n)
        .map(|_| register_target("piece", Rc::new(Square), &manager).unwrap().0)
        .collect();

    let notified = Rc::new(Cell::new(0_u64));
    let subscriptions = targets
        .iter()
        .map(|id| {
            let notified = notified.clone();
            manager
                .monitor()
                .subscribe_to_state_change(
                    move || notified.set(notified.get() + 1),
                    Some(vec![*id]),
                )
                .unwrap()
        })
        .collect();

    manager
        .backend()
        .simulate_begin_drag(&[source], BeginDragOptions::default())
        .unwrap();
    Fixture {
        manager,
        targets,
        notified,
        _subscriptions: subscriptions,
    }
}

fn bench_hover(c: &mut Criterion) {
    let mut group = c.benchmark_group("understory_dnd_hover");
    group.sample_size(50);

    for &n in &[64_usize, 512, 4_096] {
        let f = fixture(n);
        let backend = f.manager.backend();
        // A nested pair, as when the pointer crosses from one square to the next.
        let a = [f.targets[0], f.targets[1]];
        let b = [f.targets[0], f.targets[2]];

        group.bench_function(format!("alternating_targets(n={n})"), |bencher| {
            let mut flip = false;
            bencher.iter(|| {
                flip = !flip;
                let ids = if flip { &a } else { &b };
                backend
                    .simulate_hover(black_box(ids), Some(Point::new(10.0, 10.0)))
                    .unwrap();
            });
        });

        group.bench_function(format!("same_targets_moving(n={n})"), |bencher| {
            let mut x = 0.0;
            bencher.iter(|| {
                x += 1.0;
                backend
                    .simulate_hover(black_box(&a), Some(Point::new(x, 10.0)))
                    .unwrap();
            });
        });

        black_box(f.notified.get());
    }

    group.finish();
}

criterion_group!(benches, bench_hover);
criterion_main!(benches);

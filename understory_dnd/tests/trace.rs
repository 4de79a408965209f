// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trace output of the drag lifecycle. Kept in its own binary because it
//! installs a global logger.

mod util;

use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use understory_dnd::{BeginDragOptions, register_source, register_target};
use util::{TestSource, TestTarget, log, manager};

struct Capture(Mutex<Vec<String>>);

impl Log for Capture {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() == Level::Trace
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) && record.target().starts_with("understory_dnd") {
            self.0.lock().unwrap().push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture(Mutex::new(Vec::new()));

#[test]
fn every_lifecycle_dispatch_is_traced() {
    log::set_logger(&CAPTURE).unwrap();
    log::set_max_level(LevelFilter::Trace);

    let (manager, _) = manager();
    let log = log();
    let (s, _) = register_source("piece", TestSource::new(&log), &manager).unwrap();
    let (t, _) = register_target("piece", TestTarget::new(&log), &manager).unwrap();
    CAPTURE.0.lock().unwrap().clear();

    let actions = manager.actions();
    actions
        .begin_drag(&[s], BeginDragOptions::default())
        .unwrap();
    actions.hover(&[t], None).unwrap();
    actions.drop(&Default::default()).unwrap();
    actions.end_drag().unwrap();

    let traced: Vec<String> = CAPTURE
        .0
        .lock()
        .unwrap()
        .iter()
        .filter(|line| line.starts_with("dispatch "))
        .cloned()
        .collect();
    assert_eq!(
        traced,
        [
            "dispatch INIT_COORDS",
            "dispatch INIT_COORDS",
            "dispatch BEGIN_DRAG",
            "dispatch HOVER",
            "dispatch DROP",
            "dispatch END_DRAG",
        ]
    );
}

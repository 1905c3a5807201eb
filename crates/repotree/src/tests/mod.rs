// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0


use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::node::{ChildSource, TreeNode};

/// Shared log of source events, in the order they happened
pub type EventLog = Rc<RefCell<Vec<String>>>;

/// A source producing plain children named from a fixed list.
///
/// Every produce and close is recorded in the shared log under the source's
/// label, so tests can observe fetch and finalize order.
pub struct ScriptedSource {
    label: String,
    names: Vec<String>,
    fail_next: bool,
    log: EventLog,
}

impl ScriptedSource {
    pub fn new(label: &str, names: &[&str], log: &EventLog) -> Self {
        Self {
            label: label.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            fail_next: false,
            log: Rc::clone(log),
        }
    }

    /// Fails the first produce call with a source error
    pub fn failing_once(mut self) -> Self {
        self.fail_next = true;
        self
    }
}

impl ChildSource for ScriptedSource {
    fn produce_children(&mut self, path: &str) -> Result<Vec<TreeNode>> {
        if self.fail_next {
            self.fail_next = false;
            self.log.borrow_mut().push(format!("fail {}", self.label));
            return Err(crate::error::Error::Other(format!("{path}: unavailable")));
        }
        self.log.borrow_mut().push(format!("produce {}", self.label));
        self.names.iter().map(|name| TreeNode::new(name)).collect()
    }

    fn close(&mut self) {
        self.log.borrow_mut().push(format!("close {}", self.label));
    }
}

pub fn new_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

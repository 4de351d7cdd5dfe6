//! Per-command completion plumbing. A completion fires exactly once, on the
//! first definitive outcome: delivery, or the first failed send (retries
//! continue in the background without re-notifying).

use std::collections::HashMap;
use std::sync::Mutex;

use crate::lock;

/// Called with `true` on delivery, `false` on the first failed send.
pub type CommandCompletion = Box<dyn FnOnce(bool) + Send>;

#[derive(Default)]
pub(crate) struct TaskRegistry {
    completions: Mutex<HashMap<String, CommandCompletion>>,
}

impl TaskRegistry {
    pub fn insert(&self, command_id: String, completion: CommandCompletion) {
        lock(&self.completions).insert(command_id, completion);
    }

    pub fn complete(&self, command_id: &str, success: bool) {
        let completion = lock(&self.completions).remove(command_id);
        if let Some(completion) = completion {
            completion(success);
        }
    }
}

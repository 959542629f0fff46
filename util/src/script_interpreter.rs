//! # Message script interpreter module
//!
//! This module provides an interpreter for message scripts, allowing a recorded or hand written
//! sequence of inbound messages (sensor samples, operator input, controller efforts) to be
//! replayed into the base controller without any hardware attached.
//!
//! A script is made of entries of the form
//!
//! ```text
//! <exec_time_s>: <inbound message as JSON>;
//! ```
//!
//! one per line, for example `1.5: {"Depth": {"depth_m": 0.3}};`. Lines which don't match are
//! ignored, so they can be used for comments.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::{Regex, RegexBuilder};
use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use thiserror::Error;

// Internal
use comms_if::msg::{InboundMsg, MsgParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A message which is scripted to be delivered at a specific time.
struct ScriptedMsg {
    /// The time the message is supposed to be delivered at
    exec_time_s: f64,

    msg: InboundMsg
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_msgs()` to acquire
/// the messages which need delivering.
pub struct ScriptInterpreter {
    msgs: VecDeque<ScriptedMsg>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid message at {0} s: {1}")]
    InvalidMsg(f64, MsgParseError),

    #[error("Could not build the script entry regex: {0}")]
    RegexError(regex::Error),

    #[error("Script entries must be in chronological order, found {1} s after {0} s")]
    OutOfOrder(f64, f64),
}

/// Messages returned by the interpreter on a given cycle.
#[derive(Debug, PartialEq)]
pub enum PendingMsgs {
    None,
    Some(Vec<InboundMsg>),
    EndOfScript
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {

    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let script = fs::read_to_string(script_path)
            .map_err(ScriptError::ScriptLoadError)?;

        Self::from_script_str(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {
        let mut msg_queue: VecDeque<ScriptedMsg> = VecDeque::new();

        let re = entry_regex().map_err(ScriptError::RegexError)?;

        for cap in re.captures_iter(script) {
            let exec_time_s: f64 = cap[1]
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            let msg = InboundMsg::from_json(&cap[3])
                .map_err(|e| ScriptError::InvalidMsg(exec_time_s, e))?;

            if let Some(last) = msg_queue.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(last.exec_time_s, exec_time_s))
                }
            }

            msg_queue.push_back(ScriptedMsg {
                exec_time_s,
                msg
            });
        }

        if msg_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty)
        }

        Ok(ScriptInterpreter {
            msgs: msg_queue
        })
    }

    /// Return all messages whose execution time is earlier than `current_time_s`.
    ///
    /// Once every message has been returned `PendingMsgs::EndOfScript` is returned.
    pub fn get_pending_msgs(&mut self, current_time_s: f64) -> PendingMsgs {
        if self.msgs.is_empty() {
            return PendingMsgs::EndOfScript
        }

        let mut msg_vec: Vec<InboundMsg> = vec![];

        while let Some(front) = self.msgs.front() {
            if front.exec_time_s >= current_time_s {
                break;
            }

            if let Some(m) = self.msgs.pop_front() {
                msg_vec.push(m.msg);
            }
        }

        if msg_vec.is_empty() {
            PendingMsgs::None
        }
        else {
            PendingMsgs::Some(msg_vec)
        }
    }

    /// Get the number of messages remaining in the script
    pub fn get_num_msgs(&self) -> usize {
        self.msgs.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.msgs.back() {
            Some(m) => m.exec_time_s,
            None => 0f64
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the regex matching one script entry.
fn entry_regex() -> Result<Regex, regex::Error> {
    RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
        .multi_line(true)
        .build()
}

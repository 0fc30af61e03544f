#![forbid(unsafe_code)]

//! Bounded, append-only record of recoverable failures.
//!
//! No failure in the pipeline is fatal. Each one is classified, recorded here
//! with its context, and emitted as a `tracing` warning; the pipeline then
//! continues with the documented fallback for its category.
//!
//! | Category | Fallback |
//! |----------|----------|
//! | [`ErrorCategory::ApiUnavailable`] | last analyzed or configured viewport size |
//! | [`ErrorCategory::Calculation`] | fixed default plan |
//! | [`ErrorCategory::Dom`] | skip the control, continue with the rest |
//! | [`ErrorCategory::Performance`] | keep the plan; the cache serves repeats |
//!
//! [`ErrorLog`] is a cheap handle: clones share one log, so the monitor and the
//! renderer can record into the same buffer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use boardfit_core::logging::TARGET_ERRORS;
use web_time::SystemTime;

/// Default number of retained entries.
pub const DEFAULT_ERROR_LOG_CAPACITY: usize = 256;

/// Failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// A platform capability (viewport measurement) was missing.
    ApiUnavailable,
    /// Non-finite or otherwise invalid layout input or output.
    Calculation,
    /// A control could not be located or updated.
    Dom,
    /// A stage exceeded its time budget.
    Performance,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 4] = [
        Self::ApiUnavailable,
        Self::Calculation,
        Self::Dom,
        Self::Performance,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiUnavailable => "api_unavailable",
            Self::Calculation => "calculation_error",
            Self::Dom => "dom_error",
            Self::Performance => "performance_error",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::ApiUnavailable => 0,
            Self::Calculation => 1,
            Self::Dom => 2,
            Self::Performance => 3,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    pub timestamp: SystemTime,
    pub category: ErrorCategory,
    pub context: String,
}

impl ErrorEntry {
    /// Milliseconds since the Unix epoch, 0 if the clock is before it.
    pub fn timestamp_ms(&self) -> u128 {
        self.timestamp
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0)
    }

    /// Serialize to JSONL format.
    #[must_use]
    pub fn to_jsonl(&self) -> String {
        format!(
            r#"{{"event":"error","category":"{}","timestamp_ms":{},"context":"{}"}}"#,
            self.category.as_str(),
            self.timestamp_ms(),
            json_escape(&self.context)
        )
    }
}

#[derive(Debug)]
struct Inner {
    entries: VecDeque<ErrorEntry>,
    capacity: usize,
    total: u64,
    per_category: [u64; 4],
}

/// Shared, size-bounded error log. Oldest entries are evicted first.
#[derive(Debug, Clone)]
pub struct ErrorLog {
    inner: Rc<RefCell<Inner>>,
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LOG_CAPACITY)
    }
}

impl ErrorLog {
    /// Create a log retaining at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Rc::new(RefCell::new(Inner {
                entries: VecDeque::with_capacity(capacity.min(64)),
                capacity,
                total: 0,
                per_category: [0; 4],
            })),
        }
    }

    /// Record a failure and emit it as a tracing event.
    pub fn record(&self, category: ErrorCategory, context: impl Into<String>) {
        let context = context.into();
        tracing::warn!(
            target: TARGET_ERRORS,
            category = category.as_str(),
            context = %context,
            "recoverable layout error"
        );
        let mut inner = self.inner.borrow_mut();
        if inner.entries.len() >= inner.capacity {
            inner.entries.pop_front();
        }
        inner.entries.push_back(ErrorEntry {
            timestamp: SystemTime::now(),
            category,
            context,
        });
        inner.total += 1;
        inner.per_category[category.index()] += 1;
    }

    /// Snapshot of retained entries, oldest first.
    pub fn entries(&self) -> Vec<ErrorEntry> {
        self.inner.borrow().entries.iter().cloned().collect()
    }

    /// Most recent entry.
    pub fn last(&self) -> Option<ErrorEntry> {
        self.inner.borrow().entries.back().cloned()
    }

    /// Retained entries of one category.
    pub fn entries_of(&self, category: ErrorCategory) -> Vec<ErrorEntry> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter(|e| e.category == category)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Entries recorded since creation, including evicted ones.
    pub fn total_recorded(&self) -> u64 {
        self.inner.borrow().total
    }

    /// Entries of one category recorded since creation.
    pub fn count(&self, category: ErrorCategory) -> u64 {
        self.inner.borrow().per_category[category.index()]
    }

    /// Retained entries as JSONL, one per line.
    pub fn to_jsonl(&self) -> String {
        let inner = self.inner.borrow();
        let mut out = String::new();
        for entry in &inner.entries {
            out.push_str(&entry.to_jsonl());
            out.push('\n');
        }
        out
    }
}

fn json_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write as _;
                let _ = write!(out, "\\u{:04X}", c as u32);
            }
            _ => out.push(ch),
        }
    }
    out
}
